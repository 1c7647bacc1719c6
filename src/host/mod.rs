// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Host capability interface
//!
//! The engine never touches a host object model directly. Everything it needs
//! from the modelling application goes through [`GeometryHost`], so any host
//! can be plugged in through a thin adapter. [`MemoryModel`] is the adapter
//! used by the CLI and the tests.

mod memory;
mod scene;

pub use memory::MemoryModel;
pub use scene::{Level, Scene, SceneElement};

use crate::collision::ObjectId;
use crate::error::GeometryError;
use crate::geometry::{BoundingBox, Solid};

/// Short-curve tolerance used when a host does not report one, in model units
pub const DEFAULT_TOLERANCE: f64 = 0.00256;

/// What the collision engine needs from a modelling host
pub trait GeometryHost: Send + Sync {
    /// False when there is no active model to query
    fn is_available(&self) -> bool {
        true
    }

    /// Concrete (non-type) objects of a category, or `None` if the label is
    /// not a category the host knows
    fn objects_in(&self, label: &str) -> Option<Vec<ObjectId>>;

    /// World-space box of an object's visible geometry
    fn bounding_box_of(&self, id: ObjectId) -> Option<BoundingBox>;

    /// Raw solids of an object, degenerate ones included
    fn solids_of(&self, id: ObjectId) -> Result<Vec<Solid>, GeometryError>;

    /// True if `solid` intersects the geometry of object `id`
    fn intersects(&self, solid: &Solid, id: ObjectId) -> Result<bool, GeometryError>;

    /// Model-wide geometric tolerance
    fn tolerance(&self) -> f64 {
        DEFAULT_TOLERANCE
    }

    /// Elevation of a named level
    fn level_elevation(&self, _name: &str) -> Option<f64> {
        None
    }
}
