// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Clashcheck collision detection
//!
//! Finds interfering and too-close pairs between two groups of solid
//! objects in a building model. The model is reached through the
//! [`GeometryHost`] capability interface; [`MemoryModel`] is the bundled
//! host backed by primitive shapes.

pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod report;
pub mod utils;

pub use collision::{CollisionKind, CollisionRecord, DetectionMode, ObjectId};
pub use config::{DetectionConfig, LevelFilter, SamplingConfig};
pub use engine::CollisionEngine;
pub use error::{ClashError, GeometryError};
pub use geometry::{BoundingBox, Primitive, Solid};
pub use host::{GeometryHost, MemoryModel};
pub use report::{DetectionReport, Reporter};

use std::sync::Arc;

/// Run one detection session and return its report
pub fn detect(
    host: Arc<dyn GeometryHost>,
    config: DetectionConfig,
) -> Result<DetectionReport, ClashError> {
    let mut engine = CollisionEngine::new(host, config);
    engine.run()?;
    Ok(engine.report())
}
