// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - boxes, faces, solids and primitives

mod bbox;
mod collider;
mod face;
mod primitives;
mod solid;

pub use bbox::BoundingBox;
pub use collider::Collider;
pub use face::{CylinderFace, DiskFace, Face, PlaneFace, Projection, UvBounds};
pub use primitives::Primitive;
pub use solid::Solid;
