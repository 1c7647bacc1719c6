// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision detection core
//!
//! Cache population, the bounding box pre-filter, the exact and sampled
//! narrow phases, and the orchestration that ties them into an ordered list
//! of [`CollisionRecord`]s.

mod broad_phase;
mod cache;
mod diagnostics;
mod distance;
mod intersection;
mod orchestrator;
mod record;
mod sampling;

pub use broad_phase::overlaps;
pub use cache::{GeometricObject, GeometryCache};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use distance::{DistanceEstimator, Estimate};
pub use intersection::ExactIntersectionTest;
pub use orchestrator::{CollisionOrchestrator, Detection, DetectionStats};
pub use record::{CollisionKind, CollisionRecord, DetectionMode, ObjectId};
pub use sampling::{grid_counts, sample_face};
