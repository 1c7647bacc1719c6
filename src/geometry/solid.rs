// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed solids described by their boundary faces

use super::{Face, Primitive};
use std::sync::Arc;

/// A solid: ordered boundary faces plus enclosed volume.
///
/// Cloning is cheap; faces are shared.
#[derive(Debug, Clone)]
pub struct Solid {
    faces: Vec<Arc<dyn Face>>,
    volume: f64,
    primitive: Option<Primitive>,
}

impl Solid {
    pub fn new(faces: Vec<Arc<dyn Face>>, volume: f64) -> Self {
        Self {
            faces,
            volume,
            primitive: None,
        }
    }

    /// Solid that remembers the primitive it was generated from, so hosts
    /// can run exact intersection queries against it
    pub fn from_primitive(faces: Vec<Arc<dyn Face>>, volume: f64, primitive: Primitive) -> Self {
        Self {
            faces,
            volume,
            primitive: Some(primitive),
        }
    }

    pub fn faces(&self) -> &[Arc<dyn Face>] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Solids with no positive volume are empty or degenerate
    pub fn has_volume(&self) -> bool {
        self.volume > 0.0
    }

    pub fn primitive(&self) -> Option<&Primitive> {
        self.primitive.as_ref()
    }
}
