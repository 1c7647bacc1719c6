// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object identity and collision results

use crate::utils::model_to_mm;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a model element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of interference a detection run looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Solids must actually intersect
    #[default]
    Hard,
    /// Solids closer than a clearance distance also count
    Soft,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Hard => "hard",
            DetectionMode::Soft => "soft",
        }
    }
}

/// Classification of a reported pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKind {
    /// Geometric intersection; distance is always zero
    Hard,
    /// Within clearance but not intersecting
    Soft,
}

/// One reported pair. Created once by the orchestrator, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    sequence: usize,
    object1: ObjectId,
    object2: ObjectId,
    kind: CollisionKind,
    /// Gap in model units, zero for hard collisions
    distance: f64,
    label1: String,
    label2: String,
}

impl CollisionRecord {
    pub(crate) fn new(
        sequence: usize,
        (object1, label1): (ObjectId, &str),
        (object2, label2): (ObjectId, &str),
        kind: CollisionKind,
        distance: f64,
    ) -> Self {
        let distance = match kind {
            CollisionKind::Hard => 0.0,
            CollisionKind::Soft => distance,
        };
        Self {
            sequence,
            object1,
            object2,
            kind,
            distance,
            label1: label1.to_string(),
            label2: label2.to_string(),
        }
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn object1(&self) -> ObjectId {
        self.object1
    }

    pub fn object2(&self) -> ObjectId {
        self.object2
    }

    pub fn kind(&self) -> CollisionKind {
        self.kind
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn distance_mm(&self) -> f64 {
        model_to_mm(self.distance)
    }

    pub fn label1(&self) -> &str {
        &self.label1
    }

    pub fn label2(&self) -> &str {
        &self.label2
    }

    /// Both object ids, in reported order
    pub fn objects(&self) -> [ObjectId; 2] {
        [self.object1, self.object2]
    }

    /// Unordered identity of the pair
    pub fn pair_key(&self) -> (ObjectId, ObjectId) {
        if self.object1 <= self.object2 {
            (self.object1, self.object2)
        } else {
            (self.object2, self.object1)
        }
    }

    /// Human-readable one-line description
    pub fn summary(&self) -> String {
        let head = format!(
            "#{}, {}:{} <-> {}:{}",
            self.sequence, self.label1, self.object1, self.label2, self.object2
        );
        match self.kind {
            CollisionKind::Hard => format!("{head} hard collision"),
            CollisionKind::Soft => format!("{head} soft collision, gap {:.1} mm", self.distance_mm()),
        }
    }
}
