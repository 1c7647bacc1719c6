// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box pre-filter

use crate::geometry::BoundingBox;

/// True unless the boxes are separated along some axis by more than
/// `clearance`.
///
/// Boxes that exactly touch count as overlapping. Neither box is modified;
/// the clearance is applied to the comparison only.
pub fn overlaps(a: &BoundingBox, b: &BoundingBox, clearance: f64) -> bool {
    !(a.max.x + clearance < b.min.x
        || b.max.x + clearance < a.min.x
        || a.max.y + clearance < b.min.y
        || b.max.y + clearance < a.min.y
        || a.max.z + clearance < b.min.z
        || b.max.z + clearance < a.min.z)
}
