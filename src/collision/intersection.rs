// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact interference test
//!
//! The first object's solids are handed to the host one at a time and
//! checked against the second object as a whole. No boolean operations are
//! performed.

use super::{Diagnostics, GeometryCache, ObjectId};
use crate::error::GeometryError;
use crate::host::GeometryHost;

pub struct ExactIntersectionTest<'a> {
    host: &'a dyn GeometryHost,
    cache: &'a GeometryCache,
    diagnostics: &'a Diagnostics,
}

impl<'a> ExactIntersectionTest<'a> {
    pub fn new(
        host: &'a dyn GeometryHost,
        cache: &'a GeometryCache,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            host,
            cache,
            diagnostics,
        }
    }

    /// True if any positive-volume solid of `a` intersects object `b`.
    ///
    /// An object without solids never intersects anything.
    pub fn solids_intersect(&self, a: ObjectId, b: ObjectId) -> Result<bool, GeometryError> {
        let solids = self.cache.solids_of(self.host, a, self.diagnostics);
        for solid in solids.iter() {
            if self.host.intersects(solid, b)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
