// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-run geometry cache
//!
//! Holds the candidate objects of every category, their bounding boxes and
//! their lazily extracted solids. Each map is a `DashMap`, so concurrent
//! population of independent categories only contends on the shard being
//! written, never on one global lock.

use super::{DiagnosticKind, Diagnostics, ObjectId};
use crate::geometry::{BoundingBox, Solid};
use crate::host::GeometryHost;
use ahash::AHashSet;
use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;

/// Candidate object of one category
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricObject {
    pub id: ObjectId,
    pub label: String,
    pub bounding_box: BoundingBox,
}

/// Thread-safe object, box and solid caches for one detection run
#[derive(Debug, Default)]
pub struct GeometryCache {
    boxes: DashMap<ObjectId, BoundingBox>,
    solids: DashMap<ObjectId, Arc<[Solid]>>,
    groups: DashMap<String, Arc<[GeometricObject]>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the objects of one category.
    ///
    /// With an elevation cutoff only objects whose box starts at or below it
    /// are kept. Objects without a box are dropped. Returns the number of
    /// objects cached for the label.
    pub fn load_group(
        &self,
        host: &dyn GeometryHost,
        label: &str,
        elevation: Option<f64>,
        diagnostics: &Diagnostics,
    ) -> usize {
        let Some(ids) = host.objects_in(label) else {
            diagnostics.record(
                DiagnosticKind::UnsupportedCategory,
                &[],
                format!("category '{label}' is not known to the model"),
            );
            return 0;
        };

        let mut objects = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(bounding_box) = host.bounding_box_of(id) else {
                diagnostics.record(
                    DiagnosticKind::MissingGeometry,
                    &[id],
                    format!("object {id} in '{label}' has no bounding box"),
                );
                continue;
            };

            if let Some(cutoff) = elevation {
                if bounding_box.min.z > cutoff {
                    continue;
                }
            }

            self.boxes.insert(id, bounding_box);
            objects.push(GeometricObject {
                id,
                label: label.to_string(),
                bounding_box,
            });
        }

        let count = objects.len();
        tracing::debug!(label, count, ?elevation, "cached category");
        self.groups.insert(label.to_string(), objects.into());
        count
    }

    /// Populate every distinct label in parallel, one task per label
    pub fn populate(
        &self,
        host: &dyn GeometryHost,
        labels: &[String],
        elevation: Option<f64>,
        parallelism: Option<usize>,
        diagnostics: &Diagnostics,
    ) {
        let mut seen = AHashSet::new();
        let distinct: Vec<&str> = labels
            .iter()
            .map(String::as_str)
            .filter(|label| seen.insert(*label))
            .collect();

        let work = || {
            distinct.par_iter().for_each(|label| {
                self.load_group(host, label, elevation, diagnostics);
            });
        };

        match parallelism {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(work),
                Err(err) => {
                    tracing::warn!(%err, threads, "falling back to the global rayon pool");
                    work();
                }
            },
            None => work(),
        }
    }

    /// Positive-volume solids of an object, extracted on first request.
    ///
    /// Objects without extractable geometry yield an empty slice.
    pub fn solids_of(
        &self,
        host: &dyn GeometryHost,
        id: ObjectId,
        diagnostics: &Diagnostics,
    ) -> Arc<[Solid]> {
        if let Some(solids) = self.solids.get(&id) {
            return Arc::clone(solids.value());
        }

        let solids: Arc<[Solid]> = match host.solids_of(id) {
            Ok(raw) => raw.into_iter().filter(Solid::has_volume).collect(),
            Err(err) => {
                diagnostics.record(
                    DiagnosticKind::MissingGeometry,
                    &[id],
                    format!("no geometry for object {id}: {err}"),
                );
                Arc::from(Vec::new())
            }
        };
        tracing::trace!(object = %id, count = solids.len(), "extracted solids");

        Arc::clone(self.solids.entry(id).or_insert(solids).value())
    }

    pub fn group(&self, label: &str) -> Option<Arc<[GeometricObject]>> {
        self.groups.get(label).map(|objects| Arc::clone(objects.value()))
    }

    pub fn bounding_box(&self, id: ObjectId) -> Option<BoundingBox> {
        self.boxes.get(&id).map(|bbox| *bbox.value())
    }

    pub fn object_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Drop everything; the next run repopulates from scratch
    pub fn clear(&self) {
        self.boxes.clear();
        self.solids.clear();
        self.groups.clear();
    }
}
