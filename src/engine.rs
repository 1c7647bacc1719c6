// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detection session API

use crate::collision::{
    CollisionOrchestrator, CollisionRecord, Detection, DetectionStats, DiagnosticKind,
    Diagnostics, GeometryCache,
};
use crate::config::DetectionConfig;
use crate::error::ClashError;
use crate::geometry::BoundingBox;
use crate::host::GeometryHost;
use crate::report::DetectionReport;
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;

/// Margin added around a selected pair's boxes for a section view, in model units
pub const DEFAULT_SECTION_MARGIN: f64 = 2.0;

/// One detection session against a host
pub struct CollisionEngine {
    host: Arc<dyn GeometryHost>,
    config: DetectionConfig,
    cache: GeometryCache,
    diagnostics: Diagnostics,
    detection: Detection,
}

impl CollisionEngine {
    pub fn new(host: Arc<dyn GeometryHost>, config: DetectionConfig) -> Self {
        Self {
            host,
            config,
            cache: GeometryCache::new(),
            diagnostics: Diagnostics::new(),
            detection: Detection::default(),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Build the caches from scratch and run detection.
    ///
    /// Fails only when the request is invalid or the host has no model;
    /// everything else ends up in [`Self::diagnostics`].
    pub fn run(&mut self) -> Result<&[CollisionRecord], ClashError> {
        self.config.validate()?;
        if !self.host.is_available() {
            return Err(ClashError::HostUnavailable);
        }

        self.reset();
        let started = Instant::now();
        let host = self.host.as_ref();

        let elevation = self.resolve_elevation();
        let labels: Vec<String> = self
            .config
            .group1
            .iter()
            .chain(&self.config.group2)
            .cloned()
            .collect();
        self.cache.populate(
            host,
            &labels,
            elevation,
            self.config.parallelism,
            &self.diagnostics,
        );
        tracing::info!(
            objects = self.cache.object_count(),
            categories = self.cache.group_count(),
            ?elevation,
            "geometry cache populated"
        );

        let mut rng = match self.config.sampling.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let orchestrator =
            CollisionOrchestrator::new(host, &self.cache, &self.diagnostics, &self.config.sampling);
        let detection = orchestrator.detect(
            &self.config.group1,
            &self.config.group2,
            self.config.mode,
            self.config.threshold(),
            &mut rng,
        );
        self.detection = detection;

        tracing::info!(
            collisions = self.detection.records.len(),
            diagnostics = self.diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run complete"
        );
        Ok(&self.detection.records)
    }

    /// Discard all state and detect again with the same parameters
    pub fn refresh(&mut self) -> Result<&[CollisionRecord], ClashError> {
        tracing::info!("refreshing detection");
        self.run()
    }

    pub fn records(&self) -> &[CollisionRecord] {
        &self.detection.records
    }

    pub fn stats(&self) -> DetectionStats {
        self.detection.stats
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Box around both objects of `record`, grown by `margin` on every side.
    ///
    /// `None` if either object is no longer cached.
    pub fn section_box(&self, record: &CollisionRecord, margin: f64) -> Option<BoundingBox> {
        let first = self.cache.bounding_box(record.object1())?;
        let second = self.cache.bounding_box(record.object2())?;
        Some(first.union(&second).inflated(margin))
    }

    /// Snapshot of the last run for export
    pub fn report(&self) -> DetectionReport {
        DetectionReport {
            timestamp: Local::now(),
            mode: self.config.mode,
            clearance_mm: self.config.clearance_mm,
            stats: self.detection.stats,
            records: self.detection.records.clone(),
            diagnostics: self.diagnostics.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.cache.clear();
        self.diagnostics.clear();
        self.detection = Detection::default();
    }

    /// Elevation cutoff of the selected level; an unknown level disables the filter
    fn resolve_elevation(&self) -> Option<f64> {
        let filter = self.config.level_filter()?;
        let elevation = self.host.level_elevation(filter.name());
        if elevation.is_none() {
            self.diagnostics.record(
                DiagnosticKind::UnresolvedLevel,
                &[],
                format!("level '{}' not found, elevation filter disabled", filter.name()),
            );
        }
        elevation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionKind, ObjectId};
    use crate::geometry::Primitive;
    use crate::host::MemoryModel;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn cube(x: f64, z: f64) -> Primitive {
        Primitive::cube(Point3::new(x, 0.0, z), Vector3::new(1.0, 1.0, 1.0))
    }

    fn model() -> Arc<MemoryModel> {
        let mut model = MemoryModel::new();
        model.add_level("1F", 0.0);
        model.add_level("2F", 10.0);
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0, 0.0)]);
        model.add_element(ObjectId(2), "Walls", vec![cube(0.5, 0.0)]);
        model.add_element(ObjectId(3), "Pipes", vec![cube(0.0, 12.0)]);
        model.add_element(ObjectId(4), "Walls", vec![cube(0.5, 12.0)]);
        Arc::new(model)
    }

    #[test]
    fn test_run_finds_hard_collisions() {
        let mut engine = CollisionEngine::new(model(), DetectionConfig::hard(&["Pipes"], &["Walls"]));

        let records = engine.run().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind() == CollisionKind::Hard));
        assert_eq!(engine.stats().candidate_pairs, 4);
    }

    #[test]
    fn test_level_filter_limits_candidates() {
        let config = DetectionConfig::hard(&["Pipes"], &["Walls"]).with_level("1F (0.0m)");
        let mut engine = CollisionEngine::new(model(), config);

        let records = engine.run().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].objects(), [ObjectId(1), ObjectId(2)]);
    }

    #[test]
    fn test_unknown_level_disables_filter() {
        let config = DetectionConfig::hard(&["Pipes"], &["Walls"]).with_level("Basement (-3m)");
        let mut engine = CollisionEngine::new(model(), config);

        assert_eq!(engine.run().unwrap().len(), 2);
        assert_eq!(engine.diagnostics().count(DiagnosticKind::UnresolvedLevel), 1);
    }

    #[test]
    fn test_unavailable_host_fails_before_caching() {
        let host = Arc::new(MemoryModel::unavailable());
        let mut engine = CollisionEngine::new(host, DetectionConfig::hard(&["Pipes"], &["Walls"]));

        assert!(matches!(engine.run(), Err(ClashError::HostUnavailable)));
        assert_eq!(engine.cache().object_count(), 0);
    }

    #[test]
    fn test_invalid_request_is_rejected() {
        let mut engine = CollisionEngine::new(model(), DetectionConfig::soft(&["Pipes"], &["Walls"], 0.0));
        assert!(matches!(engine.run(), Err(ClashError::InvalidRequest(_))));
    }

    #[test]
    fn test_refresh_reproduces_results() {
        let mut engine = CollisionEngine::new(model(), DetectionConfig::hard(&["Pipes"], &["Walls"]));

        let first: Vec<_> = engine
            .run()
            .unwrap()
            .iter()
            .map(|r| (r.object1(), r.object2(), r.kind()))
            .collect();
        let second: Vec<_> = engine
            .refresh()
            .unwrap()
            .iter()
            .map(|r| (r.object1(), r.object2(), r.kind()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_section_box() {
        let mut engine = CollisionEngine::new(model(), DetectionConfig::hard(&["Pipes"], &["Walls"]));
        engine.run().unwrap();

        let record = engine.records()[0].clone();
        let section = engine.section_box(&record, DEFAULT_SECTION_MARGIN).unwrap();
        assert_relative_eq!(section.min.x, -2.0);
        assert_relative_eq!(section.max.x, 3.5);
        assert_relative_eq!(section.max.z, 3.0);
    }

    #[test]
    fn test_report_snapshot() {
        let config = DetectionConfig::soft(&["Pipes"], &["Walls"], 100.0).with_seed(1);
        let mut engine = CollisionEngine::new(model(), config);
        engine.run().unwrap();

        let report = engine.report();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.clearance_mm, 100.0);
        assert!(report.diagnostics.is_empty());
    }
}
