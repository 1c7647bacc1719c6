// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pairwise detection over two category groups
//!
//! Detection is sequential so that sequence numbers follow the nested
//! iteration order of category pairs and object indices.

use super::{
    overlaps, CollisionRecord, DetectionMode, DiagnosticKind, Diagnostics, DistanceEstimator,
    Estimate, ExactIntersectionTest, GeometricObject, GeometryCache, ObjectId,
};
use crate::config::SamplingConfig;
use crate::error::GeometryError;
use crate::host::GeometryHost;
use ahash::AHashSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Counters gathered during one detection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    /// Distinct object pairs considered
    pub candidate_pairs: usize,
    /// Pairs that survived the bounding box filter
    pub broad_phase_passed: usize,
    /// Pairs whose narrow phase failed and were treated as clear
    pub narrow_phase_failures: usize,
}

/// Ordered records and statistics of one detection pass
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub records: Vec<CollisionRecord>,
    pub stats: DetectionStats,
}

pub struct CollisionOrchestrator<'a> {
    host: &'a dyn GeometryHost,
    cache: &'a GeometryCache,
    diagnostics: &'a Diagnostics,
    sampling: &'a SamplingConfig,
}

impl<'a> CollisionOrchestrator<'a> {
    pub fn new(
        host: &'a dyn GeometryHost,
        cache: &'a GeometryCache,
        diagnostics: &'a Diagnostics,
        sampling: &'a SamplingConfig,
    ) -> Self {
        Self {
            host,
            cache,
            diagnostics,
            sampling,
        }
    }

    /// Compare every cached object of `group1` against every cached object
    /// of `group2`.
    ///
    /// `threshold` is the soft clearance in model units and is ignored in
    /// hard mode. Each unordered pair is tested at most once, and a category
    /// compared with itself only pairs an object with those after it.
    pub fn detect<R: Rng + ?Sized>(
        &self,
        group1: &[String],
        group2: &[String],
        mode: DetectionMode,
        threshold: f64,
        rng: &mut R,
    ) -> Detection {
        let clearance = match mode {
            DetectionMode::Hard => 0.0,
            DetectionMode::Soft => threshold,
        };

        let mut detection = Detection::default();
        let mut seen: AHashSet<(ObjectId, ObjectId)> = AHashSet::new();

        for label_a in group1 {
            for label_b in group2 {
                let (Some(objects_a), Some(objects_b)) =
                    (self.cache.group(label_a), self.cache.group(label_b))
                else {
                    continue;
                };
                if objects_a.is_empty() || objects_b.is_empty() {
                    continue;
                }

                let same_category = label_a == label_b;
                for (i, a) in objects_a.iter().enumerate() {
                    let start = if same_category { i + 1 } else { 0 };
                    for b in &objects_b[start..] {
                        if a.id == b.id {
                            continue;
                        }
                        let key = if a.id < b.id { (a.id, b.id) } else { (b.id, a.id) };
                        if !seen.insert(key) {
                            continue;
                        }
                        detection.stats.candidate_pairs += 1;

                        if !overlaps(&a.bounding_box, &b.bounding_box, clearance) {
                            continue;
                        }
                        detection.stats.broad_phase_passed += 1;

                        // A panicking host or kernel only loses this pair
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                            self.narrow_phase(a, b, mode, threshold, &mut *rng)
                        }));
                        let failure = match outcome {
                            Ok(Ok(Some(estimate))) => {
                                let record = CollisionRecord::new(
                                    detection.records.len(),
                                    (a.id, a.label.as_str()),
                                    (b.id, b.label.as_str()),
                                    estimate.kind,
                                    estimate.distance,
                                );
                                tracing::debug!(summary = %record.summary(), "collision found");
                                detection.records.push(record);
                                continue;
                            }
                            Ok(Ok(None)) => continue,
                            Ok(Err(err)) => err.to_string(),
                            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
                        };

                        detection.stats.narrow_phase_failures += 1;
                        self.diagnostics.record(
                            DiagnosticKind::CatastrophicFailure,
                            &[a.id, b.id],
                            format!("narrow phase failed for {} <-> {}: {failure}", a.id, b.id),
                        );
                    }
                }
            }
        }

        tracing::info!(
            mode = mode.as_str(),
            candidates = detection.stats.candidate_pairs,
            broad_phase = detection.stats.broad_phase_passed,
            collisions = detection.records.len(),
            "detection finished"
        );
        detection
    }

    fn narrow_phase<R: Rng + ?Sized>(
        &self,
        a: &GeometricObject,
        b: &GeometricObject,
        mode: DetectionMode,
        threshold: f64,
        rng: &mut R,
    ) -> Result<Option<Estimate>, GeometryError> {
        match mode {
            DetectionMode::Hard => {
                let exact = ExactIntersectionTest::new(self.host, self.cache, self.diagnostics);
                Ok(exact.solids_intersect(a.id, b.id)?.then(Estimate::hard))
            }
            DetectionMode::Soft => {
                let estimator =
                    DistanceEstimator::new(self.host, self.cache, self.diagnostics, self.sampling);
                estimator.estimate(a.id, b.id, threshold, rng)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionKind;
    use crate::geometry::{BoundingBox, Primitive, Solid};
    use crate::host::MemoryModel;
    use nalgebra::{Point3, Vector3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cube(x: f64) -> Primitive {
        Primitive::cube(Point3::new(x, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn run(
        host: &dyn GeometryHost,
        group1: &[&str],
        group2: &[&str],
        mode: DetectionMode,
        threshold: f64,
    ) -> (Detection, Diagnostics) {
        let cache = GeometryCache::new();
        let diagnostics = Diagnostics::new();
        let sampling = SamplingConfig::default();
        let (group1, group2) = (labels(group1), labels(group2));

        let mut all = group1.clone();
        all.extend(group2.iter().cloned());
        cache.populate(host, &all, None, None, &diagnostics);

        let orchestrator = CollisionOrchestrator::new(host, &cache, &diagnostics, &sampling);
        let mut rng = StdRng::seed_from_u64(5);
        let detection = orchestrator.detect(&group1, &group2, mode, threshold, &mut rng);
        (detection, diagnostics)
    }

    #[test]
    fn test_same_category_tests_each_pair_once() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(2), "Pipes", vec![cube(0.5)]);
        model.add_element(ObjectId(3), "Pipes", vec![cube(0.8)]);

        let (detection, _) = run(&model, &["Pipes"], &["Pipes"], DetectionMode::Hard, 0.0);
        assert_eq!(detection.stats.candidate_pairs, 3);
        assert_eq!(detection.records.len(), 3);
        assert!(detection.records.iter().all(|r| r.object1() != r.object2()));
    }

    #[test]
    fn test_pairs_reachable_twice_are_reported_once() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(2), "Ducts", vec![cube(0.5)]);

        let (detection, _) = run(
            &model,
            &["Pipes", "Ducts"],
            &["Ducts", "Pipes"],
            DetectionMode::Hard,
            0.0,
        );
        assert_eq!(detection.records.len(), 1);
        assert_eq!(detection.records[0].objects(), [ObjectId(1), ObjectId(2)]);
    }

    #[test]
    fn test_sequence_follows_discovery_order() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(10), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(11), "Pipes", vec![cube(5.0)]);
        model.add_element(ObjectId(20), "Walls", vec![cube(5.5)]);
        model.add_element(ObjectId(21), "Walls", vec![cube(0.5)]);

        let (detection, _) = run(&model, &["Pipes"], &["Walls"], DetectionMode::Hard, 0.0);
        let found: Vec<(usize, ObjectId, ObjectId)> = detection
            .records
            .iter()
            .map(|r| (r.sequence(), r.object1(), r.object2()))
            .collect();
        assert_eq!(
            found,
            vec![(0, ObjectId(10), ObjectId(21)), (1, ObjectId(11), ObjectId(20))]
        );
        assert_eq!(detection.stats.candidate_pairs, 4);
        assert_eq!(detection.stats.broad_phase_passed, 2);
    }

    #[test]
    fn test_soft_mode_reports_gap_within_clearance() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(2), "Walls", vec![cube(1.25)]);
        model.add_element(ObjectId(3), "Walls", vec![cube(4.0)]);
        model.add_element(ObjectId(4), "Walls", vec![cube(0.5)]);

        let (detection, _) = run(&model, &["Pipes"], &["Walls"], DetectionMode::Soft, 0.5);
        assert_eq!(detection.records.len(), 2);

        let soft = &detection.records[0];
        assert_eq!(soft.kind(), CollisionKind::Soft);
        assert!((soft.distance() - 0.25).abs() < 1e-9);
        assert_eq!(detection.records[1].kind(), CollisionKind::Hard);
        assert_eq!(detection.records[1].distance(), 0.0);
    }

    #[test]
    fn test_missing_category_is_skipped() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);

        let (detection, diagnostics) =
            run(&model, &["Pipes"], &["Furniture"], DetectionMode::Hard, 0.0);
        assert!(detection.records.is_empty());
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedCategory), 1);
    }

    /// Host that has boxes for everything but fails every exact query
    struct FailingHost(MemoryModel);

    impl GeometryHost for FailingHost {
        fn objects_in(&self, label: &str) -> Option<Vec<ObjectId>> {
            self.0.objects_in(label)
        }

        fn bounding_box_of(&self, id: ObjectId) -> Option<BoundingBox> {
            self.0.bounding_box_of(id)
        }

        fn solids_of(&self, id: ObjectId) -> Result<Vec<Solid>, GeometryError> {
            self.0.solids_of(id)
        }

        fn intersects(&self, _solid: &Solid, _id: ObjectId) -> Result<bool, GeometryError> {
            Err(GeometryError::Unsupported("kernel crashed".into()))
        }
    }

    #[test]
    fn test_narrow_phase_failure_does_not_abort() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(2), "Walls", vec![cube(0.5)]);
        model.add_element(ObjectId(3), "Walls", vec![cube(0.2)]);
        let host = FailingHost(model);

        let (detection, diagnostics) = run(&host, &["Pipes"], &["Walls"], DetectionMode::Hard, 0.0);
        assert!(detection.records.is_empty());
        assert_eq!(detection.stats.narrow_phase_failures, 2);
        assert_eq!(diagnostics.count(DiagnosticKind::CatastrophicFailure), 2);
    }

    /// Host whose exact query panics whenever object 2 is involved
    struct PanickingHost(MemoryModel);

    impl GeometryHost for PanickingHost {
        fn objects_in(&self, label: &str) -> Option<Vec<ObjectId>> {
            self.0.objects_in(label)
        }

        fn bounding_box_of(&self, id: ObjectId) -> Option<BoundingBox> {
            self.0.bounding_box_of(id)
        }

        fn solids_of(&self, id: ObjectId) -> Result<Vec<Solid>, GeometryError> {
            self.0.solids_of(id)
        }

        fn intersects(&self, solid: &Solid, id: ObjectId) -> Result<bool, GeometryError> {
            if id == ObjectId(2) {
                panic!("kernel fault on object {id}");
            }
            self.0.intersects(solid, id)
        }
    }

    #[test]
    fn test_panicking_pair_does_not_abort() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(2), "Walls", vec![cube(0.5)]);
        model.add_element(ObjectId(3), "Walls", vec![cube(0.2)]);
        let host = PanickingHost(model);

        let (detection, diagnostics) = run(&host, &["Pipes"], &["Walls"], DetectionMode::Hard, 0.0);
        assert_eq!(detection.records.len(), 1);
        assert_eq!(detection.records[0].objects(), [ObjectId(1), ObjectId(3)]);
        assert_eq!(detection.records[0].sequence(), 0);
        assert_eq!(detection.stats.narrow_phase_failures, 1);

        assert_eq!(diagnostics.count(DiagnosticKind::CatastrophicFailure), 1);
        assert!(diagnostics
            .snapshot()
            .iter()
            .any(|entry| entry.message.contains("kernel fault on object 2")));
    }
}
