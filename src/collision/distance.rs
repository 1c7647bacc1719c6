// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sampled minimum distance between objects
//!
//! Points are sampled on the faces of the first object's solids and measured
//! against the faces of the second object's solids. The result is an upper
//! bound on the true gap, so a reported soft collision is always real within
//! sampling noise.

use super::{
    sample_face, CollisionKind, DiagnosticKind, Diagnostics, ExactIntersectionTest,
    GeometryCache, ObjectId,
};
use crate::config::SamplingConfig;
use crate::error::GeometryError;
use crate::geometry::Solid;
use crate::host::GeometryHost;
use nalgebra::Point3;
use rand::Rng;

/// Classification of a pair that passed the estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub kind: CollisionKind,
    /// Gap in model units, zero for hard collisions
    pub distance: f64,
}

impl Estimate {
    pub fn hard() -> Self {
        Self {
            kind: CollisionKind::Hard,
            distance: 0.0,
        }
    }

    pub fn soft(distance: f64) -> Self {
        Self {
            kind: CollisionKind::Soft,
            distance,
        }
    }
}

pub struct DistanceEstimator<'a> {
    host: &'a dyn GeometryHost,
    cache: &'a GeometryCache,
    diagnostics: &'a Diagnostics,
    sampling: &'a SamplingConfig,
}

impl<'a> DistanceEstimator<'a> {
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

    /// Classify a pair against a clearance `threshold` in model units.
    ///
    /// Returns `None` when the objects are further apart than the threshold
    /// or one of them has no usable solids. Intersection always wins over a
    /// soft result. The first solid pair within the threshold decides the
    /// reported distance.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        a: ObjectId,
        b: ObjectId,
        threshold: f64,
        rng: &mut R,
    ) -> Result<Option<Estimate>, GeometryError> {
        let exact = ExactIntersectionTest::new(self.host, self.cache, self.diagnostics);
        if exact.solids_intersect(a, b)? {
            return Ok(Some(Estimate::hard()));
        }

        let solids_a = self.cache.solids_of(self.host, a, self.diagnostics);
        let solids_b = self.cache.solids_of(self.host, b, self.diagnostics);
        if solids_a.is_empty() || solids_b.is_empty() {
            self.diagnostics.record(
                DiagnosticKind::MissingGeometry,
                &[a, b],
                format!("cannot measure {a} <-> {b}: no solids with volume"),
            );
            return Ok(None);
        }

        for solid_a in solids_a.iter() {
            for solid_b in solids_b.iter() {
                let distance = self.solid_distance(solid_a, solid_b, (a, b), rng);
                if distance <= 0.0 {
                    return Ok(Some(Estimate::hard()));
                }
                if distance <= threshold {
                    return Ok(Some(Estimate::soft(distance)));
                }
            }
        }
        Ok(None)
    }

    /// Smallest sampled distance from the faces of `from` to the solid `to`
    fn solid_distance<R: Rng + ?Sized>(
        &self,
        from: &Solid,
        to: &Solid,
        (a, b): (ObjectId, ObjectId),
        rng: &mut R,
    ) -> f64 {
        let mut min = f64::INFINITY;

        for face in from.faces().iter().take(self.sampling.max_faces_per_solid) {
            let points = match sample_face(face.as_ref(), self.sampling, rng) {
                Ok(points) => points,
                Err(err) => {
                    self.diagnostics.record(
                        DiagnosticKind::InvalidSampling,
                        &[a, b],
                        format!("face skipped: {err}"),
                    );
                    continue;
                }
            };

            for point in points.iter().take(self.sampling.points_per_face) {
                min = min.min(self.point_to_solid(point, to));
                if min <= 0.0 {
                    return 0.0;
                }
            }
        }
        min
    }

    /// Distance from a point to the boundary of a solid.
    ///
    /// A point within tolerance of most of the solid's faces counts as
    /// inside and is at distance zero.
    pub fn point_to_solid(&self, point: &Point3<f64>, solid: &Solid) -> f64 {
        let tolerance = self.host.tolerance();
        let mut near_faces = 0usize;
        let mut min = f64::INFINITY;

        for face in solid.faces() {
            if let Some(projection) = face.project(point) {
                if projection.distance < tolerance {
                    near_faces += 1;
                }
                min = min.min(projection.distance);
            }
        }

        let face_count = solid.face_count();
        if face_count > 0 && near_faces as f64 > face_count as f64 * self.sampling.inside_ratio {
            return 0.0;
        }
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Face, Primitive, Projection, UvBounds};
    use crate::host::MemoryModel;
    use crate::utils::mm_to_model;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn cube(x: f64) -> Primitive {
        Primitive::cube(Point3::new(x, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }

    struct Fixture {
        model: MemoryModel,
        cache: GeometryCache,
        diagnostics: Diagnostics,
        sampling: SamplingConfig,
    }

    impl Fixture {
        fn new(model: MemoryModel) -> Self {
            Self {
                model,
                cache: GeometryCache::new(),
                diagnostics: Diagnostics::new(),
                sampling: SamplingConfig::default(),
            }
        }

        fn estimator(&self) -> DistanceEstimator<'_> {
            DistanceEstimator::new(&self.model, &self.cache, &self.diagnostics, &self.sampling)
        }
    }

    fn gap_model(gap: f64) -> MemoryModel {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(0.0)]);
        model.add_element(ObjectId(2), "Walls", vec![cube(1.0 + gap)]);
        model
    }

    #[test]
    fn test_gap_beyond_threshold_is_clear() {
        let fixture = Fixture::new(gap_model(mm_to_model(500.0)));
        let mut rng = StdRng::seed_from_u64(1);

        let estimate = fixture
            .estimator()
            .estimate(ObjectId(1), ObjectId(2), mm_to_model(300.0), &mut rng)
            .unwrap();
        assert_eq!(estimate, None);
    }

    #[test]
    fn test_gap_within_threshold_is_soft() {
        let fixture = Fixture::new(gap_model(mm_to_model(500.0)));
        let mut rng = StdRng::seed_from_u64(1);

        let estimate = fixture
            .estimator()
            .estimate(ObjectId(1), ObjectId(2), mm_to_model(600.0), &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(estimate.kind, CollisionKind::Soft);
        assert_relative_eq!(estimate.distance, mm_to_model(500.0), epsilon = 1e-6);
    }

    #[test]
    fn test_intersection_dominates() {
        let fixture = Fixture::new(gap_model(-0.5));
        let mut rng = StdRng::seed_from_u64(1);

        let estimate = fixture
            .estimator()
            .estimate(ObjectId(1), ObjectId(2), 1.0, &mut rng)
            .unwrap();
        assert_eq!(estimate, Some(Estimate::hard()));
    }

    #[test]
    fn test_first_qualifying_solid_pair_wins() {
        let mut model = MemoryModel::new();
        model.add_element(ObjectId(1), "Pipes", vec![cube(-1.3), cube(-1.1)]);
        model.add_element(ObjectId(2), "Walls", vec![cube(0.0)]);
        let fixture = Fixture::new(model);
        let mut rng = StdRng::seed_from_u64(9);

        let estimate = fixture
            .estimator()
            .estimate(ObjectId(1), ObjectId(2), 0.5, &mut rng)
            .unwrap()
            .unwrap();
        assert_relative_eq!(estimate.distance, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_solids_are_clear() {
        let mut model = gap_model(0.1);
        let flat = Primitive::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 0.0));
        model.add_element(ObjectId(3), "Pipes", vec![flat]);
        let fixture = Fixture::new(model);
        let mut rng = StdRng::seed_from_u64(1);

        let estimate = fixture
            .estimator()
            .estimate(ObjectId(3), ObjectId(2), 5.0, &mut rng)
            .unwrap();
        assert_eq!(estimate, None);
        assert_eq!(fixture.diagnostics.count(DiagnosticKind::MissingGeometry), 1);
    }

    #[test]
    fn test_point_to_solid() {
        let fixture = Fixture::new(MemoryModel::new());
        let solid = cube(0.0).to_solid();

        let outside = Point3::new(3.0, 0.5, 0.5);
        assert_relative_eq!(fixture.estimator().point_to_solid(&outside, &solid), 2.0);

        let corner = Point3::new(2.0, 2.0, 2.0);
        assert_relative_eq!(
            fixture.estimator().point_to_solid(&corner, &solid),
            3.0_f64.sqrt()
        );
    }

    #[test]
    fn test_point_near_most_faces_counts_as_inside() {
        let fixture = Fixture::new(MemoryModel::new());
        let tiny = Primitive::cube(Point3::origin(), Vector3::new(0.001, 0.001, 0.001)).to_solid();

        let center = Point3::new(0.0005, 0.0005, 0.0005);
        assert_eq!(fixture.estimator().point_to_solid(&center, &tiny), 0.0);
    }

    /// Unit square face that counts how often it is evaluated and projected onto
    #[derive(Debug)]
    struct CountingFace {
        bounds: UvBounds,
        evaluations: Arc<AtomicUsize>,
        projections: Arc<AtomicUsize>,
    }

    impl Face for CountingFace {
        fn uv_bounds(&self) -> UvBounds {
            self.bounds
        }

        fn evaluate(&self, u: f64, v: f64) -> Result<Point3<f64>, GeometryError> {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
            Ok(Point3::new(u, v, 0.0))
        }

        fn project(&self, point: &Point3<f64>) -> Option<Projection> {
            self.projections.fetch_add(1, Ordering::Relaxed);
            Some(Projection {
                point: *point,
                distance: 1.0,
            })
        }
    }

    struct Counters {
        evaluations: Arc<AtomicUsize>,
        projections: Arc<AtomicUsize>,
    }

    impl Counters {
        fn new() -> Self {
            Self {
                evaluations: Arc::new(AtomicUsize::new(0)),
                projections: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn face(&self, bounds: UvBounds) -> Arc<dyn Face> {
            Arc::new(CountingFace {
                bounds,
                evaluations: Arc::clone(&self.evaluations),
                projections: Arc::clone(&self.projections),
            })
        }

        fn solid(&self, faces: usize) -> Solid {
            let unit = UvBounds::new(0.0, 1.0, 0.0, 1.0);
            Solid::new((0..faces).map(|_| self.face(unit)).collect(), 1.0)
        }
    }

    #[test]
    fn test_face_and_point_caps() {
        let fixture = Fixture::new(MemoryModel::new());
        let source = Counters::new();
        let target = Counters::new();
        let from = source.solid(150);
        let to = target.solid(1);
        let mut rng = StdRng::seed_from_u64(4);

        let distance =
            fixture
                .estimator()
                .solid_distance(&from, &to, (ObjectId(1), ObjectId(2)), &mut rng);
        assert_eq!(distance, 1.0);

        // 100 faces sampled on a 7 x 7 grid, 40 points of each measured
        assert_eq!(source.evaluations.load(Ordering::Relaxed), 100 * 49);
        assert_eq!(target.projections.load(Ordering::Relaxed), 100 * 40);
        assert_eq!(source.projections.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_unsamplable_face_is_skipped() {
        let fixture = Fixture::new(MemoryModel::new());
        let counters = Counters::new();
        let from = Solid::new(
            vec![
                counters.face(UvBounds::new(0.0, f64::INFINITY, 0.0, 1.0)),
                counters.face(UvBounds::new(0.0, 1.0, 0.0, 1.0)),
            ],
            1.0,
        );
        let to = Counters::new().solid(1);
        let mut rng = StdRng::seed_from_u64(4);

        let distance =
            fixture
                .estimator()
                .solid_distance(&from, &to, (ObjectId(1), ObjectId(2)), &mut rng);
        assert_eq!(distance, 1.0);
        assert_eq!(counters.evaluations.load(Ordering::Relaxed), 49);
        assert_eq!(fixture.diagnostics.count(DiagnosticKind::InvalidSampling), 1);
    }
}
