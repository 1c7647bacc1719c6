// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! UV grid sampling of faces

use crate::config::SamplingConfig;
use crate::error::GeometryError;
use crate::geometry::{Face, UvBounds};
use nalgebra::Point3;
use rand::seq::SliceRandom;
use rand::Rng;

/// Grid points per UV direction, never fewer than two
const MIN_STEPS: usize = 2;

/// Number of grid points along U and V for a parameter rectangle.
///
/// Counts follow the nominal spacing and are scaled down together when
/// their product would exceed the grid cap.
pub fn grid_counts(bounds: &UvBounds, config: &SamplingConfig) -> (usize, usize) {
    let mut nu = steps_for(bounds.u_range(), config.base_step);
    let mut nv = steps_for(bounds.v_range(), config.base_step);

    let total = nu as f64 * nv as f64;
    let cap = config.max_grid_points as f64;
    if total > cap {
        let factor = (cap / total).sqrt();
        nu = ((nu as f64 * factor) as usize).max(MIN_STEPS);
        nv = ((nv as f64 * factor) as usize).max(MIN_STEPS);
    }
    (nu, nv)
}

fn steps_for(range: f64, base_step: f64) -> usize {
    ((range / base_step) as usize).max(MIN_STEPS)
}

/// Evaluate a face over its UV grid and return the points in random order.
///
/// Grid parameters the face cannot evaluate are skipped. A domain that
/// yields non-finite steps is an error and produces no points.
pub fn sample_face<R: Rng + ?Sized>(
    face: &dyn Face,
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<Vec<Point3<f64>>, GeometryError> {
    let bounds = face.uv_bounds();
    let (nu, nv) = grid_counts(&bounds, config);

    let u_step = bounds.u_range() / (nu - 1) as f64;
    let v_step = bounds.v_range() / (nv - 1) as f64;
    if !u_step.is_finite() || !v_step.is_finite() {
        return Err(GeometryError::Degenerate(format!(
            "non-finite UV steps ({u_step}, {v_step})"
        )));
    }

    let mut points = Vec::with_capacity(nu * nv);
    for i in 0..nu {
        let u = bounds.u_min + i as f64 * u_step;
        for j in 0..nv {
            let v = bounds.v_min + j as f64 * v_step;
            if let Ok(point) = face.evaluate(u, v) {
                points.push(point);
            }
        }
    }

    points.shuffle(rng);
    Ok(points)
}
