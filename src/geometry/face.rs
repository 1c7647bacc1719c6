// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parametric faces over a rectangular UV domain
//!
//! A face can be evaluated at a UV parameter and can project an arbitrary
//! point onto its closest point. The analytic faces here are what the
//! in-memory host builds solids from; other hosts provide their own.

use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;
use std::fmt::Debug;

/// Slack allowed when evaluating right at the edge of a UV domain
const DOMAIN_EPSILON: f64 = 1e-9;

/// UV parameter rectangle of a face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl UvBounds {
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    pub fn u_range(&self) -> f64 {
        self.u_max - self.u_min
    }

    pub fn v_range(&self) -> f64 {
        self.v_max - self.v_min
    }

    pub fn contains(&self, u: f64, v: f64) -> bool {
        u >= self.u_min - DOMAIN_EPSILON
            && u <= self.u_max + DOMAIN_EPSILON
            && v >= self.v_min - DOMAIN_EPSILON
            && v <= self.v_max + DOMAIN_EPSILON
    }
}

/// Closest point on a face and its distance to the query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: Point3<f64>,
    pub distance: f64,
}

impl Projection {
    fn between(query: &Point3<f64>, point: Point3<f64>) -> Self {
        Self {
            point,
            distance: nalgebra::distance(query, &point),
        }
    }
}

/// A bounded parametric surface
pub trait Face: Debug + Send + Sync {
    /// Parameter rectangle the face is defined over
    fn uv_bounds(&self) -> UvBounds;

    /// Point on the face at `(u, v)`
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3<f64>, GeometryError>;

    /// Closest point on the face to `point`, or `None` if the face cannot
    /// project it
    fn project(&self, point: &Point3<f64>) -> Option<Projection>;
}

/// Rectangular planar patch: `origin + u * u_dir + v * v_dir`
#[derive(Debug, Clone)]
pub struct PlaneFace {
    origin: Point3<f64>,
    u_dir: Vector3<f64>,
    v_dir: Vector3<f64>,
    bounds: UvBounds,
}

impl PlaneFace {
    /// Build a patch spanned by two edge vectors from `origin`.
    ///
    /// The edges must be non-zero and orthogonal.
    pub fn new(
        origin: Point3<f64>,
        u_edge: Vector3<f64>,
        v_edge: Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        let u_len = u_edge.norm();
        let v_len = v_edge.norm();
        if u_len <= f64::EPSILON || v_len <= f64::EPSILON {
            return Err(GeometryError::Degenerate("zero-length plane edge".into()));
        }
        if (u_edge.dot(&v_edge) / (u_len * v_len)).abs() > 1e-9 {
            return Err(GeometryError::Degenerate("plane edges are not orthogonal".into()));
        }

        Ok(Self {
            origin,
            u_dir: u_edge / u_len,
            v_dir: v_edge / v_len,
            bounds: UvBounds::new(0.0, u_len, 0.0, v_len),
        })
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.u_dir.cross(&self.v_dir)
    }

    fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + self.u_dir * u + self.v_dir * v
    }
}

impl Face for PlaneFace {
    fn uv_bounds(&self) -> UvBounds {
        self.bounds
    }

    fn evaluate(&self, u: f64, v: f64) -> Result<Point3<f64>, GeometryError> {
        if !self.bounds.contains(u, v) {
            return Err(GeometryError::OutOfDomain { u, v });
        }
        Ok(self.point_at(u, v))
    }

    fn project(&self, point: &Point3<f64>) -> Option<Projection> {
        let offset = point - self.origin;
        let u = offset
            .dot(&self.u_dir)
            .clamp(self.bounds.u_min, self.bounds.u_max);
        let v = offset
            .dot(&self.v_dir)
            .clamp(self.bounds.v_min, self.bounds.v_max);
        Some(Projection::between(point, self.point_at(u, v)))
    }
}

/// Local orthonormal frame around an axis
#[derive(Debug, Clone, Copy)]
struct AxisFrame {
    origin: Point3<f64>,
    axis: Vector3<f64>,
    x_dir: Vector3<f64>,
    y_dir: Vector3<f64>,
}

impl AxisFrame {
    fn new(origin: Point3<f64>, axis: Vector3<f64>) -> Result<Self, GeometryError> {
        let length = axis.norm();
        if length <= f64::EPSILON {
            return Err(GeometryError::Degenerate("zero-length axis".into()));
        }
        let axis = axis / length;
        // Any vector not parallel to the axis seeds the frame
        let seed = if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let x_dir = axis.cross(&seed).normalize();
        let y_dir = axis.cross(&x_dir);
        Ok(Self {
            origin,
            axis,
            x_dir,
            y_dir,
        })
    }

    fn radial(&self, angle: f64) -> Vector3<f64> {
        self.x_dir * angle.cos() + self.y_dir * angle.sin()
    }

    /// Axial height, radial distance and angle in [0, TAU) of a point
    fn decompose(&self, point: &Point3<f64>) -> (f64, f64, f64) {
        let offset = point - self.origin;
        let height = offset.dot(&self.axis);
        let radial = offset - self.axis * height;
        let angle = radial
            .dot(&self.y_dir)
            .atan2(radial.dot(&self.x_dir))
            .rem_euclid(TAU);
        (height, radial.norm(), angle)
    }
}

/// Clamp an angle to `[start, end]` on the circle, snapping to the nearer end
fn clamp_angle(angle: f64, start: f64, end: f64) -> f64 {
    if end - start >= TAU {
        return angle;
    }
    let relative = (angle - start).rem_euclid(TAU);
    let span = end - start;
    if relative <= span {
        start + relative
    } else if relative - span < TAU - relative {
        end
    } else {
        start
    }
}

/// Lateral patch of a circular cylinder.
///
/// `u` is the angle around the axis, `v` the height along it.
#[derive(Debug, Clone)]
pub struct CylinderFace {
    frame: AxisFrame,
    radius: f64,
    bounds: UvBounds,
}

impl CylinderFace {
    pub fn new(
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
    ) -> Result<Self, GeometryError> {
        Self::with_sweep(base, axis, radius, height, 0.0, TAU)
    }

    /// Cylinder patch restricted to the angular range `[start, end]`
    pub fn with_sweep(
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
        start: f64,
        end: f64,
    ) -> Result<Self, GeometryError> {
        if radius <= 0.0 || height <= 0.0 || end <= start {
            return Err(GeometryError::Degenerate(format!(
                "cylinder patch r={radius} h={height} sweep=[{start}, {end}]"
            )));
        }
        Ok(Self {
            frame: AxisFrame::new(base, axis)?,
            radius,
            bounds: UvBounds::new(start, end, 0.0, height),
        })
    }

    fn point_at(&self, angle: f64, height: f64) -> Point3<f64> {
        self.frame.origin
            + self.frame.axis * height
            + self.frame.radial(angle) * self.radius
    }
}

impl Face for CylinderFace {
    fn uv_bounds(&self) -> UvBounds {
        self.bounds
    }

    fn evaluate(&self, u: f64, v: f64) -> Result<Point3<f64>, GeometryError> {
        if !self.bounds.contains(u, v) {
            return Err(GeometryError::OutOfDomain { u, v });
        }
        Ok(self.point_at(u, v))
    }

    fn project(&self, point: &Point3<f64>) -> Option<Projection> {
        let (height, _, angle) = self.frame.decompose(point);
        let angle = clamp_angle(angle, self.bounds.u_min, self.bounds.u_max);
        let height = height.clamp(self.bounds.v_min, self.bounds.v_max);
        Some(Projection::between(point, self.point_at(angle, height)))
    }
}

/// Flat circular disk, used for cylinder caps.
///
/// `u` is the radial distance from the center, `v` the angle.
#[derive(Debug, Clone)]
pub struct DiskFace {
    frame: AxisFrame,
    bounds: UvBounds,
}

impl DiskFace {
    pub fn new(
        center: Point3<f64>,
        normal: Vector3<f64>,
        radius: f64,
    ) -> Result<Self, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::Degenerate(format!("disk radius {radius}")));
        }
        Ok(Self {
            frame: AxisFrame::new(center, normal)?,
            bounds: UvBounds::new(0.0, radius, 0.0, TAU),
        })
    }

    fn point_at(&self, radius: f64, angle: f64) -> Point3<f64> {
        self.frame.origin + self.frame.radial(angle) * radius
    }
}

impl Face for DiskFace {
    fn uv_bounds(&self) -> UvBounds {
        self.bounds
    }

    fn evaluate(&self, u: f64, v: f64) -> Result<Point3<f64>, GeometryError> {
        if !self.bounds.contains(u, v) {
            return Err(GeometryError::OutOfDomain { u, v });
        }
        Ok(self.point_at(u, v))
    }

    fn project(&self, point: &Point3<f64>) -> Option<Projection> {
        let (_, radial, angle) = self.frame.decompose(point);
        let radius = radial.min(self.bounds.u_max);
        Some(Projection::between(point, self.point_at(radius, angle)))
    }
}
