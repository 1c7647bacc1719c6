// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives and their solid representation

use super::{BoundingBox, CylinderFace, DiskFace, Face, PlaneFace, Solid};
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

/// Geometric primitives an element can be modelled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    /// Axis-aligned box between two corners
    Cuboid { min: Point3<f64>, max: Point3<f64> },
    /// Circular cylinder standing on `base` along `axis`
    Cylinder {
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
    },
}

impl Primitive {
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        let bbox = BoundingBox::new(min, max);
        Self::Cuboid {
            min: bbox.min,
            max: bbox.max,
        }
    }

    /// Cuboid with one corner at `origin` and the given edge lengths
    pub fn cube(origin: Point3<f64>, size: Vector3<f64>) -> Self {
        Self::cuboid(origin, origin + size)
    }

    pub fn cylinder(base: Point3<f64>, axis: Vector3<f64>, radius: f64, height: f64) -> Self {
        Self::Cylinder {
            base,
            axis,
            radius,
            height,
        }
    }

    /// Unit direction of a cylinder axis, falling back to +Z for a zero axis
    fn unit_axis(axis: &Vector3<f64>) -> Vector3<f64> {
        axis.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
    }

    pub fn volume(&self) -> f64 {
        match self {
            Self::Cuboid { min, max } => BoundingBox::new(*min, *max).volume(),
            Self::Cylinder { radius, height, .. } => {
                if *radius <= 0.0 || *height <= 0.0 {
                    0.0
                } else {
                    PI * radius * radius * height
                }
            }
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Self::Cuboid { min, max } => BoundingBox::new(*min, *max),
            Self::Cylinder {
                base,
                axis,
                radius,
                height,
            } => {
                let axis = Self::unit_axis(axis);
                let top = base + axis * *height;
                // Half-extent of the end disks along each world axis
                let extent = axis.map(|a| radius * (1.0 - a * a).max(0.0).sqrt());
                BoundingBox::new(base - extent, base + extent)
                    .union(&BoundingBox::new(top - extent, top + extent))
            }
        }
    }

    /// Build the boundary faces and volume of this primitive.
    ///
    /// Flat or otherwise degenerate primitives yield a solid with no faces
    /// and zero volume; callers filter those out.
    pub fn to_solid(&self) -> Solid {
        let volume = self.volume();
        if volume <= 0.0 {
            return Solid::from_primitive(Vec::new(), 0.0, *self);
        }

        match self.faces() {
            Ok(faces) => Solid::from_primitive(faces, volume, *self),
            Err(err) => {
                tracing::debug!(primitive = ?self, %err, "primitive has no usable faces");
                Solid::from_primitive(Vec::new(), 0.0, *self)
            }
        }
    }

    fn faces(&self) -> Result<Vec<Arc<dyn Face>>, GeometryError> {
        match self {
            Self::Cuboid { min, max } => cuboid_faces(min, max),
            Self::Cylinder {
                base,
                axis,
                radius,
                height,
            } => cylinder_faces(base, axis, *radius, *height),
        }
    }
}

fn cuboid_faces(min: &Point3<f64>, max: &Point3<f64>) -> Result<Vec<Arc<dyn Face>>, GeometryError> {
    let size = max - min;
    let dx = Vector3::new(size.x, 0.0, 0.0);
    let dy = Vector3::new(0.0, size.y, 0.0);
    let dz = Vector3::new(0.0, 0.0, size.z);

    // Edge order is chosen so that u x v points out of the box
    let faces: Vec<Arc<dyn Face>> = vec![
        Arc::new(PlaneFace::new(*min, dy, dx)?),
        Arc::new(PlaneFace::new(Point3::new(min.x, min.y, max.z), dx, dy)?),
        Arc::new(PlaneFace::new(*min, dz, dy)?),
        Arc::new(PlaneFace::new(Point3::new(max.x, min.y, min.z), dy, dz)?),
        Arc::new(PlaneFace::new(*min, dx, dz)?),
        Arc::new(PlaneFace::new(Point3::new(min.x, max.y, min.z), dz, dx)?),
    ];
    Ok(faces)
}

fn cylinder_faces(
    base: &Point3<f64>,
    axis: &Vector3<f64>,
    radius: f64,
    height: f64,
) -> Result<Vec<Arc<dyn Face>>, GeometryError> {
    let direction = Primitive::unit_axis(axis);
    let top = base + direction * height;

    let faces: Vec<Arc<dyn Face>> = vec![
        Arc::new(CylinderFace::new(*base, direction, radius, height)?),
        Arc::new(DiskFace::new(*base, -direction, radius)?),
        Arc::new(DiskFace::new(top, direction, radius)?),
    ];
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_solid() {
        let cube = Primitive::cube(Point3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 3.0, 4.0));
        let solid = cube.to_solid();

        assert_eq!(solid.face_count(), 6);
        assert_relative_eq!(solid.volume(), 24.0);
        assert_eq!(solid.primitive(), Some(&cube));
        assert_eq!(cube.bounding_box().max, Point3::new(3.0, 5.0, 7.0));
    }

    #[test]
    fn test_cuboid_faces_cover_the_box() {
        let solid = Primitive::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).to_solid();
        let corners: Vec<Point3<f64>> = solid
            .faces()
            .iter()
            .map(|face| {
                let bounds = face.uv_bounds();
                face.evaluate(bounds.u_max, bounds.v_max).unwrap()
            })
            .collect();
        let bbox = BoundingBox::from_points(&corners);
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_flat_cuboid_is_degenerate() {
        let slab = Primitive::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 0.0));
        let solid = slab.to_solid();
        assert_eq!(solid.face_count(), 0);
        assert!(!solid.has_volume());
    }

    #[test]
    fn test_vertical_cylinder_bounds() {
        let pipe = Primitive::cylinder(Point3::origin(), Vector3::z(), 0.5, 3.0);
        let bbox = pipe.bounding_box();

        assert_relative_eq!(bbox.min, Point3::new(-0.5, -0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(bbox.max, Point3::new(0.5, 0.5, 3.0), epsilon = 1e-12);
        assert_relative_eq!(pipe.volume(), PI * 0.75, epsilon = 1e-12);
        assert_eq!(pipe.to_solid().face_count(), 3);
    }

    #[test]
    fn test_horizontal_cylinder_bounds() {
        let duct = Primitive::cylinder(Point3::new(0.0, 0.0, 1.0), Vector3::new(2.0, 0.0, 0.0), 0.25, 4.0);
        let bbox = duct.bounding_box();

        assert_relative_eq!(bbox.min, Point3::new(0.0, -0.25, 0.75), epsilon = 1e-12);
        assert_relative_eq!(bbox.max, Point3::new(4.0, 0.25, 1.25), epsilon = 1e-12);
    }
}
