// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact intersection queries using parry3d

use super::Primitive;
use crate::error::GeometryError;
use nalgebra::Point3;
use parry3d::math::{Isometry, Real, Vector};
use parry3d::na::{Translation3, UnitQuaternion};
use parry3d::query;
use parry3d::shape::SharedShape;
use std::f32::consts::PI;

/// A primitive placed in the world as a parry3d shape.
///
/// The placement stays in f64. Queries narrow it to parry's f32 only after
/// moving the pair next to the origin, so model coordinates far from the
/// origin keep their precision.
#[derive(Clone)]
pub struct Collider {
    center: Point3<f64>,
    rotation: UnitQuaternion<Real>,
    shape: SharedShape,
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("center", &self.center)
            .field("shape", &self.shape.shape_type())
            .finish()
    }
}

impl Collider {
    pub fn from_primitive(primitive: &Primitive) -> Result<Self, GeometryError> {
        if primitive.volume() <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "{primitive:?} has no volume"
            )));
        }

        match primitive {
            Primitive::Cuboid { .. } => {
                let bbox = primitive.bounding_box();
                let half = bbox.size() / 2.0;
                Ok(Self {
                    center: bbox.center(),
                    rotation: UnitQuaternion::identity(),
                    shape: SharedShape::cuboid(half.x as Real, half.y as Real, half.z as Real),
                })
            }
            Primitive::Cylinder {
                base,
                axis,
                radius,
                height,
            } => {
                let axis = axis
                    .try_normalize(f64::EPSILON)
                    .ok_or_else(|| GeometryError::Degenerate("zero-length cylinder axis".into()))?;
                let direction = Vector::new(axis.x as Real, axis.y as Real, axis.z as Real);

                // parry cylinders run along local +Y
                let rotation = UnitQuaternion::rotation_between(&Vector::y(), &direction)
                    .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector::x_axis(), PI));

                Ok(Self {
                    center: base + axis * (height / 2.0),
                    rotation,
                    shape: SharedShape::cylinder((height / 2.0) as Real, *radius as Real),
                })
            }
        }
    }

    /// Placement of this shape with `origin` moved to zero
    fn position_from(&self, origin: &Point3<f64>) -> Isometry<Real> {
        let offset = self.center - *origin;
        let translation = Translation3::new(offset.x as Real, offset.y as Real, offset.z as Real);
        Isometry::from_parts(translation, self.rotation)
    }

    /// True if the two shapes overlap or touch
    pub fn intersects(&self, other: &Collider) -> Result<bool, GeometryError> {
        query::intersection_test(
            &self.position_from(&self.center),
            self.shape.as_ref(),
            &other.position_from(&self.center),
            other.shape.as_ref(),
        )
        .map_err(|_| {
            GeometryError::Unsupported(format!(
                "intersection test between {:?} and {:?}",
                self.shape.shape_type(),
                other.shape.shape_type()
            ))
        })
    }
}
