// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Serializable scene description loaded by the in-memory host

use crate::collision::ObjectId;
use crate::error::ClashError;
use crate::geometry::Primitive;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named building level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Elevation in model units
    pub elevation: f64,
}

/// One model element and the primitives it is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: ObjectId,
    pub category: String,
    #[serde(default)]
    pub shapes: Vec<Primitive>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub elements: Vec<SceneElement>,
}

impl Scene {
    pub fn from_json_str(json: &str) -> Result<Self, ClashError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClashError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn to_json(&self) -> Result<String, ClashError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_parse_scene() {
        let json = r#"{
            "levels": [{ "name": "1F", "elevation": 0.0 }],
            "elements": [
                {
                    "id": 101,
                    "category": "Pipes",
                    "shapes": [
                        { "type": "cylinder", "base": [0, 0, 1], "axis": [1, 0, 0], "radius": 0.1, "height": 5 }
                    ]
                },
                {
                    "id": 202,
                    "category": "Walls",
                    "shapes": [{ "type": "cuboid", "min": [2, -1, 0], "max": [2.5, 1, 3] }]
                }
            ]
        }"#;

        let scene = Scene::from_json_str(json).unwrap();
        assert_eq!(scene.tolerance, None);
        assert_eq!(scene.elements.len(), 2);
        assert_eq!(scene.elements[0].id, ObjectId(101));
        assert_eq!(
            scene.elements[1].shapes[0],
            Primitive::cuboid(Point3::new(2.0, -1.0, 0.0), Point3::new(2.5, 1.0, 3.0))
        );
    }

    #[test]
    fn test_malformed_scene_is_an_error() {
        assert!(matches!(
            Scene::from_json_str("{ \"elements\": 3 }"),
            Err(ClashError::Scene(_))
        ));
    }
}
