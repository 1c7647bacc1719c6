// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory host backed by primitive shapes

use super::{GeometryHost, Level, Scene, SceneElement, DEFAULT_TOLERANCE};
use crate::collision::ObjectId;
use crate::error::{ClashError, GeometryError};
use crate::geometry::{BoundingBox, Collider, Primitive, Solid};
use ahash::AHashMap;
use std::path::Path;

/// Element stored with its colliders prepared up front
#[derive(Debug, Clone)]
struct StoredElement {
    category: String,
    shapes: Vec<Primitive>,
    colliders: Vec<Collider>,
}

/// A model held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryModel {
    categories: AHashMap<String, Vec<ObjectId>>,
    elements: AHashMap<ObjectId, StoredElement>,
    levels: Vec<Level>,
    tolerance: f64,
    available: bool,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self {
            categories: AHashMap::new(),
            elements: AHashMap::new(),
            levels: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
            available: true,
        }
    }

    /// A host with no active model; every detection run against it fails
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn from_scene(scene: Scene) -> Self {
        let mut model = Self::new();
        if let Some(tolerance) = scene.tolerance {
            model.tolerance = tolerance;
        }
        for level in scene.levels {
            model.add_level(level.name, level.elevation);
        }
        for element in scene.elements {
            model.add_element(element.id, element.category, element.shapes);
        }
        model
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ClashError> {
        Ok(Self::from_scene(Scene::load(path)?))
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn add_level(&mut self, name: impl Into<String>, elevation: f64) {
        self.levels.push(Level {
            name: name.into(),
            elevation,
        });
    }

    /// Insert an element, replacing any element with the same id
    pub fn add_element(
        &mut self,
        id: ObjectId,
        category: impl Into<String>,
        shapes: Vec<Primitive>,
    ) {
        let category = category.into();

        if let Some(previous) = self.elements.remove(&id) {
            if let Some(ids) = self.categories.get_mut(&previous.category) {
                ids.retain(|existing| *existing != id);
            }
        }

        let colliders = shapes
            .iter()
            .filter_map(|shape| Collider::from_primitive(shape).ok())
            .collect();
        self.categories.entry(category.clone()).or_default().push(id);
        self.elements.insert(
            id,
            StoredElement {
                category,
                shapes,
                colliders,
            },
        );
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Snapshot of the model as a serializable scene
    pub fn to_scene(&self) -> Scene {
        let mut elements: Vec<SceneElement> = self
            .elements
            .iter()
            .map(|(id, element)| SceneElement {
                id: *id,
                category: element.category.clone(),
                shapes: element.shapes.clone(),
            })
            .collect();
        elements.sort_by_key(|element| element.id);

        Scene {
            tolerance: Some(self.tolerance),
            levels: self.levels.clone(),
            elements,
        }
    }

    fn element(&self, id: ObjectId) -> Result<&StoredElement, GeometryError> {
        self.elements
            .get(&id)
            .ok_or(GeometryError::UnknownObject(id))
    }
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryHost for MemoryModel {
    fn is_available(&self) -> bool {
        self.available
    }

    fn objects_in(&self, label: &str) -> Option<Vec<ObjectId>> {
        self.categories.get(label).cloned()
    }

    fn bounding_box_of(&self, id: ObjectId) -> Option<BoundingBox> {
        let element = self.elements.get(&id)?;
        element
            .shapes
            .iter()
            .map(Primitive::bounding_box)
            .reduce(|acc, bbox| acc.union(&bbox))
    }

    fn solids_of(&self, id: ObjectId) -> Result<Vec<Solid>, GeometryError> {
        let element = self.element(id)?;
        Ok(element.shapes.iter().map(Primitive::to_solid).collect())
    }

    fn intersects(&self, solid: &Solid, id: ObjectId) -> Result<bool, GeometryError> {
        let primitive = solid.primitive().ok_or_else(|| {
            GeometryError::Unsupported("solid is not backed by a primitive".into())
        })?;
        let probe = Collider::from_primitive(primitive)?;

        for collider in &self.element(id)?.colliders {
            if probe.intersects(collider)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn level_elevation(&self, name: &str) -> Option<f64> {
        self.levels
            .iter()
            .find(|level| level.name == name)
            .map(|level| level.elevation)
    }
}
