// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contract with the external 3D viewer.
//!
//! Rendering, raycasting and camera animation live in the viewer engine. The
//! shell only needs to enumerate objects, flip their visible flag, read and
//! write the selection, set a material override and ask the camera to frame
//! a box. [`InMemoryScene`] implements the same contract without a renderer.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use crate::element::{DocumentId, ObjectId};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
}

/// Scene-wide material used while an isolation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialOverride {
    /// Translucent shading for context geometry.
    Ghost,
}

/// The slice of the viewer engine the shell talks to.
pub trait Scene {
    /// Scene objects, optionally limited to one loaded document.
    fn all_objects(&self, scope: Option<DocumentId>) -> Vec<ObjectId>;

    /// Whether the object still exists (its document may have been unloaded).
    fn contains(&self, object: ObjectId) -> bool;

    fn is_visible(&self, object: ObjectId) -> bool;

    fn set_visible(&mut self, object: ObjectId, visible: bool);

    /// Currently selected objects.
    fn selection(&self) -> Vec<ObjectId>;

    /// Replaces the selection.
    fn select(&mut self, objects: &[ObjectId]);

    fn add_to_selection(&mut self, objects: &[ObjectId]);

    fn remove_from_selection(&mut self, objects: &[ObjectId]);

    fn clear_selection(&mut self);

    fn set_material_override(&mut self, material: Option<MaterialOverride>);

    fn bounding_box(&self, object: ObjectId) -> Option<Bounds>;

    /// Moves the camera so the box fills the view.
    fn frame(&mut self, bounds: Bounds);

    /// Union of the objects' boxes; objects without geometry are skipped.
    fn bounds_of(&self, objects: &[ObjectId]) -> Option<Bounds> {
        objects
            .iter()
            .filter_map(|&o| self.bounding_box(o))
            .reduce(|a, b| a.union(&b))
    }
}

#[derive(Debug, Clone)]
struct SceneObject {
    document: DocumentId,
    visible: bool,
    bounds: Option<Bounds>,
}

/// A scene without a renderer.
///
/// Keeps insertion order for [`Scene::all_objects`] and records what the
/// camera was asked to frame.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    order: Vec<ObjectId>,
    objects: FxHashMap<ObjectId, SceneObject>,
    selection: Vec<ObjectId>,
    material: Option<MaterialOverride>,
    framed: Vec<Bounds>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible object. Re-adding an id replaces its data.
    pub fn insert(&mut self, object: ObjectId, document: DocumentId, bounds: Option<Bounds>) {
        let previous = self.objects.insert(
            object,
            SceneObject {
                document,
                visible: true,
                bounds,
            },
        );
        if previous.is_none() {
            self.order.push(object);
        }
    }

    /// Removes an object, as when its document is unloaded.
    pub fn remove(&mut self, object: ObjectId) {
        if self.objects.remove(&object).is_some() {
            self.order.retain(|&o| o != object);
            self.selection.retain(|&o| o != object);
        }
    }

    /// Objects whose visible flag is set, in insertion order.
    pub fn visible_objects(&self) -> Vec<ObjectId> {
        self.order
            .iter()
            .copied()
            .filter(|o| self.objects.get(o).is_some_and(|s| s.visible))
            .collect()
    }

    pub fn material(&self) -> Option<MaterialOverride> {
        self.material
    }

    /// Boxes passed to [`Scene::frame`], oldest first.
    pub fn framed(&self) -> &[Bounds] {
        &self.framed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Scene for InMemoryScene {
    fn all_objects(&self, scope: Option<DocumentId>) -> Vec<ObjectId> {
        self.order
            .iter()
            .copied()
            .filter(|o| match scope {
                Some(doc) => self.objects.get(o).is_some_and(|s| s.document == doc),
                None => true,
            })
            .collect()
    }

    fn contains(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }

    fn is_visible(&self, object: ObjectId) -> bool {
        self.objects.get(&object).is_some_and(|s| s.visible)
    }

    fn set_visible(&mut self, object: ObjectId, visible: bool) {
        if let Some(s) = self.objects.get_mut(&object) {
            s.visible = visible;
        }
    }

    fn selection(&self) -> Vec<ObjectId> {
        self.selection.clone()
    }

    fn select(&mut self, objects: &[ObjectId]) {
        self.selection.clear();
        self.add_to_selection(objects);
    }

    fn add_to_selection(&mut self, objects: &[ObjectId]) {
        for &o in objects {
            if self.objects.contains_key(&o) && !self.selection.contains(&o) {
                self.selection.push(o);
            }
        }
    }

    fn remove_from_selection(&mut self, objects: &[ObjectId]) {
        self.selection.retain(|o| !objects.contains(o));
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn set_material_override(&mut self, material: Option<MaterialOverride>) {
        self.material = material;
    }

    fn bounding_box(&self, object: ObjectId) -> Option<Bounds> {
        self.objects.get(&object).and_then(|s| s.bounds)
    }

    fn frame(&mut self, bounds: Bounds) {
        self.framed.push(bounds);
    }
}
