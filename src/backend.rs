//! Rendering backend boundary.
//!
//! The simulation talks to whatever draws it through [`RenderBackend`]. Each
//! particle owns exactly one [`DrawableHandle`]; the handle is neither `Clone`
//! nor `Copy` and [`RenderBackend::destroy_drawable`] takes it by value, so a
//! drawable cannot be released twice.
//!
//! [`DrawableStore`] is the in-process implementation. It keeps the latest
//! vertex data for every drawable; the GPU front end reads visible drawables
//! out of it each frame, and tests inspect it directly.

use std::collections::HashMap;

use glam::{Vec3, Vec4};

/// Opaque reference to a backend drawable.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DrawableHandle(u64);

impl DrawableHandle {
    /// Create a handle from a backend-assigned id.
    ///
    /// Backends call this once per drawable they allocate.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Backend-assigned id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Capabilities the simulation needs from a renderer.
pub trait RenderBackend {
    /// Allocate a drawable with `vertex_count` position and RGBA color slots.
    fn create_drawable(&mut self, vertex_count: usize) -> DrawableHandle;

    /// Replace the drawable's per-vertex data.
    fn update_drawable(&mut self, handle: &DrawableHandle, positions: &[Vec3], colors: &[Vec4]);

    /// Set the drawable-wide opacity multiplier.
    fn set_opacity(&mut self, handle: &DrawableHandle, opacity: f32);

    /// Set the world-space point size.
    fn set_size(&mut self, handle: &DrawableHandle, size: f32);

    /// Make the drawable visible.
    fn add_to_scene(&mut self, handle: &DrawableHandle);

    /// Hide the drawable.
    fn remove_from_scene(&mut self, handle: &DrawableHandle);

    /// Release every resource behind `handle`.
    fn destroy_drawable(&mut self, handle: DrawableHandle);
}

/// Latest state of one drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex colors (RGBA).
    pub colors: Vec<Vec4>,
    /// Opacity multiplier.
    pub opacity: f32,
    /// Point size.
    pub size: f32,
    /// Whether the drawable is in the scene.
    pub visible: bool,
}

impl Drawable {
    fn new(vertex_count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; vertex_count],
            colors: vec![Vec4::ZERO; vertex_count],
            opacity: 1.0,
            size: 1.0,
            visible: false,
        }
    }
}

/// Headless drawable storage with allocation bookkeeping.
#[derive(Debug, Default)]
pub struct DrawableStore {
    drawables: HashMap<u64, Drawable>,
    /// Creation order, so readers see a stable draw order.
    order: Vec<u64>,
    next_id: u64,
    created: u64,
    destroyed: u64,
    dirty: bool,
}

impl DrawableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawable by id, if it is still alive.
    pub fn get(&self, id: u64) -> Option<&Drawable> {
        self.drawables.get(&id)
    }

    /// Number of live (created, not yet destroyed) drawables.
    pub fn live(&self) -> usize {
        self.drawables.len()
    }

    /// Total drawables ever created.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Total drawables destroyed.
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Whether `id` refers to a live drawable.
    pub fn is_live(&self, id: u64) -> bool {
        self.drawables.contains_key(&id)
    }

    /// Visible drawables in creation order.
    pub fn visible(&self) -> impl Iterator<Item = &Drawable> {
        self.order
            .iter()
            .filter_map(|id| self.drawables.get(id))
            .filter(|d| d.visible)
    }

    /// Total vertex count across visible drawables.
    pub fn visible_vertex_count(&self) -> usize {
        self.visible().map(|d| d.positions.len()).sum()
    }

    /// Return and reset the dirty flag.
    ///
    /// Set by any change since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn with_drawable(&mut self, handle: &DrawableHandle, f: impl FnOnce(&mut Drawable)) {
        match self.drawables.get_mut(&handle.id()) {
            Some(d) => {
                f(d);
                self.dirty = true;
            }
            None => tracing::warn!(id = handle.id(), "update for unknown drawable"),
        }
    }
}

impl RenderBackend for DrawableStore {
    fn create_drawable(&mut self, vertex_count: usize) -> DrawableHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.created += 1;
        self.drawables.insert(id, Drawable::new(vertex_count));
        self.order.push(id);
        DrawableHandle::from_raw(id)
    }

    fn update_drawable(&mut self, handle: &DrawableHandle, positions: &[Vec3], colors: &[Vec4]) {
        self.with_drawable(handle, |d| {
            d.positions.clear();
            d.positions.extend_from_slice(positions);
            d.colors.clear();
            d.colors.extend_from_slice(colors);
        });
    }

    fn set_opacity(&mut self, handle: &DrawableHandle, opacity: f32) {
        self.with_drawable(handle, |d| d.opacity = opacity);
    }

    fn set_size(&mut self, handle: &DrawableHandle, size: f32) {
        self.with_drawable(handle, |d| d.size = size);
    }

    fn add_to_scene(&mut self, handle: &DrawableHandle) {
        self.with_drawable(handle, |d| d.visible = true);
    }

    fn remove_from_scene(&mut self, handle: &DrawableHandle) {
        self.with_drawable(handle, |d| d.visible = false);
    }

    fn destroy_drawable(&mut self, handle: DrawableHandle) {
        if self.drawables.remove(&handle.id()).is_some() {
            self.destroyed += 1;
            self.order.retain(|&id| id != handle.id());
            self.dirty = true;
        } else {
            tracing::warn!(id = handle.id(), "destroy for unknown drawable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_destroy() {
        let mut store = DrawableStore::new();
        let a = store.create_drawable(3);
        let b = store.create_drawable(5);
        assert_ne!(a.id(), b.id());
        assert_eq!(store.live(), 2);
        assert_eq!(store.get(b.id()).unwrap().positions.len(), 5);

        let a_id = a.id();
        store.destroy_drawable(a);
        assert!(!store.is_live(a_id));
        assert_eq!(store.live(), 1);
        assert_eq!(store.created(), 2);
        assert_eq!(store.destroyed(), 1);
    }

    #[test]
    fn test_visibility_and_order() {
        let mut store = DrawableStore::new();
        let a = store.create_drawable(1);
        let b = store.create_drawable(2);
        assert_eq!(store.visible().count(), 0);

        store.add_to_scene(&b);
        store.add_to_scene(&a);
        let sizes: Vec<usize> = store.visible().map(|d| d.positions.len()).collect();
        assert_eq!(sizes, vec![1, 2]);
        assert_eq!(store.visible_vertex_count(), 3);

        store.remove_from_scene(&a);
        assert_eq!(store.visible_vertex_count(), 2);
    }

    #[test]
    fn test_update_marks_dirty() {
        let mut store = DrawableStore::new();
        let a = store.create_drawable(2);
        store.take_dirty();

        store.update_drawable(&a, &[Vec3::X, Vec3::Y], &[Vec4::ONE, Vec4::ZERO]);
        assert!(store.take_dirty());
        assert!(!store.take_dirty());

        let d = store.get(a.id()).unwrap();
        assert_eq!(d.positions, vec![Vec3::X, Vec3::Y]);
        assert_eq!(d.colors[0], Vec4::ONE);
    }

    #[test]
    fn test_opacity_and_size() {
        let mut store = DrawableStore::new();
        let a = store.create_drawable(1);
        store.set_opacity(&a, 0.25);
        store.set_size(&a, 0.7);
        let d = store.get(a.id()).unwrap();
        assert_eq!(d.opacity, 0.25);
        assert_eq!(d.size, 0.7);
    }
}
