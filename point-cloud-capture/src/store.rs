/// Accumulated point cloud: first-writer-wins map from grid cell to vertex
use crate::grid_key::GridKey;
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use parking_lot::RwLock;
use std::collections::HashMap;

/// One stored point. Colour channels are normalised to [0, 1].
/// `#[repr(C)]` so render collaborators can upload a snapshot as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

#[derive(Default)]
struct StoreInner {
    index: HashMap<GridKey, usize>,
    /// Insertion order. Snapshots and the downsampler enumerate this.
    vertices: Vec<Vertex>,
}

/// Concurrent point store. Entries are never removed or replaced, and the store is
/// deliberately unbounded: it grows for the whole capture session.
///
/// Writes take the lock exclusively; the capture session is the only writer.
/// Readers copy the vertex list under a shared lock, so a snapshot never sees a
/// partially written vertex.
#[derive(Default)]
pub struct PointStore {
    inner: RwLock<StoreInner>,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `vertex` unless `key` is already present. Returns whether it was inserted.
    pub fn insert_if_absent(&self, key: GridKey, vertex: Vertex) -> bool {
        let mut inner = self.inner.write();
        Self::insert_locked(&mut inner, key, vertex)
    }

    /// Applies `insert_if_absent` to every entry in order under a single write lock.
    /// Returns the number of vertices inserted.
    pub fn extend_if_absent<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (GridKey, Vertex)>,
    {
        let mut inner = self.inner.write();
        let mut inserted = 0;
        for (key, vertex) in entries {
            if Self::insert_locked(&mut inner, key, vertex) {
                inserted += 1;
            }
        }
        inserted
    }

    fn insert_locked(inner: &mut StoreInner, key: GridKey, vertex: Vertex) -> bool {
        if inner.index.contains_key(&key) {
            return false;
        }
        let slot = inner.vertices.len();
        inner.vertices.push(vertex);
        inner.index.insert(key, slot);
        true
    }

    /// Point-in-time copy of every stored vertex, in insertion order.
    pub fn snapshot(&self) -> Vec<Vertex> {
        self.inner.read().vertices.clone()
    }

    pub fn count(&self) -> usize {
        self.inner.read().vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn get(&self, key: &GridKey) -> Option<Vertex> {
        let inner = self.inner.read();
        inner.index.get(key).map(|&slot| inner.vertices[slot])
    }
}
