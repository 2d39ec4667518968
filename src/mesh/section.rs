// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh sections and the buffer update protocol
//!
//! Buffers are held behind `Arc` and never written in place: every update
//! swaps in a fresh allocation. Snapshots handed to the render proxy therefore
//! stay valid and read-only no matter what the owner does next.

use crate::error::MeshError;
use crate::geometry::{BoundingBox, VertexBuffer, VertexFormat};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Expected update cadence of a section
///
/// Only a storage hint for the renderer; it never changes behavior here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpdateFrequency {
    Frequent,
    #[default]
    Average,
    Infrequent,
}

/// Per-call options for section create/update
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Trusted as the section's local bounds instead of scanning the vertices.
    pub bounding_box: Option<BoundingBox>,
}

impl UpdateOptions {
    pub fn with_bounds(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box: Some(bounding_box),
        }
    }
}

/// One independently updatable chunk of geometry
#[derive(Debug, Clone)]
pub struct Section {
    vertices: Arc<VertexBuffer>,
    indices: Arc<[u32]>,
    local_bounds: BoundingBox,
    pub collision_enabled: bool,
    pub update_frequency: UpdateFrequency,
    pub visible: bool,
    pub casts_shadow: bool,
}

impl Section {
    /// New visible, shadow casting section without collision.
    ///
    /// Indices are not validated here; see [`validate_indices`].
    pub fn new(vertices: VertexBuffer, indices: Vec<u32>, bounds: Option<BoundingBox>) -> Self {
        let local_bounds = resolve_bounds(&vertices, bounds);
        Self {
            vertices: Arc::new(vertices),
            indices: indices.into(),
            local_bounds,
            collision_enabled: false,
            update_frequency: UpdateFrequency::default(),
            visible: true,
            casts_shadow: true,
        }
    }

    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    pub fn shared_vertices(&self) -> Arc<VertexBuffer> {
        Arc::clone(&self.vertices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn shared_indices(&self) -> Arc<[u32]> {
        Arc::clone(&self.indices)
    }

    pub fn local_bounds(&self) -> BoundingBox {
        self.local_bounds
    }

    pub fn format(&self) -> VertexFormat {
        self.vertices.format()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Swap in a new vertex buffer, keeping the index buffer.
    ///
    /// Bounds come from `bounds` when given, otherwise from the new vertices.
    /// Returns whether the section bounds changed.
    pub fn replace_vertices(&mut self, vertices: VertexBuffer, bounds: Option<BoundingBox>) -> bool {
        let new_bounds = resolve_bounds(&vertices, bounds);
        self.vertices = Arc::new(vertices);
        let changed = new_bounds != self.local_bounds;
        self.local_bounds = new_bounds;
        changed
    }

    pub fn replace_indices(&mut self, indices: Vec<u32>) {
        self.indices = indices.into();
    }
}

// Section bounds are never inverted: no geometry maps to the zero box.
fn resolve_bounds(vertices: &VertexBuffer, bounds: Option<BoundingBox>) -> BoundingBox {
    match bounds {
        Some(bounds) if bounds.is_empty() => BoundingBox::zero(),
        Some(bounds) => bounds,
        None => vertices.bounding_box(),
    }
}

/// Index buffers must describe whole triangles over existing vertices.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::InvalidIndexCount { len: indices.len() });
    }
    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i as usize >= vertex_count)
    {
        return Err(MeshError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }
    Ok(())
}
