// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision geometry types

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Triangle geometry that only exists for collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionSection {
    pub vertices: Vec<Point3<f32>>,
    pub indices: Vec<u32>,
}

/// Point cloud approximating a convex volume
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvexHull {
    pub points: Vec<Point3<f32>>,
}

impl ConvexHull {
    pub fn new(points: Vec<Point3<f32>>) -> Self {
        Self { points }
    }
}

/// Where a triangle of the combined collision mesh came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionSource {
    RenderSection(usize),
    CollisionSection(usize),
}

/// All complex collision triangles merged into one indexed mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMesh {
    pub vertices: Vec<Point3<f32>>,
    pub indices: Vec<[u32; 3]>,
    /// One entry per triangle in `indices`.
    pub sources: Vec<CollisionSource>,
}

impl CollisionMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a triangle list, skipping triangles that reference missing
    /// vertices. Returns how many were skipped.
    pub fn append(
        &mut self,
        positions: &[Point3<f32>],
        indices: &[u32],
        source: CollisionSource,
    ) -> usize {
        let offset = self.vertices.len() as u32;
        let count = positions.len() as u32;
        let mut skipped = 0;

        self.vertices.extend_from_slice(positions);
        for tri in indices.chunks_exact(3) {
            if tri.iter().any(|&i| i >= count) {
                skipped += 1;
                continue;
            }
            self.indices
                .push([tri[0] + offset, tri[1] + offset, tri[2] + offset]);
            self.sources.push(source);
        }
        skipped
    }

    /// Origin of the triangle with the given index, e.g. from a ray hit.
    pub fn source_of(&self, triangle: usize) -> Option<CollisionSource> {
        self.sources.get(triangle).copied()
    }
}
