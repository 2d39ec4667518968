// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision state and rebuilds

use super::{CollisionInput, CollisionMesh, CollisionSection, CollisionSource, ConvexHull, PhysicsBackend};
use crate::error::MeshError;
use crate::mesh::{validate_indices, SectionStore};
use nalgebra::Point3;

/// Collision-only sections, convex hulls and the dirty flag
#[derive(Debug, Clone)]
pub struct CollisionManager {
    sections: Vec<Option<CollisionSection>>,
    convex_hulls: Vec<ConvexHull>,
    use_complex_as_simple: bool,
    dirty: bool,
}

impl CollisionManager {
    pub fn new(use_complex_as_simple: bool) -> Self {
        Self {
            sections: Vec::new(),
            convex_hulls: Vec::new(),
            use_complex_as_simple,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn use_complex_as_simple(&self) -> bool {
        self.use_complex_as_simple
    }

    pub fn set_use_complex_as_simple(&mut self, enabled: bool) {
        self.use_complex_as_simple = enabled;
        self.dirty = true;
    }

    pub fn set_section(
        &mut self,
        index: usize,
        vertices: Vec<Point3<f32>>,
        indices: Vec<u32>,
    ) -> Result<(), MeshError> {
        validate_indices(&indices, vertices.len())?;
        if index >= self.sections.len() {
            self.sections.resize_with(index + 1, || None);
        }
        self.sections[index] = Some(CollisionSection { vertices, indices });
        self.dirty = true;
        Ok(())
    }

    pub fn clear_section(&mut self, index: usize) {
        if let Some(slot) = self.sections.get_mut(index) {
            *slot = None;
        }
        while matches!(self.sections.last(), Some(None)) {
            self.sections.pop();
        }
        self.dirty = true;
    }

    pub fn clear_all_sections(&mut self) {
        self.sections.clear();
        self.dirty = true;
    }

    pub fn section(&self, index: usize) -> Option<&CollisionSection> {
        self.sections.get(index).and_then(Option::as_ref)
    }

    /// Live collision sections in index order.
    pub fn sections(&self) -> impl Iterator<Item = (usize, &CollisionSection)> {
        self.sections
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|section| (index, section)))
    }

    /// Slot count, holes included.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn add_convex_hull(&mut self, points: Vec<Point3<f32>>) {
        self.convex_hulls.push(ConvexHull::new(points));
        self.dirty = true;
    }

    pub fn clear_convex_hulls(&mut self) {
        self.convex_hulls.clear();
        self.dirty = true;
    }

    pub fn set_convex_hulls(&mut self, hulls: Vec<Vec<Point3<f32>>>) {
        self.convex_hulls = hulls.into_iter().map(ConvexHull::new).collect();
        self.dirty = true;
    }

    pub fn convex_hulls(&self) -> &[ConvexHull] {
        &self.convex_hulls
    }

    /// Merge collision-enabled render sections and collision-only sections
    /// into one mesh. `None` when there is not a single triangle.
    pub fn build_complex_mesh(&self, render: &SectionStore) -> Option<CollisionMesh> {
        let mut mesh = CollisionMesh::default();

        for (index, section) in render.iter().filter(|(_, s)| s.collision_enabled) {
            let skipped = mesh.append(
                &section.vertices().positions(),
                section.indices(),
                CollisionSource::RenderSection(index),
            );
            if skipped > 0 {
                log::warn!(
                    "section {}: {} triangles reference missing vertices, left out of collision",
                    index,
                    skipped
                );
            }
        }

        for (index, section) in self.sections() {
            mesh.append(
                &section.vertices,
                &section.indices,
                CollisionSource::CollisionSection(index),
            );
        }

        if mesh.is_empty() {
            None
        } else {
            Some(mesh)
        }
    }

    /// Cook collision if anything changed since the last successful cook.
    ///
    /// Returns the new handle, or `None` when nothing was dirty. A failed cook
    /// leaves the state dirty so the next call retries.
    pub fn rebuild_if_dirty<P: PhysicsBackend>(
        &mut self,
        render: &SectionStore,
        physics: &mut P,
    ) -> Result<Option<P::Handle>, MeshError> {
        if !self.dirty {
            return Ok(None);
        }

        let complex = self.build_complex_mesh(render);
        log::debug!(
            "rebuilding collision: {} triangles, {} convex hulls",
            complex.as_ref().map_or(0, CollisionMesh::triangle_count),
            self.convex_hulls.len()
        );

        let input = CollisionInput {
            complex: complex.as_ref(),
            convex_hulls: &self.convex_hulls,
            use_complex_as_simple: self.use_complex_as_simple,
        };
        match physics.cook(input) {
            Ok(handle) => {
                self.dirty = false;
                Ok(Some(handle))
            }
            Err(err) => {
                log::warn!("collision cooking failed: {err:#}");
                Err(MeshError::CollisionCook(format!("{err:#}")))
            }
        }
    }
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new(true)
    }
}
