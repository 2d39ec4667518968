// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runtime mesh container
//!
//! Every mutation ends in one of the `finish_*` helpers. Outside a batch they
//! update bounds, submit to the render proxy and rebuild collision right away;
//! inside a batch they only record flags, and [`RuntimeMesh::end_batch`]
//! performs each kind of downstream work at most once.

use crate::collision::{
    CollisionManager, CollisionMesh, CollisionSection, ConvexHull, NullPhysics, PhysicsBackend,
};
use crate::config::MeshConfig;
use crate::error::MeshError;
use crate::geometry::{BoundingBox, VertexBuffer, VertexComponents};
use crate::mesh::{
    recompute_bounds, validate_indices, BatchState, Section, SectionStore, SectionUpdateFlags,
    UpdateFrequency, UpdateOptions,
};
use crate::proxy::{
    NullProxy, ProxyEvent, ProxySubmission, RenderProxy, SectionOperation, SubmissionKind,
};
use nalgebra::Point3;

/// Container of independently updatable mesh sections
pub struct RuntimeMesh<R = NullProxy, P = NullPhysics>
where
    P: PhysicsBackend,
{
    sections: SectionStore,
    collision: CollisionManager,
    batch: BatchState,
    local_bounds: BoundingBox,
    config: MeshConfig,
    proxy: R,
    physics: P,
    body: Option<P::Handle>,
}

impl RuntimeMesh {
    /// Mesh that is neither drawn nor simulated
    pub fn new() -> Self {
        Self::with_backends(NullProxy, NullPhysics)
    }
}

impl Default for RuntimeMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RenderProxy, P: PhysicsBackend> RuntimeMesh<R, P> {
    pub fn with_backends(proxy: R, physics: P) -> Self {
        Self::with_config(MeshConfig::default(), proxy, physics)
    }

    pub fn with_config(config: MeshConfig, proxy: R, physics: P) -> Self {
        Self {
            sections: SectionStore::new(),
            collision: CollisionManager::new(config.use_complex_as_simple_collision),
            batch: BatchState::new(),
            local_bounds: BoundingBox::zero(),
            config,
            proxy,
            physics,
            body: None,
        }
    }

    // ------------------------------------------------------------------
    // Section mutation
    // ------------------------------------------------------------------

    /// Create or fully replace the section at `index`.
    ///
    /// The slot list grows as needed. Flags reset to visible, shadow casting.
    pub fn create_section(
        &mut self,
        index: usize,
        vertices: VertexBuffer,
        indices: Vec<u32>,
        collision_enabled: bool,
        update_frequency: UpdateFrequency,
        options: UpdateOptions,
    ) -> Result<(), MeshError> {
        validate_indices(&indices, vertices.len())?;

        let mut section = Section::new(vertices, indices, options.bounding_box);
        section.collision_enabled = collision_enabled;
        section.update_frequency = update_frequency;

        log::trace!(
            "create section {}: {} vertices, {} triangles",
            index,
            section.vertex_count(),
            section.triangle_count()
        );

        let previous = self.sections.insert(index, section);
        let collision_changed =
            collision_enabled || previous.is_some_and(|s| s.collision_enabled);
        self.finish_create(index, collision_changed)
    }

    /// [`Self::create_section`] from parallel attribute arrays, using the
    /// configured default update frequency.
    pub fn create_section_from_components(
        &mut self,
        index: usize,
        components: VertexComponents,
        indices: Vec<u32>,
        collision_enabled: bool,
    ) -> Result<(), MeshError> {
        let vertices = VertexBuffer::from_components(components)?;
        let frequency = self.config.default_update_frequency;
        self.create_section(
            index,
            vertices,
            indices,
            collision_enabled,
            frequency,
            UpdateOptions::default(),
        )
    }

    /// Replace only the vertex buffer of an existing section.
    ///
    /// The vertex count may change; keeping the existing index buffer in
    /// range is up to the caller unless `validate_vertex_updates` is set.
    pub fn update_section_vertices(
        &mut self,
        index: usize,
        vertices: VertexBuffer,
        options: UpdateOptions,
    ) -> Result<(), MeshError> {
        let validate = self.config.validate_vertex_updates;
        let section = self.sections.require_mut(index)?;
        check_format(section, &vertices)?;
        if validate {
            validate_indices(section.indices(), vertices.len())?;
        }

        let bounds_changed = section.replace_vertices(vertices, options.bounding_box);
        let collision = section.collision_enabled;
        self.finish_update(index, SectionUpdateFlags::VERTICES, bounds_changed, collision)
    }

    /// Replace both buffers of an existing section.
    pub fn update_section(
        &mut self,
        index: usize,
        vertices: VertexBuffer,
        indices: Vec<u32>,
        options: UpdateOptions,
    ) -> Result<(), MeshError> {
        let section = self.sections.require_mut(index)?;
        check_format(section, &vertices)?;
        validate_indices(&indices, vertices.len())?;

        let bounds_changed = section.replace_vertices(vertices, options.bounding_box);
        section.replace_indices(indices);
        let collision = section.collision_enabled;
        self.finish_update(
            index,
            SectionUpdateFlags::VERTICES | SectionUpdateFlags::INDICES,
            bounds_changed,
            collision,
        )
    }

    /// Update from parallel attribute arrays; indices are kept when `None`.
    pub fn update_section_from_components(
        &mut self,
        index: usize,
        components: VertexComponents,
        indices: Option<Vec<u32>>,
    ) -> Result<(), MeshError> {
        let vertices = VertexBuffer::from_components(components)?;
        match indices {
            Some(indices) => self.update_section(index, vertices, indices, UpdateOptions::default()),
            None => self.update_section_vertices(index, vertices, UpdateOptions::default()),
        }
    }

    /// Remove the section at `index`. Other sections keep their indices.
    /// Clearing a missing section does nothing.
    pub fn clear_section(&mut self, index: usize) -> Result<(), MeshError> {
        let Some(removed) = self.sections.remove(index) else {
            return Ok(());
        };
        log::trace!("clear section {}", index);
        self.finish_destroy(&[index], removed.collision_enabled)
    }

    pub fn clear_all_sections(&mut self) -> Result<(), MeshError> {
        let had_collision = self.sections.iter().any(|(_, s)| s.collision_enabled);
        let removed = self.sections.clear();
        if removed.is_empty() {
            return Ok(());
        }
        self.finish_destroy(&removed, had_collision)
    }

    pub fn set_section_visible(&mut self, index: usize, visible: bool) -> Result<(), MeshError> {
        self.sections.require_mut(index)?.visible = visible;
        self.finish_visibility(index)
    }

    pub fn set_section_casts_shadow(
        &mut self,
        index: usize,
        casts_shadow: bool,
    ) -> Result<(), MeshError> {
        self.sections.require_mut(index)?.casts_shadow = casts_shadow;
        self.finish_visibility(index)
    }

    /// Toggle whether the section feeds complex collision. Only a real
    /// change triggers a rebuild.
    pub fn set_section_collision_enabled(
        &mut self,
        index: usize,
        enabled: bool,
    ) -> Result<(), MeshError> {
        let section = self.sections.require_mut(index)?;
        if section.collision_enabled == enabled {
            return Ok(());
        }
        section.collision_enabled = enabled;
        self.request_collision_update()
    }

    // ------------------------------------------------------------------
    // Section queries
    // ------------------------------------------------------------------

    /// Number of section slots, holes included.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section_exists(&self, index: usize) -> bool {
        self.sections.exists(index)
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn sections(&self) -> impl Iterator<Item = (usize, &Section)> {
        self.sections.iter()
    }

    pub fn section_bounds(&self, index: usize) -> Option<BoundingBox> {
        self.sections.get(index).map(Section::local_bounds)
    }

    /// Local-space bounds of the whole mesh
    pub fn bounds(&self) -> BoundingBox {
        self.local_bounds
    }

    /// False for missing sections.
    pub fn is_section_visible(&self, index: usize) -> bool {
        self.sections.get(index).is_some_and(|s| s.visible)
    }

    /// False for missing sections.
    pub fn is_section_casting_shadows(&self, index: usize) -> bool {
        self.sections.get(index).is_some_and(|s| s.casts_shadow)
    }

    /// False for missing sections.
    pub fn is_section_collision_enabled(&self, index: usize) -> bool {
        self.sections.get(index).is_some_and(|s| s.collision_enabled)
    }

    // ------------------------------------------------------------------
    // Collision-only geometry
    // ------------------------------------------------------------------

    pub fn set_collision_section(
        &mut self,
        index: usize,
        vertices: Vec<Point3<f32>>,
        indices: Vec<u32>,
    ) -> Result<(), MeshError> {
        self.collision.set_section(index, vertices, indices)?;
        self.request_collision_update()
    }

    pub fn clear_collision_section(&mut self, index: usize) -> Result<(), MeshError> {
        self.collision.clear_section(index);
        self.request_collision_update()
    }

    pub fn clear_all_collision_sections(&mut self) -> Result<(), MeshError> {
        self.collision.clear_all_sections();
        self.request_collision_update()
    }

    pub fn add_convex_hull(&mut self, points: Vec<Point3<f32>>) -> Result<(), MeshError> {
        self.collision.add_convex_hull(points);
        self.request_collision_update()
    }

    pub fn clear_convex_hulls(&mut self) -> Result<(), MeshError> {
        self.collision.clear_convex_hulls();
        self.request_collision_update()
    }

    /// Replace every convex hull in one go.
    pub fn set_convex_hulls(&mut self, hulls: Vec<Vec<Point3<f32>>>) -> Result<(), MeshError> {
        self.collision.set_convex_hulls(hulls);
        self.request_collision_update()
    }

    pub fn set_use_complex_as_simple_collision(&mut self, enabled: bool) -> Result<(), MeshError> {
        self.collision.set_use_complex_as_simple(enabled);
        self.request_collision_update()
    }

    pub fn use_complex_as_simple_collision(&self) -> bool {
        self.collision.use_complex_as_simple()
    }

    pub fn collision_section(&self, index: usize) -> Option<&CollisionSection> {
        self.collision.section(index)
    }

    pub fn collision_sections(&self) -> impl Iterator<Item = (usize, &CollisionSection)> {
        self.collision.sections()
    }

    pub fn convex_hulls(&self) -> &[ConvexHull] {
        self.collision.convex_hulls()
    }

    /// The combined complex mesh the next rebuild would cook.
    pub fn collision_mesh(&self) -> Option<CollisionMesh> {
        self.collision.build_complex_mesh(&self.sections)
    }

    /// Handle from the last successful cook
    pub fn collision_body(&self) -> Option<&P::Handle> {
        self.body.as_ref()
    }

    pub fn is_collision_dirty(&self) -> bool {
        self.collision.is_dirty()
    }

    /// Cook collision now if anything changed. Returns whether it cooked.
    pub fn rebuild_collision_if_dirty(&mut self) -> Result<bool, MeshError> {
        match self.collision.rebuild_if_dirty(&self.sections, &mut self.physics)? {
            Some(handle) => {
                self.body = Some(handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pre-physics step: cooks pending collision unless a batch is open.
    pub fn tick(&mut self) -> Result<bool, MeshError> {
        if self.batch.is_active() {
            return Ok(false);
        }
        self.rebuild_collision_if_dirty()
    }

    // ------------------------------------------------------------------
    // Batching
    // ------------------------------------------------------------------

    /// Defer downstream work until [`Self::end_batch`]. No-op when already open.
    pub fn begin_batch(&mut self) {
        if !self.batch.is_active() {
            log::trace!("begin batch");
        }
        self.batch.begin();
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_active()
    }

    /// Close the batch and apply its coalesced work: at most one bounds
    /// recompute, one proxy submission and one collision rebuild.
    ///
    /// The batch is closed even when a collaborator fails; the first failure
    /// is returned after all steps ran. No-op without an open batch.
    pub fn end_batch(&mut self) -> Result<(), MeshError> {
        if !self.batch.is_active() {
            return Ok(());
        }
        let pending = self.batch.finish();

        if pending.requires_bounds_update {
            self.update_local_bounds();
        }

        let events: Vec<ProxyEvent> = pending
            .pending()
            .flat_map(|(index, flags)| self.section_events(index, flags))
            .collect();

        log::debug!(
            "end batch: {} proxy events (recreate: {}), bounds: {}, collision: {}",
            events.len(),
            pending.requires_proxy_recreate,
            pending.requires_bounds_update,
            pending.requires_collision_update
        );

        let proxy_result = if events.is_empty() {
            Ok(())
        } else {
            let kind = if pending.requires_proxy_recreate || !self.proxy.supports_in_place_updates() {
                SubmissionKind::Recreate
            } else {
                SubmissionKind::InPlace
            };
            self.dispatch(ProxySubmission { kind, events })
        };

        let collision_result = if pending.requires_collision_update {
            self.update_collision()
        } else {
            Ok(())
        };

        proxy_result.and(collision_result)
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn proxy(&self) -> &R {
        &self.proxy
    }

    pub fn proxy_mut(&mut self) -> &mut R {
        &mut self.proxy
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn finish_create(&mut self, index: usize, collision_changed: bool) -> Result<(), MeshError> {
        if self.batch.is_active() {
            self.batch.mark_create(index);
            self.batch.requires_bounds_update = true;
            self.batch.requires_collision_update |= collision_changed;
            return Ok(());
        }

        self.update_local_bounds();
        let events = self.section_events(index, SectionUpdateFlags::CREATE);
        let proxy_result = self.submit(events);
        let collision_result = if collision_changed {
            self.update_collision()
        } else {
            Ok(())
        };
        proxy_result.and(collision_result)
    }

    fn finish_update(
        &mut self,
        index: usize,
        flags: SectionUpdateFlags,
        bounds_changed: bool,
        collision_enabled: bool,
    ) -> Result<(), MeshError> {
        if self.batch.is_active() {
            self.batch.mark_update(index, flags);
            self.batch.requires_bounds_update |= bounds_changed;
            self.batch.requires_collision_update |= collision_enabled;
            return Ok(());
        }

        if bounds_changed {
            self.update_local_bounds();
        }
        let events = self.section_events(index, flags);
        let proxy_result = self.submit(events);
        let collision_result = if collision_enabled {
            self.update_collision()
        } else {
            Ok(())
        };
        proxy_result.and(collision_result)
    }

    fn finish_destroy(&mut self, indices: &[usize], had_collision: bool) -> Result<(), MeshError> {
        if self.batch.is_active() {
            for &index in indices {
                self.batch.mark_destroy(index);
            }
            self.batch.requires_bounds_update = true;
            self.batch.requires_collision_update |= had_collision;
            return Ok(());
        }

        self.update_local_bounds();
        let events = indices
            .iter()
            .map(|&index| ProxyEvent::new(index, SectionOperation::Destroy))
            .collect();
        let proxy_result = self.submit(events);
        let collision_result = if had_collision {
            self.update_collision()
        } else {
            Ok(())
        };
        proxy_result.and(collision_result)
    }

    fn finish_visibility(&mut self, index: usize) -> Result<(), MeshError> {
        if self.batch.is_active() {
            self.batch.mark_update(index, SectionUpdateFlags::VISIBILITY);
            return Ok(());
        }
        let events = self.section_events(index, SectionUpdateFlags::VISIBILITY);
        self.submit(events)
    }

    fn request_collision_update(&mut self) -> Result<(), MeshError> {
        self.collision.mark_dirty();
        if self.batch.is_active() {
            self.batch.requires_collision_update = true;
            return Ok(());
        }
        self.update_collision()
    }

    fn update_collision(&mut self) -> Result<(), MeshError> {
        self.collision.mark_dirty();
        if self.config.bake_collision_on_tick {
            return Ok(());
        }
        self.rebuild_collision_if_dirty().map(|_| ())
    }

    fn update_local_bounds(&mut self) {
        self.local_bounds = recompute_bounds(self.sections.iter().map(|(_, s)| s));
    }

    /// Proxy events describing the current state of one section for the
    /// given pending flags.
    fn section_events(&self, index: usize, flags: SectionUpdateFlags) -> Vec<ProxyEvent> {
        let Some(section) = self.sections.get(index) else {
            if flags.contains(SectionUpdateFlags::DESTROY) {
                return vec![ProxyEvent::new(index, SectionOperation::Destroy)];
            }
            log::warn!("dropping {:?} for missing section {}", flags, index);
            return Vec::new();
        };

        if flags.contains(SectionUpdateFlags::CREATE) {
            return vec![ProxyEvent::new(index, SectionOperation::Create(section.into()))];
        }

        let mut events = Vec::new();
        if flags.contains(SectionUpdateFlags::VERTICES) {
            events.push(ProxyEvent::new(
                index,
                SectionOperation::UpdateVertices {
                    vertices: section.shared_vertices(),
                    bounds: section.local_bounds(),
                },
            ));
        }
        if flags.contains(SectionUpdateFlags::INDICES) {
            events.push(ProxyEvent::new(
                index,
                SectionOperation::UpdateIndices(section.shared_indices()),
            ));
        }
        if flags.contains(SectionUpdateFlags::VISIBILITY) {
            events.push(ProxyEvent::new(
                index,
                SectionOperation::UpdateVisibility {
                    visible: section.visible,
                    casts_shadow: section.casts_shadow,
                },
            ));
        }
        events
    }

    fn submit(&mut self, events: Vec<ProxyEvent>) -> Result<(), MeshError> {
        if events.is_empty() {
            return Ok(());
        }
        let submission = ProxySubmission::new(events, self.proxy.supports_in_place_updates());
        self.dispatch(submission)
    }

    fn dispatch(&mut self, submission: ProxySubmission) -> Result<(), MeshError> {
        self.proxy.submit(submission).map_err(|err| {
            log::warn!("render proxy rejected submission: {err:#}");
            MeshError::ProxySubmission(format!("{err:#}"))
        })
    }
}

fn check_format(section: &Section, vertices: &VertexBuffer) -> Result<(), MeshError> {
    if section.format() != vertices.format() {
        return Err(MeshError::VertexFormatMismatch {
            expected: section.format(),
            actual: vertices.format(),
        });
    }
    Ok(())
}
