// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Render proxy events

use crate::geometry::{BoundingBox, VertexBuffer};
use crate::mesh::{Section, UpdateFrequency};
use std::sync::Arc;

/// Read-only snapshot of a section as handed to the renderer.
///
/// Buffers are shared with the section store; the store replaces rather than
/// mutates them, so a snapshot never changes after submission.
#[derive(Debug, Clone)]
pub struct SectionRenderData {
    pub vertices: Arc<VertexBuffer>,
    pub indices: Arc<[u32]>,
    pub bounds: BoundingBox,
    pub visible: bool,
    pub casts_shadow: bool,
    pub update_frequency: UpdateFrequency,
}

impl From<&Section> for SectionRenderData {
    fn from(section: &Section) -> Self {
        Self {
            vertices: section.shared_vertices(),
            indices: section.shared_indices(),
            bounds: section.local_bounds(),
            visible: section.visible,
            casts_shadow: section.casts_shadow,
            update_frequency: section.update_frequency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Destroy,
    UpdateVertices,
    UpdateIndices,
    UpdateVisibility,
}

#[derive(Debug, Clone)]
pub enum SectionOperation {
    Create(SectionRenderData),
    Destroy,
    UpdateVertices {
        vertices: Arc<VertexBuffer>,
        bounds: BoundingBox,
    },
    UpdateIndices(Arc<[u32]>),
    UpdateVisibility {
        visible: bool,
        casts_shadow: bool,
    },
}

impl SectionOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create(_) => OperationKind::Create,
            Self::Destroy => OperationKind::Destroy,
            Self::UpdateVertices { .. } => OperationKind::UpdateVertices,
            Self::UpdateIndices(_) => OperationKind::UpdateIndices,
            Self::UpdateVisibility { .. } => OperationKind::UpdateVisibility,
        }
    }

    /// Create, destroy and index changes alter the proxy's draw setup.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind(),
            OperationKind::Create | OperationKind::Destroy | OperationKind::UpdateIndices
        )
    }
}

#[derive(Debug, Clone)]
pub struct ProxyEvent {
    pub section_index: usize,
    pub operation: SectionOperation,
}

impl ProxyEvent {
    pub fn new(section_index: usize, operation: SectionOperation) -> Self {
        Self {
            section_index,
            operation,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}

/// How the proxy should apply a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    /// Rebuild the render state after applying the events.
    Recreate,
    /// Patch existing render resources in place.
    InPlace,
}

/// Everything the renderer receives in one hand-off
#[derive(Debug, Clone)]
pub struct ProxySubmission {
    pub kind: SubmissionKind,
    pub events: Vec<ProxyEvent>,
}

impl ProxySubmission {
    /// Picks [`SubmissionKind::Recreate`] when any event is structural or the
    /// proxy cannot patch in place.
    pub fn new(events: Vec<ProxyEvent>, supports_in_place: bool) -> Self {
        let structural = events.iter().any(|e| e.operation.is_structural());
        let kind = if structural || !supports_in_place {
            SubmissionKind::Recreate
        } else {
            SubmissionKind::InPlace
        };
        Self { kind, events }
    }

    pub fn count(&self, kind: OperationKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}
