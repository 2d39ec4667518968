// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for section and collision operations

use crate::geometry::VertexFormat;
use thiserror::Error;

/// Errors reported by the runtime mesh core.
///
/// Precondition violations are detected before anything is mutated, so the
/// section store is unchanged when one of them is returned. Collaborator
/// failures (`ProxySubmission`, `CollisionCook`) are reported after the store
/// has already been committed.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh section {0} does not exist")]
    SectionNotFound(usize),

    #[error("index buffer length {len} is not a multiple of 3")]
    InvalidIndexCount { len: usize },

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{attribute} has {actual} entries but there are {expected} positions")]
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("section uses {expected:?} vertices, update supplied {actual:?}")]
    VertexFormatMismatch {
        expected: VertexFormat,
        actual: VertexFormat,
    },

    #[error("render proxy rejected submission: {0}")]
    ProxySubmission(String),

    #[error("collision cooking failed: {0}")]
    CollisionCook(String),

    #[error("archive version {0} is newer than this build supports")]
    UnsupportedArchiveVersion(u32),

    #[error("malformed archive: {0}")]
    Archive(#[from] serde_json::Error),
}
