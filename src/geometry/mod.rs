// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - bounding volumes and vertex layouts

mod bbox;
mod vertex;

pub use bbox::BoundingBox;
pub use vertex::{
    AttributeKind, Color, Tangent, VertexAttribute, VertexBuffer, VertexComponents,
    VertexDualUv, VertexFormat, VertexSimple,
};
