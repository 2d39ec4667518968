// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex formats and vertex buffers
//!
//! A section stores its vertices in one of a closed set of layouts. Each
//! layout has a static attribute descriptor describing how it packs into a
//! GPU vertex stream, so code that only needs positions (bounds, collision)
//! or raw bytes (upload) never has to match on the concrete vertex type.

use super::BoundingBox;
use crate::error::MeshError;
use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA vertex color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Tangent direction plus the sign of the binormal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tangent {
    pub direction: Vector3<f32>,
    pub flip_binormal: bool,
}

impl Tangent {
    pub fn new(direction: Vector3<f32>, flip_binormal: bool) -> Self {
        Self {
            direction,
            flip_binormal,
        }
    }

    /// Packed as `(x, y, z, w)` where `w` is the binormal sign.
    pub fn to_array(&self) -> [f32; 4] {
        let w = if self.flip_binormal { -1.0 } else { 1.0 };
        [self.direction.x, self.direction.y, self.direction.z, w]
    }
}

impl Default for Tangent {
    fn default() -> Self {
        Self::new(Vector3::x(), false)
    }
}

/// Position, normal, tangent, color and one UV channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexSimple {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Tangent,
    pub color: Color,
    pub uv0: Vector2<f32>,
}

impl VertexSimple {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv0: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            tangent: Tangent::default(),
            color: Color::WHITE,
            uv0,
        }
    }
}

/// [`VertexSimple`] with a second UV channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexDualUv {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Tangent,
    pub color: Color,
    pub uv0: Vector2<f32>,
    pub uv1: Vector2<f32>,
}

/// Semantic of one packed vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// `float3`
    Position,
    /// `float3`
    Normal,
    /// `float4`, `w` = binormal sign
    Tangent,
    /// `unorm8x4`
    Color,
    /// `float2`
    TexCoord0,
    /// `float2`
    TexCoord1,
}

impl AttributeKind {
    /// Packed size in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Self::Position | Self::Normal => 12,
            Self::Tangent => 16,
            Self::Color => 4,
            Self::TexCoord0 | Self::TexCoord1 => 8,
        }
    }
}

/// One attribute inside a packed vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    pub offset: usize,
}

const fn attr(kind: AttributeKind, offset: usize) -> VertexAttribute {
    VertexAttribute { kind, offset }
}

const POSITION_ONLY_LAYOUT: &[VertexAttribute] = &[attr(AttributeKind::Position, 0)];

const SIMPLE_LAYOUT: &[VertexAttribute] = &[
    attr(AttributeKind::Position, 0),
    attr(AttributeKind::Normal, 12),
    attr(AttributeKind::Tangent, 24),
    attr(AttributeKind::Color, 40),
    attr(AttributeKind::TexCoord0, 44),
];

const DUAL_UV_LAYOUT: &[VertexAttribute] = &[
    attr(AttributeKind::Position, 0),
    attr(AttributeKind::Normal, 12),
    attr(AttributeKind::Tangent, 24),
    attr(AttributeKind::Color, 40),
    attr(AttributeKind::TexCoord0, 44),
    attr(AttributeKind::TexCoord1, 52),
];

/// Supported vertex layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    PositionOnly,
    Simple,
    DualUv,
}

impl VertexFormat {
    /// Packed attribute layout, ordered by offset.
    pub fn attributes(&self) -> &'static [VertexAttribute] {
        match self {
            Self::PositionOnly => POSITION_ONLY_LAYOUT,
            Self::Simple => SIMPLE_LAYOUT,
            Self::DualUv => DUAL_UV_LAYOUT,
        }
    }

    /// Packed vertex size in bytes
    pub fn stride(&self) -> usize {
        self.attributes()
            .last()
            .map(|a| a.offset + a.kind.size())
            .unwrap_or(0)
    }

    pub fn has_attribute(&self, kind: AttributeKind) -> bool {
        self.attributes().iter().any(|a| a.kind == kind)
    }
}

/// Vertex data of one section, tagged by layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "vertices")]
pub enum VertexBuffer {
    PositionOnly(Vec<Point3<f32>>),
    Simple(Vec<VertexSimple>),
    DualUv(Vec<VertexDualUv>),
}

impl VertexBuffer {
    pub fn format(&self) -> VertexFormat {
        match self {
            Self::PositionOnly(_) => VertexFormat::PositionOnly,
            Self::Simple(_) => VertexFormat::Simple,
            Self::DualUv(_) => VertexFormat::DualUv,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::PositionOnly(v) => v.len(),
            Self::Simple(v) => v.len(),
            Self::DualUv(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self, index: usize) -> Option<Point3<f32>> {
        match self {
            Self::PositionOnly(v) => v.get(index).copied(),
            Self::Simple(v) => v.get(index).map(|v| v.position),
            Self::DualUv(v) => v.get(index).map(|v| v.position),
        }
    }

    pub fn positions(&self) -> Vec<Point3<f32>> {
        match self {
            Self::PositionOnly(v) => v.clone(),
            Self::Simple(v) => v.iter().map(|v| v.position).collect(),
            Self::DualUv(v) => v.iter().map(|v| v.position).collect(),
        }
    }

    /// Bounds of every vertex, referenced by the index buffer or not.
    /// An empty buffer yields [`BoundingBox::zero`].
    pub fn bounding_box(&self) -> BoundingBox {
        let bounds = match self {
            Self::PositionOnly(v) => BoundingBox::from_points(v.iter()),
            Self::Simple(v) => BoundingBox::from_points(v.iter().map(|v| &v.position)),
            Self::DualUv(v) => BoundingBox::from_points(v.iter().map(|v| &v.position)),
        };
        if bounds.is_empty() {
            BoundingBox::zero()
        } else {
            bounds
        }
    }

    /// Bytes needed by [`Self::encode_packed`].
    pub fn packed_size(&self) -> usize {
        self.format().stride() * self.len()
    }

    /// Encode into the little-endian interleaved layout of [`VertexFormat::attributes`].
    pub fn encode_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.packed_size());
        match self {
            Self::PositionOnly(v) => {
                for p in v {
                    put_floats(&mut out, &[p.x, p.y, p.z]);
                }
            }
            Self::Simple(v) => {
                for v in v {
                    put_common(&mut out, &v.position, &v.normal, &v.tangent, &v.color);
                    put_floats(&mut out, &[v.uv0.x, v.uv0.y]);
                }
            }
            Self::DualUv(v) => {
                for v in v {
                    put_common(&mut out, &v.position, &v.normal, &v.tangent, &v.color);
                    put_floats(&mut out, &[v.uv0.x, v.uv0.y, v.uv1.x, v.uv1.y]);
                }
            }
        }
        out
    }

    /// Build a buffer from parallel attribute arrays.
    ///
    /// Every non-empty attribute array must be as long as `positions`.
    /// A non-empty `uv1` selects [`VertexFormat::DualUv`], otherwise
    /// [`VertexFormat::Simple`]. Missing attributes take their defaults
    /// (normal +Z, tangent +X, zero UVs, white).
    pub fn from_components(components: VertexComponents) -> Result<Self, MeshError> {
        let count = components.positions.len();
        check_len("normals", count, components.normals.len())?;
        check_len("tangents", count, components.tangents.len())?;
        check_len("uv0", count, components.uv0.len())?;
        check_len("uv1", count, components.uv1.len())?;
        check_len("colors", count, components.colors.len())?;

        let normal = |i: usize| components.normals.get(i).copied().unwrap_or_else(Vector3::z);
        let tangent = |i: usize| components.tangents.get(i).copied().unwrap_or_default();
        let color = |i: usize| components.colors.get(i).copied().unwrap_or_default();
        let uv0 = |i: usize| components.uv0.get(i).copied().unwrap_or_else(Vector2::zeros);

        if components.uv1.is_empty() {
            let vertices = components
                .positions
                .iter()
                .enumerate()
                .map(|(i, &position)| VertexSimple {
                    position,
                    normal: normal(i),
                    tangent: tangent(i),
                    color: color(i),
                    uv0: uv0(i),
                })
                .collect();
            Ok(Self::Simple(vertices))
        } else {
            let vertices = components
                .positions
                .iter()
                .enumerate()
                .map(|(i, &position)| VertexDualUv {
                    position,
                    normal: normal(i),
                    tangent: tangent(i),
                    color: color(i),
                    uv0: uv0(i),
                    uv1: components.uv1[i],
                })
                .collect();
            Ok(Self::DualUv(vertices))
        }
    }
}

/// Struct-of-arrays vertex input for [`VertexBuffer::from_components`]
#[derive(Debug, Clone, Default)]
pub struct VertexComponents {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub tangents: Vec<Tangent>,
    pub uv0: Vec<Vector2<f32>>,
    pub uv1: Vec<Vector2<f32>>,
    pub colors: Vec<Color>,
}

impl VertexComponents {
    pub fn from_positions(positions: Vec<Point3<f32>>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }
}

fn check_len(attribute: &'static str, expected: usize, actual: usize) -> Result<(), MeshError> {
    if actual != 0 && actual != expected {
        return Err(MeshError::AttributeLengthMismatch {
            attribute,
            expected,
            actual,
        });
    }
    Ok(())
}

fn put_floats(out: &mut Vec<u8>, values: &[f32]) {
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

fn put_common(
    out: &mut Vec<u8>,
    position: &Point3<f32>,
    normal: &Vector3<f32>,
    tangent: &Tangent,
    color: &Color,
) {
    put_floats(out, &[position.x, position.y, position.z]);
    put_floats(out, &[normal.x, normal.y, normal.z]);
    put_floats(out, &tangent.to_array());
    out.extend_from_slice(&[color.r, color.g, color.b, color.a]);
}
