// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Versioned mesh archives
//!
//! Archives are JSON documents with an integer `version` field. Documents
//! without one predate versioning and are read as [`MeshArchive::INITIAL`].
//! Reading always yields the latest in-memory layout; writing always emits
//! [`MeshArchive::LATEST`].

use crate::collision::{CollisionSection, ConvexHull, PhysicsBackend};
use crate::error::MeshError;
use crate::geometry::{BoundingBox, Color, Tangent, VertexBuffer, VertexComponents};
use crate::mesh::{validate_indices, UpdateFrequency, UpdateOptions};
use crate::proxy::RenderProxy;
use crate::runtime_mesh::RuntimeMesh;
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Saved state of a [`RuntimeMesh`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshArchive {
    pub version: u32,
    pub sections: Vec<SectionRecord>,
    #[serde(default)]
    pub collision_sections: Vec<CollisionSectionRecord>,
    #[serde(default)]
    pub convex_hulls: Vec<ConvexHull>,
    #[serde(default = "default_true")]
    pub use_complex_as_simple_collision: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub index: usize,
    pub vertices: VertexBuffer,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
    pub collision_enabled: bool,
    pub update_frequency: UpdateFrequency,
    pub visible: bool,
    pub casts_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionSectionRecord {
    pub index: usize,
    #[serde(flatten)]
    pub section: CollisionSection,
}

// Version 0 stored every section as parallel attribute arrays with a single
// UV channel and only the visibility and collision flags.
#[derive(Debug, Deserialize)]
struct LegacyArchive {
    #[serde(default)]
    sections: Vec<LegacySection>,
    #[serde(default)]
    collision_sections: Vec<CollisionSectionRecord>,
    #[serde(default)]
    convex_hulls: Vec<ConvexHull>,
}

#[derive(Debug, Deserialize)]
struct LegacySection {
    index: usize,
    positions: Vec<Point3<f32>>,
    #[serde(default)]
    normals: Vec<Vector3<f32>>,
    #[serde(default)]
    tangents: Vec<Tangent>,
    #[serde(default)]
    uv0: Vec<Vector2<f32>>,
    #[serde(default)]
    colors: Vec<Color>,
    indices: Vec<u32>,
    #[serde(default)]
    collision_enabled: bool,
    #[serde(default = "default_true")]
    visible: bool,
}

fn default_true() -> bool {
    true
}

impl LegacyArchive {
    fn migrate(self) -> Result<MeshArchive, MeshError> {
        let sections = self
            .sections
            .into_iter()
            .map(|legacy| {
                let vertices = VertexBuffer::from_components(VertexComponents {
                    positions: legacy.positions,
                    normals: legacy.normals,
                    tangents: legacy.tangents,
                    uv0: legacy.uv0,
                    uv1: Vec::new(),
                    colors: legacy.colors,
                })?;
                Ok(SectionRecord {
                    index: legacy.index,
                    bounds: vertices.bounding_box(),
                    vertices,
                    indices: legacy.indices,
                    collision_enabled: legacy.collision_enabled,
                    update_frequency: UpdateFrequency::default(),
                    visible: legacy.visible,
                    casts_shadow: true,
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        Ok(MeshArchive {
            version: MeshArchive::LATEST,
            sections,
            collision_sections: self.collision_sections,
            convex_hulls: self.convex_hulls,
            use_complex_as_simple_collision: true,
        })
    }
}

impl MeshArchive {
    /// Struct-of-arrays sections, no per-section shadow flag or bounds
    pub const INITIAL: u32 = 0;
    /// Tagged vertex buffers and the full flag set
    pub const TEMPLATED_VERTEX_FIX: u32 = 1;
    pub const LATEST: u32 = Self::TEMPLATED_VERTEX_FIX;

    /// Snapshot the sections and collision state of a mesh.
    pub fn capture<R: RenderProxy, P: PhysicsBackend>(mesh: &RuntimeMesh<R, P>) -> Self {
        let sections = mesh
            .sections()
            .map(|(index, section)| SectionRecord {
                index,
                vertices: section.vertices().clone(),
                indices: section.indices().to_vec(),
                bounds: section.local_bounds(),
                collision_enabled: section.collision_enabled,
                update_frequency: section.update_frequency,
                visible: section.visible,
                casts_shadow: section.casts_shadow,
            })
            .collect();

        let collision_sections = mesh
            .collision_sections()
            .map(|(index, section)| CollisionSectionRecord {
                index,
                section: section.clone(),
            })
            .collect();

        Self {
            version: Self::LATEST,
            sections,
            collision_sections,
            convex_hulls: mesh.convex_hulls().to_vec(),
            use_complex_as_simple_collision: mesh.use_complex_as_simple_collision(),
        }
    }

    /// Check every index buffer against its vertices.
    pub fn validate(&self) -> Result<(), MeshError> {
        for record in &self.sections {
            validate_indices(&record.indices, record.vertices.len())?;
        }
        for record in &self.collision_sections {
            validate_indices(&record.section.indices, record.section.vertices.len())?;
        }
        Ok(())
    }

    /// Replace the contents of `mesh` with this archive, as one batch.
    ///
    /// The archive is validated first; an invalid archive leaves `mesh`
    /// untouched.
    pub fn restore<R: RenderProxy, P: PhysicsBackend>(
        &self,
        mesh: &mut RuntimeMesh<R, P>,
    ) -> Result<(), MeshError> {
        self.validate()?;
        mesh.begin_batch();
        let applied = self.apply(mesh);
        let finished = mesh.end_batch();
        applied.and(finished)
    }

    fn apply<R: RenderProxy, P: PhysicsBackend>(
        &self,
        mesh: &mut RuntimeMesh<R, P>,
    ) -> Result<(), MeshError> {
        mesh.clear_all_sections()?;
        mesh.clear_all_collision_sections()?;

        for record in &self.sections {
            mesh.create_section(
                record.index,
                record.vertices.clone(),
                record.indices.clone(),
                record.collision_enabled,
                record.update_frequency,
                UpdateOptions::with_bounds(record.bounds),
            )?;
            if !record.visible {
                mesh.set_section_visible(record.index, false)?;
            }
            if !record.casts_shadow {
                mesh.set_section_casts_shadow(record.index, false)?;
            }
        }

        for record in &self.collision_sections {
            mesh.set_collision_section(
                record.index,
                record.section.vertices.clone(),
                record.section.indices.clone(),
            )?;
        }

        mesh.set_convex_hulls(self.convex_hulls.iter().map(|h| h.points.clone()).collect())?;
        mesh.set_use_complex_as_simple_collision(self.use_complex_as_simple_collision)
    }

    pub fn to_json(&self) -> Result<String, MeshError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse any supported version, migrating to [`Self::LATEST`].
    pub fn from_json(json: &str) -> Result<Self, MeshError> {
        Self::from_json_with_version(json).map(|(archive, _)| archive)
    }

    /// Like [`Self::from_json`], also returning the version found in the
    /// document before migration.
    pub fn from_json_with_version(json: &str) -> Result<(Self, u32), MeshError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let version = match value.get("version") {
            Some(version) => serde_json::from_value::<u32>(version.clone())?,
            None => Self::INITIAL,
        };

        let archive: MeshArchive = match version {
            Self::INITIAL => {
                log::debug!("migrating archive from version {}", version);
                serde_json::from_value::<LegacyArchive>(value)?.migrate()?
            }
            Self::TEMPLATED_VERTEX_FIX => serde_json::from_value(value)?,
            other => return Err(MeshError::UnsupportedArchiveVersion(other)),
        };
        Ok((archive, version))
    }

    /// Save archive to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json().context("Failed to serialize mesh archive")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write archive: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Load archive from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_version(path).map(|(archive, _)| archive)
    }

    /// Load archive from file, also returning its on-disk version
    pub fn load_with_version(path: impl AsRef<Path>) -> Result<(Self, u32)> {
        let json = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read archive: {:?}", path.as_ref()))?;
        let loaded = Self::from_json_with_version(&json)
            .with_context(|| format!("Failed to parse archive: {:?}", path.as_ref()))?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"{
        "sections": [
            {
                "index": 1,
                "positions": [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
                "uv0": [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
                "indices": [0, 1, 2],
                "collision_enabled": true
            }
        ],
        "convex_hulls": [{ "points": [[0.0, 0.0, 0.0]] }]
    }"#;

    #[test]
    fn test_unversioned_document_is_migrated() {
        let archive = MeshArchive::from_json(LEGACY).unwrap();
        assert_eq!(archive.version, MeshArchive::LATEST);
        assert!(archive.use_complex_as_simple_collision);

        let section = &archive.sections[0];
        assert_eq!(section.index, 1);
        assert!(section.visible);
        assert!(section.casts_shadow);
        assert!(section.collision_enabled);
        assert_eq!(section.update_frequency, UpdateFrequency::Average);
        assert_eq!(section.bounds.max, Point3::new(2.0, 2.0, 0.0));
        assert_eq!(section.vertices.len(), 3);
        assert_eq!(archive.convex_hulls.len(), 1);
    }

    #[test]
    fn test_legacy_attribute_mismatch() {
        let json = r#"{
            "version": 0,
            "sections": [{ "index": 0, "positions": [[0.0, 0.0, 0.0]], "uv0": [], "normals": [[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]], "indices": [] }]
        }"#;
        assert!(matches!(
            MeshArchive::from_json(json),
            Err(MeshError::AttributeLengthMismatch { attribute: "normals", .. })
        ));
    }

    #[test]
    fn test_source_version_is_reported() {
        let (archive, version) = MeshArchive::from_json_with_version(LEGACY).unwrap();
        assert_eq!(version, MeshArchive::INITIAL);
        assert_eq!(archive.version, MeshArchive::LATEST);

        let (_, version) = MeshArchive::from_json_with_version(&archive.to_json().unwrap()).unwrap();
        assert_eq!(version, MeshArchive::TEMPLATED_VERTEX_FIX);
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{ "version": 7, "sections": [] }"#;
        assert!(matches!(
            MeshArchive::from_json(json),
            Err(MeshError::UnsupportedArchiveVersion(7))
        ));
    }

    #[test]
    fn test_malformed_version() {
        let json = r#"{ "version": "one", "sections": [] }"#;
        assert!(matches!(MeshArchive::from_json(json), Err(MeshError::Archive(_))));
    }
}
