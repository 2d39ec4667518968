// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Archive save/load across format versions

use anyhow::Result;
use nalgebra::{Point3, Vector2, Vector3};
use runtime_mesh::geometry::VertexSimple;
use runtime_mesh::proxy::{OperationKind, RecordingProxy};
use runtime_mesh::{
    BoundingBox, MeshArchive, MeshError, RuntimeMesh, UpdateFrequency, UpdateOptions, VertexBuffer,
    VertexComponents, VertexFormat,
};
use tempfile::NamedTempFile;

fn populated_mesh() -> RuntimeMesh<RecordingProxy> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mesh = RuntimeMesh::with_backends(RecordingProxy::new(), runtime_mesh::NullPhysics);

    let simple = VertexBuffer::Simple(vec![
        VertexSimple::new(Point3::new(0.0, 0.0, 0.0), Vector3::z(), Vector2::new(0.0, 0.0)),
        VertexSimple::new(Point3::new(1.0, 0.0, 0.0), Vector3::z(), Vector2::new(1.0, 0.0)),
        VertexSimple::new(Point3::new(0.0, 1.0, 0.0), Vector3::z(), Vector2::new(0.0, 1.0)),
    ]);
    mesh.create_section(0, simple, vec![0, 1, 2], true, UpdateFrequency::Frequent, UpdateOptions::default())
        .unwrap();

    let mut components = VertexComponents::from_positions(vec![
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(3.0, 1.0, 1.0),
    ]);
    components.uv1 = vec![Vector2::new(0.5, 0.5); 3];
    mesh.create_section_from_components(3, components, vec![0, 1, 2], false)
        .unwrap();
    mesh.set_section_casts_shadow(3, false).unwrap();
    mesh.set_section_visible(3, false).unwrap();

    mesh.set_collision_section(1, vec![Point3::origin(); 3], vec![0, 1, 2])
        .unwrap();
    mesh.add_convex_hull(vec![Point3::origin(), Point3::new(1.0, 1.0, 1.0)])
        .unwrap();
    mesh.set_use_complex_as_simple_collision(false).unwrap();
    mesh
}

#[test]
fn test_latest_roundtrip_through_file() -> Result<()> {
    let original = populated_mesh();
    let archive = MeshArchive::capture(&original);

    let file = NamedTempFile::with_suffix(".json")?;
    archive.save(file.path())?;
    let loaded = MeshArchive::load(file.path())?;
    assert_eq!(loaded, archive);

    let mut restored = RuntimeMesh::with_backends(RecordingProxy::new(), runtime_mesh::NullPhysics);
    loaded.restore(&mut restored)?;

    assert_eq!(restored.section_count(), original.section_count());
    for (index, section) in original.sections() {
        let copy = restored.section(index).unwrap();
        assert_eq!(copy.vertices(), section.vertices());
        assert_eq!(copy.indices(), section.indices());
        assert_eq!(copy.local_bounds(), section.local_bounds());
        assert_eq!(copy.update_frequency, section.update_frequency);
        assert_eq!(copy.visible, section.visible);
        assert_eq!(copy.casts_shadow, section.casts_shadow);
        assert_eq!(copy.collision_enabled, section.collision_enabled);
    }
    assert!(!restored.section_exists(1));
    assert_eq!(restored.section(3).unwrap().format(), VertexFormat::DualUv);
    assert_eq!(restored.bounds(), original.bounds());
    assert_eq!(restored.collision_sections().count(), 1);
    assert_eq!(restored.convex_hulls(), original.convex_hulls());
    assert!(!restored.use_complex_as_simple_collision());

    // the restore was applied as a single batch
    assert_eq!(restored.proxy().submissions().len(), 1);
    assert_eq!(restored.proxy().count(OperationKind::Create), 2);
    Ok(())
}

#[test]
fn test_restore_replaces_existing_sections() -> Result<()> {
    let archive = MeshArchive::capture(&populated_mesh());
    let mut target = populated_mesh();
    target
        .create_section(
            7,
            VertexBuffer::PositionOnly(vec![Point3::origin(); 3]),
            vec![0, 1, 2],
            false,
            UpdateFrequency::Average,
            UpdateOptions::default(),
        )?;
    target.proxy_mut().clear();

    archive.restore(&mut target)?;
    assert!(!target.section_exists(7));
    assert_eq!(target.section_count(), 4);
    assert_eq!(target.proxy().count(OperationKind::Destroy), 1);
    Ok(())
}

#[test]
fn test_initial_version_restores_with_defaults() -> Result<()> {
    let legacy = r#"{
        "version": 0,
        "sections": [
            {
                "index": 0,
                "positions": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
                "normals": [[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
                "indices": [0, 1, 2, 0, 2, 3],
                "collision_enabled": true,
                "visible": false
            }
        ],
        "collision_sections": [
            { "index": 2, "vertices": [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]], "indices": [0, 1, 2] }
        ]
    }"#;

    let archive = MeshArchive::from_json(legacy)?;
    assert_eq!(archive.version, MeshArchive::LATEST);

    let mut mesh = RuntimeMesh::new();
    archive.restore(&mut mesh)?;

    let section = mesh.section(0).unwrap();
    assert_eq!(section.format(), VertexFormat::Simple);
    assert_eq!(section.triangle_count(), 2);
    assert!(!section.visible);
    assert!(section.casts_shadow);
    assert!(section.collision_enabled);
    assert_eq!(section.update_frequency, UpdateFrequency::Average);
    assert_eq!(
        mesh.bounds(),
        BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0))
    );
    assert!(mesh.use_complex_as_simple_collision());
    assert!(mesh.collision_section(2).is_some());

    // migrated data re-saves at the latest version and reads back unchanged
    let resaved = MeshArchive::from_json(&MeshArchive::capture(&mesh).to_json()?)?;
    assert_eq!(resaved, archive);
    Ok(())
}

#[test]
fn test_empty_section_roundtrip() -> Result<()> {
    let mut mesh = RuntimeMesh::new();
    mesh.create_section(
        0,
        VertexBuffer::PositionOnly(Vec::new()),
        Vec::new(),
        false,
        UpdateFrequency::Average,
        UpdateOptions::default(),
    )?;
    assert_eq!(mesh.section_bounds(0), Some(BoundingBox::zero()));
    assert_eq!(mesh.bounds(), BoundingBox::zero());

    let archive = MeshArchive::capture(&mesh);
    let json = archive.to_json()?;
    assert!(!json.contains("null"));

    let loaded = MeshArchive::from_json(&json)?;
    assert_eq!(loaded, archive);

    let mut restored = RuntimeMesh::new();
    loaded.restore(&mut restored)?;
    assert!(restored.section_exists(0));
    assert_eq!(restored.section(0).unwrap().vertex_count(), 0);
    assert_eq!(restored.bounds(), BoundingBox::zero());
    Ok(())
}

#[test]
fn test_invalid_archive_leaves_mesh_untouched() {
    let mut mesh = populated_mesh();
    let mut archive = MeshArchive::capture(&mesh);
    archive.sections[0].indices = vec![0, 1, 9];
    mesh.proxy_mut().clear();

    let result = archive.restore(&mut mesh);
    assert!(matches!(
        result,
        Err(MeshError::IndexOutOfRange { position: 2, index: 9, vertex_count: 3 })
    ));
    assert!(mesh.section_exists(0));
    assert!(mesh.section_exists(3));
    assert_eq!(mesh.section(0).unwrap().indices(), &[0, 1, 2]);
    assert_eq!(mesh.collision_sections().count(), 1);
    assert!(!mesh.is_batching());
    assert!(mesh.proxy().submissions().is_empty());

    let mut archive = MeshArchive::capture(&mesh);
    archive.collision_sections[0].section.indices = vec![0, 1];
    assert!(matches!(
        archive.restore(&mut mesh),
        Err(MeshError::InvalidIndexCount { len: 2 })
    ));
    assert_eq!(mesh.collision_section(1).unwrap().indices, vec![0, 1, 2]);
}

#[test]
fn test_load_reports_source_version() -> Result<()> {
    let file = NamedTempFile::with_suffix(".json")?;
    std::fs::write(
        file.path(),
        r#"{ "sections": [{ "index": 0, "positions": [[1.0, 2.0, 3.0]], "indices": [] }] }"#,
    )?;

    let (archive, version) = MeshArchive::load_with_version(file.path())?;
    assert_eq!(version, MeshArchive::INITIAL);
    assert_eq!(archive.version, MeshArchive::LATEST);

    archive.save(file.path())?;
    let (_, version) = MeshArchive::load_with_version(file.path())?;
    assert_eq!(version, MeshArchive::LATEST);
    Ok(())
}
