// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision assembly and cooking

use nalgebra::Point3;
use runtime_mesh::collision::{CollisionSource, RecordingPhysics};
use runtime_mesh::proxy::RecordingProxy;
use runtime_mesh::{
    MeshConfig, MeshError, NullProxy, ParryPhysics, RuntimeMesh, UpdateFrequency, UpdateOptions,
    VertexBuffer,
};

fn triangle(x: f32) -> Vec<Point3<f32>> {
    vec![
        Point3::new(x, 0.0, 0.0),
        Point3::new(x + 1.0, 0.0, 0.0),
        Point3::new(x, 1.0, 0.0),
    ]
}

fn cube(size: f32) -> Vec<Point3<f32>> {
    let mut points = Vec::new();
    for x in [0.0, size] {
        for y in [0.0, size] {
            for z in [0.0, size] {
                points.push(Point3::new(x, y, z));
            }
        }
    }
    points
}

fn recording_mesh() -> RuntimeMesh<RecordingProxy, RecordingPhysics> {
    let _ = env_logger::builder().is_test(true).try_init();
    RuntimeMesh::with_backends(RecordingProxy::new(), RecordingPhysics::new())
}

fn add_render_section<R, P>(mesh: &mut RuntimeMesh<R, P>, index: usize, x: f32, collision: bool)
where
    R: runtime_mesh::RenderProxy,
    P: runtime_mesh::PhysicsBackend,
{
    mesh.create_section(
        index,
        VertexBuffer::PositionOnly(triangle(x)),
        vec![0, 1, 2],
        collision,
        UpdateFrequency::Average,
        UpdateOptions::default(),
    )
    .unwrap();
}

#[test]
fn test_render_and_collision_sections_merge() {
    let mut mesh = recording_mesh();
    add_render_section(&mut mesh, 0, 0.0, true);
    add_render_section(&mut mesh, 1, 5.0, false);
    mesh.set_collision_section(3, triangle(10.0), vec![0, 1, 2])
        .unwrap();

    let combined = mesh.collision_mesh().unwrap();
    assert_eq!(combined.triangle_count(), 2);
    assert_eq!(
        combined.sources,
        vec![CollisionSource::RenderSection(0), CollisionSource::CollisionSection(3)]
    );
    // collision-only sections stay out of the render bounds
    assert_eq!(mesh.bounds().max, Point3::new(6.0, 1.0, 0.0));
    assert!(mesh.collision_section(3).is_some());
}

#[test]
fn test_toggling_collision_rebuilds() {
    let mut mesh = recording_mesh();
    add_render_section(&mut mesh, 0, 0.0, false);
    assert_eq!(mesh.physics().cook_count(), 0);

    mesh.set_section_collision_enabled(0, true).unwrap();
    assert_eq!(mesh.physics().cook_count(), 1);
    assert!(mesh.physics().last().unwrap().complex.is_some());

    mesh.set_section_collision_enabled(0, false).unwrap();
    assert_eq!(mesh.physics().cook_count(), 2);
    assert!(mesh.physics().last().unwrap().complex.is_none());
}

#[test]
fn test_visibility_does_not_touch_collision() {
    let mut mesh = recording_mesh();
    add_render_section(&mut mesh, 0, 0.0, true);
    mesh.physics_mut().clear();

    mesh.set_section_visible(0, false).unwrap();
    mesh.set_section_casts_shadow(0, false).unwrap();
    assert_eq!(mesh.physics().cook_count(), 0);
}

#[test]
fn test_convex_hulls_and_simple_flag() {
    let mut mesh = recording_mesh();
    mesh.set_use_complex_as_simple_collision(false).unwrap();
    mesh.add_convex_hull(cube(1.0)).unwrap();
    mesh.add_convex_hull(cube(2.0)).unwrap();

    let request = mesh.physics().last().unwrap();
    assert!(!request.use_complex_as_simple);
    assert_eq!(request.convex_hulls.len(), 2);

    mesh.clear_convex_hulls().unwrap();
    assert!(mesh.physics().last().unwrap().convex_hulls.is_empty());
    assert!(!mesh.use_complex_as_simple_collision());
}

#[test]
fn test_invalid_collision_section() {
    let mut mesh = recording_mesh();
    assert!(matches!(
        mesh.set_collision_section(0, triangle(0.0), vec![0, 1, 3]),
        Err(MeshError::IndexOutOfRange { index: 3, .. })
    ));
    assert!(mesh.collision_section(0).is_none());
    assert_eq!(mesh.physics().cook_count(), 0);
}

#[test]
fn test_failed_cook_retries() {
    let mut mesh = recording_mesh();
    mesh.physics_mut().set_rejecting(true);
    let result = mesh.create_section(
        0,
        VertexBuffer::PositionOnly(triangle(0.0)),
        vec![0, 1, 2],
        true,
        UpdateFrequency::Average,
        UpdateOptions::default(),
    );
    assert!(matches!(result, Err(MeshError::CollisionCook(_))));
    assert!(mesh.section_exists(0));
    assert!(mesh.is_collision_dirty());
    assert!(mesh.collision_body().is_none());

    mesh.physics_mut().set_rejecting(false);
    assert!(mesh.rebuild_collision_if_dirty().unwrap());
    assert_eq!(mesh.collision_body(), Some(&0));
}

#[test]
fn test_bake_on_tick() {
    let config = MeshConfig {
        bake_collision_on_tick: true,
        ..MeshConfig::default()
    };
    let mut mesh = RuntimeMesh::with_config(config, RecordingProxy::new(), RecordingPhysics::new());
    for index in 0..4 {
        add_render_section(&mut mesh, index, index as f32, true);
    }
    mesh.clear_section(2).unwrap();
    assert_eq!(mesh.physics().cook_count(), 0);

    assert!(mesh.tick().unwrap());
    assert_eq!(mesh.physics().cook_count(), 1);
    assert_eq!(mesh.physics().last().unwrap().complex.as_ref().unwrap().triangle_count(), 3);
}

#[test]
fn test_parry_cooking() {
    let mut mesh = RuntimeMesh::with_backends(NullProxy, ParryPhysics::new());
    add_render_section(&mut mesh, 0, 0.0, true);
    add_render_section(&mut mesh, 1, 2.0, true);

    let shapes = mesh.collision_body().unwrap();
    let trimesh = shapes.complex.as_ref().unwrap().as_trimesh().unwrap();
    assert_eq!(trimesh.indices().len(), 2);
    assert!(shapes.simple.as_ref().unwrap().as_trimesh().is_some());

    mesh.set_use_complex_as_simple_collision(false).unwrap();
    mesh.set_convex_hulls(vec![cube(1.0), triangle(0.0)]).unwrap();
    let shapes = mesh.collision_body().unwrap();
    let compound = shapes.simple.as_ref().unwrap().as_compound().unwrap();
    assert_eq!(compound.shapes().len(), 1);
}
