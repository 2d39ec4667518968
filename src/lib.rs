// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runtime Mesh
//!
//! Storage and update coordination for procedurally generated meshes split
//! into independently updatable sections. The mesh keeps aggregate bounds and
//! collision in sync with its sections and forwards every change to a render
//! proxy, coalescing work between `begin_batch` and `end_batch`.

pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod proxy;
pub mod runtime_mesh;

pub use collision::{CollisionManager, NullPhysics, ParryPhysics, PhysicsBackend};
pub use config::MeshConfig;
pub use error::MeshError;
pub use geometry::{BoundingBox, VertexBuffer, VertexComponents, VertexFormat};
pub use io::MeshArchive;
pub use mesh::{Section, UpdateFrequency, UpdateOptions};
pub use proxy::{NullProxy, RenderProxy};
pub use runtime_mesh::RuntimeMesh;
