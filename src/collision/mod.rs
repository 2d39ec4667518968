// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision module - collision-only geometry, convex hulls and cooking

mod backend;
mod manager;
mod parry;
mod shapes;

pub use backend::{CollisionInput, CookRequest, NullPhysics, PhysicsBackend, RecordingPhysics};
pub use manager::CollisionManager;
pub use parry::{CollisionShapes, ParryPhysics};
pub use shapes::{CollisionMesh, CollisionSection, CollisionSource, ConvexHull};
