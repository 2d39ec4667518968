// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Physics collaborator contract

use super::{CollisionMesh, ConvexHull};
use anyhow::{bail, Result};

/// Everything the physics engine needs to cook one collision body
#[derive(Debug, Clone, Copy)]
pub struct CollisionInput<'a> {
    /// `None` means the mesh has no complex collision at all.
    pub complex: Option<&'a CollisionMesh>,
    pub convex_hulls: &'a [ConvexHull],
    /// Answer simple collision queries with the complex mesh.
    pub use_complex_as_simple: bool,
}

pub trait PhysicsBackend {
    /// Opaque result of cooking, owned by the mesh until the next rebuild.
    type Handle;

    fn cook(&mut self, input: CollisionInput<'_>) -> Result<Self::Handle>;
}

/// Backend for meshes without physics
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPhysics;

impl PhysicsBackend for NullPhysics {
    type Handle = ();

    fn cook(&mut self, _input: CollisionInput<'_>) -> Result<()> {
        Ok(())
    }
}

/// Owned copy of a [`CollisionInput`]
#[derive(Debug, Clone, PartialEq)]
pub struct CookRequest {
    pub complex: Option<CollisionMesh>,
    pub convex_hulls: Vec<ConvexHull>,
    pub use_complex_as_simple: bool,
}

/// Keeps a copy of every cook request; handles are the request number.
#[derive(Debug, Clone, Default)]
pub struct RecordingPhysics {
    requests: Vec<CookRequest>,
    reject: bool,
}

impl RecordingPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rejecting(&mut self, reject: bool) {
        self.reject = reject;
    }

    pub fn requests(&self) -> &[CookRequest] {
        &self.requests
    }

    pub fn last(&self) -> Option<&CookRequest> {
        self.requests.last()
    }

    pub fn cook_count(&self) -> usize {
        self.requests.len()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

impl PhysicsBackend for RecordingPhysics {
    type Handle = usize;

    fn cook(&mut self, input: CollisionInput<'_>) -> Result<usize> {
        if self.reject {
            bail!("physics backend is rejecting collision data");
        }
        self.requests.push(CookRequest {
            complex: input.complex.cloned(),
            convex_hulls: input.convex_hulls.to_vec(),
            use_complex_as_simple: input.use_complex_as_simple,
        });
        Ok(self.requests.len() - 1)
    }
}
