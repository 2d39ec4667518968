// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - versioned archives

mod archive;

pub use archive::{CollisionSectionRecord, MeshArchive, SectionRecord};
