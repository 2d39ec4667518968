// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Section storage, bounds aggregation and batch coalescing

mod batch;
mod bounds;
mod section;
mod store;

pub use batch::{BatchState, SectionUpdateFlags};
pub use bounds::recompute_bounds;
pub use section::{validate_indices, Section, UpdateFrequency, UpdateOptions};
pub use store::SectionStore;
