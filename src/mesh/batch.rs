// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch update coalescing
//!
//! While a batch is open every section mutation only records what kind of
//! update it needs. The flags for one section are OR-ed together, except that
//! create and destroy cancel each other: whichever came last wins.

use bitflags::bitflags;

bitflags! {
    /// Pending render-side work for one section
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SectionUpdateFlags: u8 {
        const CREATE = 0x01;
        const DESTROY = 0x02;
        const VERTICES = 0x04;
        const INDICES = 0x08;
        const VISIBILITY = 0x10;
    }
}

impl SectionUpdateFlags {
    /// Whether the render proxy has to be rebuilt rather than patched.
    pub fn is_structural(&self) -> bool {
        self.intersects(Self::CREATE | Self::DESTROY | Self::INDICES)
    }
}

/// Coalesced state of an open batch
#[derive(Debug, Clone, Default)]
pub struct BatchState {
    active: bool,
    pub requires_proxy_recreate: bool,
    pub requires_bounds_update: bool,
    pub requires_collision_update: bool,
    section_updates: Vec<SectionUpdateFlags>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin(&mut self) {
        self.active = true;
    }

    pub fn mark_create(&mut self, index: usize) {
        let flags = self.slot(index);
        flags.remove(SectionUpdateFlags::DESTROY);
        flags.insert(SectionUpdateFlags::CREATE);
        self.requires_proxy_recreate = true;
    }

    pub fn mark_destroy(&mut self, index: usize) {
        let flags = self.slot(index);
        flags.remove(SectionUpdateFlags::CREATE);
        flags.insert(SectionUpdateFlags::DESTROY);
        self.requires_proxy_recreate = true;
    }

    pub fn mark_update(&mut self, index: usize, update: SectionUpdateFlags) {
        *self.slot(index) |= update;
        if update.is_structural() {
            self.requires_proxy_recreate = true;
        }
    }

    pub fn flags(&self, index: usize) -> SectionUpdateFlags {
        self.section_updates.get(index).copied().unwrap_or_default()
    }

    /// Sections with pending work, in index order.
    pub fn pending(&self) -> impl Iterator<Item = (usize, SectionUpdateFlags)> + '_ {
        self.section_updates
            .iter()
            .enumerate()
            .filter(|(_, flags)| !flags.is_empty())
            .map(|(index, flags)| (index, *flags))
    }

    /// Close the batch and hand back everything it collected.
    pub fn finish(&mut self) -> BatchState {
        let mut finished = std::mem::take(self);
        finished.active = false;
        finished
    }

    fn slot(&mut self, index: usize) -> &mut SectionUpdateFlags {
        if index >= self.section_updates.len() {
            self.section_updates
                .resize(index + 1, SectionUpdateFlags::empty());
        }
        &mut self.section_updates[index]
    }
}
