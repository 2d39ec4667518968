// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sparse, index-stable section storage

use super::Section;
use crate::error::MeshError;

/// Sections addressed by a stable index; cleared slots stay as holes.
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: Vec<Option<Section>>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, holes included.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn exists(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index).and_then(Option::as_mut)
    }

    pub fn require_mut(&mut self, index: usize) -> Result<&mut Section, MeshError> {
        self.get_mut(index).ok_or(MeshError::SectionNotFound(index))
    }

    /// Put `section` at `index`, growing with holes as needed.
    /// Returns the section it replaced.
    pub fn insert(&mut self, index: usize, section: Section) -> Option<Section> {
        if index >= self.sections.len() {
            self.sections.resize_with(index + 1, || None);
        }
        self.sections[index].replace(section)
    }

    /// Empty the slot at `index`. Trailing holes are dropped so the slot
    /// count always ends at a live section.
    pub fn remove(&mut self, index: usize) -> Option<Section> {
        let removed = self.sections.get_mut(index).and_then(Option::take);
        while matches!(self.sections.last(), Some(None)) {
            self.sections.pop();
        }
        removed
    }

    /// Drop every section, returning the indices that were live.
    pub fn clear(&mut self) -> Vec<usize> {
        let live = self.indices().collect();
        self.sections.clear();
        live
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(index, _)| index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Section)> {
        self.sections
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|section| (index, section)))
    }
}
