// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Render proxy collaborator
//!
//! The host renderer sees a mesh only through [`RenderProxy::submit`]. Each
//! submission carries per-section events in index order; a section always
//! gets its `Create` before any update for it.

mod event;

pub use event::{
    OperationKind, ProxyEvent, ProxySubmission, SectionOperation, SectionRenderData,
    SubmissionKind,
};

use anyhow::{bail, Result};

pub trait RenderProxy {
    /// Whether non-structural updates can patch existing resources.
    /// When false every submission is applied as a recreate.
    fn supports_in_place_updates(&self) -> bool {
        true
    }

    /// Hand off a submission. Must not block on a render frame.
    fn submit(&mut self, submission: ProxySubmission) -> Result<()>;
}

impl<T: RenderProxy + ?Sized> RenderProxy for Box<T> {
    fn supports_in_place_updates(&self) -> bool {
        (**self).supports_in_place_updates()
    }

    fn submit(&mut self, submission: ProxySubmission) -> Result<()> {
        (**self).submit(submission)
    }
}

/// Proxy for meshes that are never drawn
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProxy;

impl RenderProxy for NullProxy {
    fn submit(&mut self, _submission: ProxySubmission) -> Result<()> {
        Ok(())
    }
}

/// Keeps every submission for inspection
#[derive(Debug, Clone)]
pub struct RecordingProxy {
    submissions: Vec<ProxySubmission>,
    in_place_updates: bool,
    reject: bool,
}

impl RecordingProxy {
    pub fn new() -> Self {
        Self {
            submissions: Vec::new(),
            in_place_updates: true,
            reject: false,
        }
    }

    /// A proxy that has to be recreated for every change.
    pub fn without_in_place_updates() -> Self {
        Self {
            in_place_updates: false,
            ..Self::new()
        }
    }

    /// Fail every following submission (they are still recorded).
    pub fn set_rejecting(&mut self, reject: bool) {
        self.reject = reject;
    }

    pub fn submissions(&self) -> &[ProxySubmission] {
        &self.submissions
    }

    pub fn last(&self) -> Option<&ProxySubmission> {
        self.submissions.last()
    }

    pub fn events(&self) -> impl Iterator<Item = &ProxyEvent> {
        self.submissions.iter().flat_map(|s| s.events.iter())
    }

    pub fn count(&self, kind: OperationKind) -> usize {
        self.submissions.iter().map(|s| s.count(kind)).sum()
    }

    pub fn clear(&mut self) {
        self.submissions.clear();
    }
}

impl Default for RecordingProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderProxy for RecordingProxy {
    fn supports_in_place_updates(&self) -> bool {
        self.in_place_updates
    }

    fn submit(&mut self, submission: ProxySubmission) -> Result<()> {
        let events = submission.events.len();
        self.submissions.push(submission);
        if self.reject {
            bail!("proxy is rejecting submissions ({events} events dropped)");
        }
        Ok(())
    }
}
