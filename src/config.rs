// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runtime mesh configuration

use crate::mesh::UpdateFrequency;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up by [`MeshConfig::load`]
pub const CONFIG_FILE: &str = "runtime_mesh.toml";

/// Behavior switches for a [`RuntimeMesh`](crate::RuntimeMesh)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Answer simple collision queries with the per-triangle mesh
    pub use_complex_as_simple_collision: bool,
    /// Defer collision cooking to `tick()` instead of cooking on every change
    pub bake_collision_on_tick: bool,
    /// Reject vertex-only updates that leave indices pointing past the new buffer
    pub validate_vertex_updates: bool,
    /// Frequency hint used by `create_section_from_components`
    pub default_update_frequency: UpdateFrequency,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            use_complex_as_simple_collision: true,
            bake_collision_on_tick: false,
            validate_vertex_updates: false,
            default_update_frequency: UpdateFrequency::Average,
        }
    }
}

impl MeshConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: MeshConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `runtime_mesh.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_flag("RUNTIME_MESH_COMPLEX_AS_SIMPLE") {
            self.use_complex_as_simple_collision = value;
        }
        if let Some(value) = env_flag("RUNTIME_MESH_BAKE_ON_TICK") {
            self.bake_collision_on_tick = value;
        }
        if let Some(value) = env_flag("RUNTIME_MESH_VALIDATE_VERTEX_UPDATES") {
            self.validate_vertex_updates = value;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            log::warn!("ignoring {name}={other:?}: expected a boolean");
            None
        }
    }
}
