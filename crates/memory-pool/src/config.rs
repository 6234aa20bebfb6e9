// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! name = "ints"
//! capacity = "100M"
//! ```

use crate::{MemoryError, MemoryPool, PoolCapacity};
use std::path::Path;

/// Configuration for a [`MemoryPool`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolConfig {
    /// Diagnostic name attached to the pool's log events.
    #[serde(default = "default_name")]
    pub name: String,
    /// Capacity in elements (human-readable, e.g. `"100M"`).
    #[serde(default = "default_capacity")]
    pub capacity: String,
}

fn default_name() -> String {
    "pool".to_string()
}

fn default_capacity() -> String {
    "100M".to_string()
}

impl PoolConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MemoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, MemoryError> {
        toml::from_str(toml_str)
            .map_err(|e| MemoryError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, MemoryError> {
        toml::to_string_pretty(self)
            .map_err(|e| MemoryError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the capacity string into a [`PoolCapacity`].
    pub fn parse_capacity(&self) -> Result<PoolCapacity, MemoryError> {
        PoolCapacity::parse(&self.capacity)
    }

    /// Creates the pool this configuration describes.
    pub fn build<T>(&self) -> Result<MemoryPool<T>, MemoryError> {
        let capacity = self.parse_capacity()?;
        MemoryPool::with_name(self.name.clone(), capacity.elements())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            capacity: default_capacity(),
        }
    }
}
