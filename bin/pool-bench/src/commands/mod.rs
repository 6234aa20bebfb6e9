// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod bench;
pub mod chunks;
pub mod config;

use anyhow::Context;
use memory_pool::PoolConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity maps 0 → warn, 1 → info,
/// 2 → debug, 3+ → trace.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the pool configuration: the file at `path` if given (else the
/// defaults), with `capacity` overriding its capacity.
pub fn load_config(path: Option<&Path>, capacity: Option<String>) -> anyhow::Result<PoolConfig> {
    let mut config = match path {
        Some(path) => PoolConfig::from_file(path)
            .with_context(|| format!("loading pool config from '{}'", path.display()))?,
        None => PoolConfig::default(),
    };
    if let Some(capacity) = capacity {
        config.capacity = capacity;
    }
    // Fail on a bad capacity before any command starts work.
    let parsed = config
        .parse_capacity()
        .with_context(|| format!("invalid pool capacity '{}'", config.capacity))?;

    tracing::debug!(name = %config.name, capacity = %parsed, "pool configuration resolved");
    Ok(config)
}
