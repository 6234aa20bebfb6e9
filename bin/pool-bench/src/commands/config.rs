// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pool-bench config` command: print the effective pool configuration.
//!
//! The output is valid TOML and can be saved and passed back with
//! `--config`.

use memory_pool::PoolConfig;

pub fn execute(config: &PoolConfig) -> anyhow::Result<()> {
    let capacity = config.parse_capacity()?;
    print!("{}", config.to_toml()?);
    println!(
        "# {capacity}, {} bytes as i32",
        capacity.bytes_for::<i32>()
    );
    Ok(())
}
