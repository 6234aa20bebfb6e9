// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pool-bench
//!
//! Command-line benchmark and inspection tool for the fixed-capacity pool.
//!
//! ## Usage
//! ```bash
//! # Time the push-back workload for Vec and both DynamicArray backends
//! pool-bench bench --workload push-back --iterations 200 --capacity 100M
//!
//! # Replay an allocate/free script and print the chunk layout
//! pool-bench chunks --capacity 64 --script "a5,a3,f0,a10"
//!
//! # Print the effective pool configuration as TOML
//! pool-bench --config pool.toml config
//! ```

mod commands;
mod workload;

use clap::{Parser, Subcommand};
use workload::Workload;

#[derive(Parser)]
#[command(
    name = "pool-bench",
    about = "Benchmark and inspect a fixed-capacity memory pool",
    version,
    author
)]
struct Cli {
    /// Path to a TOML pool configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time a workload over Vec, DynamicArray<HeapAllocator> and
    /// DynamicArray<PoolAllocator>.
    Bench {
        /// Workload to run.
        #[arg(short, long, value_enum, default_value_t = Workload::PushBack)]
        workload: Workload,

        /// Number of rounds; round k scales the workload by k.
        #[arg(short = 'n', long, default_value_t = 100)]
        iterations: usize,

        /// Pool capacity in elements (e.g., "100M"). Overrides the config file.
        #[arg(long)]
        capacity: Option<String>,
    },

    /// Replay an allocate/free script against a pool and print its chunks.
    Chunks {
        /// Pool capacity in elements. Overrides the config file; defaults
        /// to 64 when neither is given.
        #[arg(long)]
        capacity: Option<String>,

        /// Comma-separated steps: `a<n>` allocates n elements, `f<i>` frees
        /// the i-th allocation of the script.
        #[arg(short, long)]
        script: String,

        /// Print the chunk layout and statistics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective pool configuration as TOML.
    Config {
        /// Pool capacity in elements. Overrides the config file.
        #[arg(long)]
        capacity: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Bench {
            workload,
            iterations,
            capacity,
        } => {
            let config = commands::load_config(cli.config.as_deref(), capacity)?;
            commands::bench::execute(&config, workload, iterations)
        }
        Commands::Chunks {
            capacity,
            script,
            json,
        } => {
            let capacity = capacity.or_else(|| cli.config.is_none().then(|| "64".to_string()));
            let config = commands::load_config(cli.config.as_deref(), capacity)?;
            commands::chunks::execute(&config, &script, json)
        }
        Commands::Config { capacity } => {
            let config = commands::load_config(cli.config.as_deref(), capacity)?;
            commands::config::execute(&config)
        }
    }
}
