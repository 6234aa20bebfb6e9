// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pool-bench chunks` command: replay an allocate/free script.
//!
//! The script is a comma-separated list of steps:
//!
//! - `a<n>` allocates `n` elements.
//! - `f<i>` frees the allocation made by the `i`-th `a` step (0-based).
//!
//! Each step's outcome is printed, failures included, followed by the final
//! chunk layout and the pool statistics. Freeing the same allocation twice
//! goes to the pool again so the rejection can be seen.

use anyhow::Context;
use memory_pool::{Chunk, MemoryPool, PoolConfig};
use std::ptr::NonNull;

/// Width of the layout bar, in characters.
const BAR_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Allocate(usize),
    Free(usize),
}

/// Parses a script such as `"a5, a3, f0, a10"`.
pub fn parse_script(script: &str) -> anyhow::Result<Vec<Step>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| {
            let mut chars = token.chars();
            let kind = chars.next().unwrap_or_default();
            let n: usize = chars
                .as_str()
                .parse()
                .with_context(|| format!("bad step '{token}': expected a number after '{kind}'"))?;
            match kind.to_ascii_lowercase() {
                'a' => Ok(Step::Allocate(n)),
                'f' => Ok(Step::Free(n)),
                _ => anyhow::bail!("bad step '{token}': must start with 'a' or 'f'"),
            }
        })
        .collect()
}

/// One `a` step's outcome: the range it got, if any, and whether it has
/// been freed since.
struct Slot {
    range: Option<(NonNull<u64>, usize)>,
    freed: bool,
}

pub fn execute(config: &PoolConfig, script: &str, json: bool) -> anyhow::Result<()> {
    let steps = parse_script(script)?;
    anyhow::ensure!(!steps.is_empty(), "script has no steps");

    let pool: MemoryPool<u64> = config
        .build()
        .with_context(|| format!("creating pool '{}'", config.name))?;
    let mut slots: Vec<Slot> = Vec::new();

    if !json {
        println!("  Pool: {} ({} elements)", pool.name(), pool.capacity());
        println!();
    }

    for (n, step) in steps.iter().enumerate() {
        let outcome = match *step {
            Step::Allocate(len) => match pool.allocate(len) {
                Ok(ptr) => {
                    slots.push(Slot {
                        range: Some((ptr, len)),
                        freed: false,
                    });
                    let offset = pool.offset_of(ptr).unwrap_or_default();
                    format!("#{} -> [{offset}, {})", slots.len() - 1, offset + len)
                }
                Err(e) => {
                    slots.push(Slot {
                        range: None,
                        freed: false,
                    });
                    format!("#{} -> {e}", slots.len() - 1)
                }
            },
            Step::Free(i) => match slots.get_mut(i) {
                None => format!("no allocation #{i}"),
                Some(Slot { range: None, .. }) => format!("allocation #{i} had failed"),
                Some(Slot {
                    range: Some((ptr, len)),
                    freed,
                }) => match pool.deallocate(*ptr, *len) {
                    Ok(()) => {
                        *freed = true;
                        format!("#{i} released")
                    }
                    Err(e) => e.to_string(),
                },
            },
        };
        tracing::debug!(step = n, ?step, "{outcome}");
        if !json {
            println!("  {:>3}. {:<6} {outcome}", n, step_label(step));
        }
    }

    pool.check_invariants()?;
    let chunks = pool.chunks();
    let stats = pool.stats();

    if json {
        let report = serde_json::json!({
            "pool": pool.name(),
            "capacity": pool.capacity(),
            "chunks": chunks,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        print_layout(&chunks, pool.capacity());
        println!();
        println!("  {}", stats.summary());
    }

    // Hand back whatever the script left allocated.
    for slot in &slots {
        if let (Some((ptr, len)), false) = (slot.range, slot.freed) {
            pool.deallocate(ptr, len)?;
        }
    }
    Ok(())
}

fn step_label(step: &Step) -> String {
    match step {
        Step::Allocate(n) => format!("a{n}"),
        Step::Free(i) => format!("f{i}"),
    }
}

fn print_layout(chunks: &[Chunk], capacity: usize) {
    println!("  {:>5} {:>12} {:>12}  {}", "Chunk", "Start", "Len", "State");
    println!("  {}", "-".repeat(40));
    for (i, c) in chunks.iter().enumerate() {
        let state = if c.free { "free" } else { "used" };
        println!("  {:>5} {:>12} {:>12}  {state}", i, c.start, c.len);
    }
    println!();
    println!("  [{}]", layout_bar(chunks, capacity));
}

/// Renders the chunk list as a bar: `#` for used, `.` for free.
fn layout_bar(chunks: &[Chunk], capacity: usize) -> String {
    (0..BAR_WIDTH)
        .map(|col| {
            // Element at the middle of this column.
            let at = (col * 2 + 1) * capacity / (BAR_WIDTH * 2);
            let used = chunks
                .iter()
                .find(|c| c.start <= at && at < c.end())
                .is_some_and(|c| !c.free);
            if used {
                '#'
            } else {
                '.'
            }
        })
        .collect()
}
