// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pool-bench bench` command: time one workload over three containers.
//!
//! Runs rounds `1..=iterations` of the workload against `Vec<i32>`,
//! `DynamicArray<i32, HeapAllocator>` and `DynamicArray<i32, PoolAllocator>`,
//! then prints a comparison table and the pool's statistics.

use crate::workload::{run_round, Workload};
use anyhow::Context;
use dynamic_array::{ArrayError, DynamicArray};
use memory_pool::{HeapAllocator, MemoryPool, PoolConfig};
use std::time::{Duration, Instant};

/// Fraction of the pool a single round may fill. Growth holds the old and
/// the new storage at once and leaves freed chunks below the live one, so a
/// pool-backed array needs several times its length in pool capacity.
const POOL_HEADROOM: usize = 5;

struct BenchResult {
    container: &'static str,
    total: Duration,
    checksum: usize,
}

pub fn execute(config: &PoolConfig, workload: Workload, iterations: usize) -> anyhow::Result<()> {
    anyhow::ensure!(iterations > 0, "iterations must be at least 1");

    let pool: MemoryPool<i32> = config
        .build()
        .with_context(|| format!("creating pool '{}'", config.name))?;
    let limit = pool.capacity() / POOL_HEADROOM;
    anyhow::ensure!(
        limit > 0,
        "pool capacity {} is too small to benchmark",
        pool.capacity()
    );

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           pool-bench · Container Benchmark          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Workload:    {workload}");
    println!("  Rounds:      {iterations}");
    println!("  Pool:        {} ({} elements)", pool.name(), pool.capacity());
    println!("  Round limit: {limit} elements");
    println!();

    let results = vec![
        time_rounds("Vec<i32>", iterations, |k| {
            let mut v: Vec<i32> = Vec::new();
            run_round(workload, &mut v, k, limit)
        })?,
        time_rounds("DynamicArray<HeapAllocator>", iterations, |k| {
            let mut v: DynamicArray<i32, _> = DynamicArray::new_in(HeapAllocator::new());
            run_round(workload, &mut v, k, limit)
        })?,
        time_rounds("DynamicArray<PoolAllocator>", iterations, |k| {
            let mut v = DynamicArray::new_in(pool.allocator());
            run_round(workload, &mut v, k, limit)
        })?,
    ];

    // ── Results Table ──────────────────────────────────────────
    let baseline = results[0].total.as_secs_f64();
    println!(
        "  {:<30} {:>12} {:>14} {:>8}",
        "Container", "Total ms", "µs / round", "vs Vec"
    );
    println!("  {}", "-".repeat(68));
    for r in &results {
        let total_ms = r.total.as_secs_f64() * 1000.0;
        let per_round_us = r.total.as_secs_f64() * 1e6 / iterations as f64;
        let ratio = if baseline > 0.0 {
            r.total.as_secs_f64() / baseline
        } else {
            1.0
        };
        println!(
            "  {:<30} {:>12.3} {:>14.2} {:>7.2}x",
            r.container, total_ms, per_round_us, ratio
        );
    }
    println!();

    if results.windows(2).any(|w| w[0].checksum != w[1].checksum) {
        anyhow::bail!("containers disagree on the final lengths of the workload");
    }

    // ── Pool Stats ─────────────────────────────────────────────
    pool.check_invariants()?;
    let stats = pool.stats();
    println!("  Pool");
    println!("   {}", stats.summary());
    println!("   In use after run: {} elements", pool.used_elements());
    println!();

    tracing::info!(
        %workload,
        iterations,
        allocations = stats.total_allocations,
        peak = stats.peak_used_elements,
        "benchmark finished"
    );
    Ok(())
}

/// Times rounds `1..=iterations` of `round`, each on a fresh container.
fn time_rounds<F>(container: &'static str, iterations: usize, mut round: F) -> anyhow::Result<BenchResult>
where
    F: FnMut(usize) -> Result<usize, ArrayError>,
{
    tracing::debug!(container, iterations, "timing rounds");

    let mut checksum = 0usize;
    let start = Instant::now();
    for k in 1..=iterations {
        let len = round(k).with_context(|| format!("{container}: round {k} failed"))?;
        checksum = checksum.wrapping_add(std::hint::black_box(len));
    }
    let total = start.elapsed();

    Ok(BenchResult {
        container,
        total,
        checksum,
    })
}
