// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for profiling and diagnostics.
//!
//! [`PoolStats`] tracks cumulative metrics about how a pool's chunk list is
//! being exercised: how often requests fit exactly versus split a larger
//! chunk, how many requests failed on fragmentation, and how much merging
//! the coalescer performs. These are the numbers to look at when sizing a
//! pool.

/// Cumulative statistics about pool usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    /// Total number of allocation requests, including failed ones.
    pub total_allocations: u64,
    /// Allocations served by a free chunk of exactly the requested length.
    pub exact_fits: u64,
    /// Allocations that split a larger free chunk.
    pub splits: u64,
    /// Allocation requests that found no sufficiently large free chunk.
    pub oom_count: u64,
    /// Successful deallocations.
    pub total_deallocations: u64,
    /// Deallocations whose `(pointer, length)` matched no used chunk.
    pub invalid_frees: u64,
    /// Chunk merges performed while coalescing.
    pub merges: u64,
    /// Peak number of elements held by used chunks.
    pub peak_used_elements: usize,
    /// Total elements ever handed out.
    pub cumulative_allocated_elements: u64,
}

impl PoolStats {
    /// Returns the fraction of successful allocations that fit a free chunk
    /// exactly, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if nothing has been allocated.
    pub fn exact_fit_ratio(&self) -> f64 {
        let served = self.exact_fits + self.splits;
        if served == 0 {
            return 0.0;
        }
        self.exact_fits as f64 / served as f64
    }

    pub(crate) fn record_exact_fit(&mut self, len: usize) {
        self.total_allocations += 1;
        self.exact_fits += 1;
        self.cumulative_allocated_elements += len as u64;
    }

    pub(crate) fn record_split(&mut self, len: usize) {
        self.total_allocations += 1;
        self.splits += 1;
        self.cumulative_allocated_elements += len as u64;
    }

    pub(crate) fn record_oom(&mut self) {
        self.total_allocations += 1;
        self.oom_count += 1;
    }

    pub(crate) fn record_deallocation(&mut self, merges: usize) {
        self.total_deallocations += 1;
        self.merges += merges as u64;
    }

    pub(crate) fn record_invalid_free(&mut self) {
        self.invalid_frees += 1;
    }

    /// Updates the peak usage high-water mark if needed.
    pub(crate) fn update_peak(&mut self, used_elements: usize) {
        if used_elements > self.peak_used_elements {
            self.peak_used_elements = used_elements;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Allocations: {} total ({} exact, {} split, {:.0}% exact), \
             {} OOMs, {} deallocations ({} merges), {} invalid frees, \
             peak {} elements",
            self.total_allocations,
            self.exact_fits,
            self.splits,
            self.exact_fit_ratio() * 100.0,
            self.oom_count,
            self.total_deallocations,
            self.merges,
            self.invalid_frees,
            self.peak_used_elements,
        )
    }
}
