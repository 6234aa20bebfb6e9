// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for pool allocation and configuration.

/// Errors that can occur while creating, configuring, or allocating from a pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// No single free chunk is large enough for the request.
    ///
    /// `free_total` may well be larger than `requested`: the pool never
    /// compacts, so fragmentation is reported rather than hidden.
    #[error("out of memory: requested {requested} elements, largest free chunk is {largest_free} ({free_total} free in total)")]
    OutOfMemory {
        requested: usize,
        largest_free: usize,
        free_total: usize,
    },

    /// Attempted to allocate zero elements.
    #[error("cannot allocate zero elements")]
    ZeroSizedAllocation,

    /// A `(pointer, length)` pair that matches no used chunk was returned.
    #[error("invalid free: no used chunk at element offset {offset} with length {len}")]
    InvalidFree { offset: usize, len: usize },

    /// A pool was requested with zero capacity.
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,

    /// The element type has size zero, so chunks could not be told apart by address.
    #[error("zero-sized element types cannot be pooled")]
    ZeroSizedElement,

    /// A capacity string could not be parsed.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Configuration could not be read, parsed, or serialised.
    #[error("configuration error: {0}")]
    Config(String),

    /// An internal pool inconsistency was detected.
    #[error("pool integrity error: {0}")]
    PoolCorruption(String),
}
