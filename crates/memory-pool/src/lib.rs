// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-pool
//!
//! A fixed-capacity memory pool for elements of one type, for deterministic
//! allocation on latency-sensitive paths where calling the system allocator
//! per request is not acceptable.
//!
//! # Key Components
//!
//! - [`MemoryPool`]: owns one contiguous region of `N` elements, reserved
//!   once at creation and never resized. Sub-allocates ranges first-fit from
//!   an ordered chunk list and coalesces on free.
//! - [`Allocator`]: the storage contract containers are written against.
//! - [`PoolAllocator`]: a cloneable handle that allocates from a pool.
//! - [`HeapAllocator`]: the same contract over the global heap.
//! - [`PoolCapacity`] / [`PoolConfig`]: capacity parsing (`"100M"`) and
//!   TOML configuration.
//! - [`PoolStats`]: cumulative metrics (exact fits, splits, merges, OOMs).
//!
//! # Chunk List
//!
//! ```text
//!  offset 0                                                     N
//!  ├──────────┬──────┬───────────────────────────────────────────┤
//!  │ used (5) │used 3│                 free (N-8)                │
//!  └──────────┴──────┴───────────────────────────────────────────┘
//!                            ▲
//!          allocate(n) scans from this end backwards,
//!          splitting the first free chunk with len ≥ n
//! ```
//!
//! Allocation never compacts: a request larger than every free chunk fails
//! with [`MemoryError::OutOfMemory`] even when the free total is enough.
//!
//! # Example
//! ```
//! use memory_pool::{Allocator, MemoryPool};
//!
//! let pool: MemoryPool<i32> = MemoryPool::new(100_000).unwrap();
//! let alloc = pool.allocator();
//!
//! let a = alloc.allocate(5).unwrap();
//! let b = alloc.allocate(3).unwrap();
//! assert_eq!(pool.chunk_count(), 3);
//!
//! unsafe {
//!     alloc.deallocate(a, 5);
//!     alloc.deallocate(b, 3);
//! }
//! // Freed ranges coalesce back into a single chunk.
//! assert_eq!(pool.chunk_count(), 1);
//! assert_eq!(pool.free_elements(), 100_000);
//! ```

mod allocator;
mod capacity;
mod chunk;
mod config;
mod error;
mod pool;
mod stats;

pub use allocator::{Allocator, HeapAllocator, PoolAllocator};
pub use capacity::PoolCapacity;
pub use chunk::Chunk;
pub use config::PoolConfig;
pub use error::MemoryError;
pub use pool::MemoryPool;
pub use stats::PoolStats;
