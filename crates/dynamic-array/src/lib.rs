// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # dynamic-array
//!
//! A growable contiguous array parameterised by its storage provider.
//!
//! [`DynamicArray`] keeps its elements in one contiguous allocation obtained
//! from an [`Allocator`](memory_pool::Allocator). With the default
//! [`PoolAllocator`](memory_pool::PoolAllocator) every growth, shrink, and
//! release is served by a fixed-capacity [`MemoryPool`](memory_pool::MemoryPool)
//! instead of the system allocator; with
//! [`HeapAllocator`](memory_pool::HeapAllocator) it behaves like a plain
//! heap vector, which is what the benchmarks compare against.
//!
//! # Differences From `Vec`
//!
//! - Every operation that may allocate returns a `Result`, since a bounded
//!   pool can run out where the heap would not.
//! - Growth is one slot early and scales by 1.5, so capacities differ from
//!   `Vec`'s doubling.
//! - [`clear`](DynamicArray::clear) returns the storage to the allocator;
//!   `erase_range(..)` empties the array but keeps it.

mod array;
mod error;

pub use array::DynamicArray;
pub use error::ArrayError;
