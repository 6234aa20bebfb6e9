// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for array operations.

use memory_pool::MemoryError;

/// Errors returned by [`DynamicArray`](crate::DynamicArray) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// A checked access or positional operation was past the end.
    #[error("index {index} out of range for array of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A reservation larger than the allocator can ever satisfy.
    #[error("cannot reserve {requested} elements: allocator max_size is {max}")]
    LengthError { requested: usize, max: usize },

    /// The allocator could not provide storage.
    #[error("allocation failed: {0}")]
    Memory(#[from] MemoryError),
}
