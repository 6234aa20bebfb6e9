// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The ordered chunk list behind every pool.
//!
//! The list partitions the element range `[0, capacity)` into contiguous
//! chunks, each tagged free or used, kept sorted by start offset. It knows
//! nothing about the backing memory: offsets in, offsets out. That keeps the
//! allocation algorithm testable without touching raw pointers.
//!
//! # Allocation
//! First fit, searching from the high-address end backwards. Recently split
//! or freed chunks sit at that end for a typical grow/shrink working set, so
//! the scan usually stops early. An exact fit flips the chunk to used; a
//! larger chunk is split, with the used part taking the low addresses and
//! the free remainder shrinking in place.
//!
//! # Deallocation
//! The freed chunk is merged with every free neighbour, forward first and
//! then backward, so two free chunks are never adjacent.

/// A contiguous run of elements inside a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Chunk {
    /// Offset of the first element, in elements from the pool base.
    pub start: usize,
    /// Number of elements in the chunk. Never zero.
    pub len: usize,
    /// Whether the chunk is available for allocation.
    pub free: bool,
}

impl Chunk {
    /// One past the last element offset of this chunk.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// How an allocation was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fit {
    /// A free chunk of exactly the requested length was taken whole.
    Exact,
    /// A larger free chunk was split.
    Split,
}

#[derive(Debug, Clone)]
pub(crate) struct ChunkList {
    chunks: Vec<Chunk>,
    capacity: usize,
}

impl ChunkList {
    /// Creates a list holding one free chunk that spans `capacity` elements.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            chunks: vec![Chunk {
                start: 0,
                len: capacity,
                free: true,
            }],
            capacity,
        }
    }

    /// Reserves `len` elements and returns the start offset, or `None` if no
    /// single free chunk is large enough.
    pub(crate) fn allocate(&mut self, len: usize) -> Option<(usize, Fit)> {
        debug_assert!(len > 0);

        let idx = self.chunks.iter().rposition(|c| c.free && c.len >= len)?;
        let chunk = &mut self.chunks[idx];

        if chunk.len == len {
            chunk.free = false;
            return Some((chunk.start, Fit::Exact));
        }

        let start = chunk.start;
        chunk.start += len;
        chunk.len -= len;
        self.chunks.insert(
            idx,
            Chunk {
                start,
                len,
                free: false,
            },
        );
        Some((start, Fit::Split))
    }

    /// Releases the used chunk at `start` of exactly `len` elements and
    /// coalesces it with its free neighbours.
    ///
    /// Returns the number of merges performed, or `None` when no used chunk
    /// matches `(start, len)`; the list is left untouched in that case.
    pub(crate) fn deallocate(&mut self, start: usize, len: usize) -> Option<usize> {
        let mut idx = self
            .chunks
            .binary_search_by_key(&start, |c| c.start)
            .ok()?;

        let chunk = &mut self.chunks[idx];
        if chunk.free || chunk.len != len {
            return None;
        }
        chunk.free = true;

        let mut merges = 0;

        while idx + 1 < self.chunks.len() && self.chunks[idx + 1].free {
            let next = self.chunks.remove(idx + 1);
            self.chunks[idx].len += next.len;
            merges += 1;
        }

        while idx > 0 && self.chunks[idx - 1].free {
            let current = self.chunks.remove(idx);
            idx -= 1;
            self.chunks[idx].len += current.len;
            merges += 1;
        }

        Some(merges)
    }

    pub(crate) fn as_slice(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn len(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn free_elements(&self) -> usize {
        self.chunks.iter().filter(|c| c.free).map(|c| c.len).sum()
    }

    pub(crate) fn used_elements(&self) -> usize {
        self.capacity - self.free_elements()
    }

    pub(crate) fn largest_free(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.free)
            .map(|c| c.len)
            .max()
            .unwrap_or(0)
    }

    /// Verifies that the chunks partition `[0, capacity)` in order, that no
    /// chunk is empty, and that no two free chunks are adjacent.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        let mut expected_start = 0;
        let mut prev_free = false;

        for (i, c) in self.chunks.iter().enumerate() {
            if c.len == 0 {
                return Err(format!("chunk {i} at offset {} is empty", c.start));
            }
            if c.start != expected_start {
                return Err(format!(
                    "chunk {i} starts at {} but the previous chunk ends at {expected_start}",
                    c.start
                ));
            }
            if i > 0 && prev_free && c.free {
                return Err(format!("chunks {} and {i} are both free and adjacent", i - 1));
            }
            expected_start = c.end();
            prev_free = c.free;
        }

        if expected_start != self.capacity {
            return Err(format!(
                "chunks cover {expected_start} elements, pool capacity is {}",
                self.capacity
            ));
        }
        Ok(())
    }
}
