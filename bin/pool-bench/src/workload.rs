// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmark workloads, written once over every container under test.
//!
//! Round `k` of a workload:
//!
//! - `push-back` pushes `k` elements into a fresh container.
//! - `complex` pushes `250k`, pops `150k`, shrinks to fit, clears, inserts
//!   `k` copies at the front, then erases the back half.
//!
//! Element counts are capped by the caller's `limit` so that a pool-backed
//! container never asks for more than its pool can hold.

use dynamic_array::{ArrayError, DynamicArray};
use memory_pool::Allocator;

/// Available workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Workload {
    /// Append `k` elements to an empty container.
    PushBack,
    /// Mixed push, pop, shrink, clear, insert and erase.
    Complex,
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PushBack => write!(f, "push-back"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// The container operations the workloads use.
pub trait Container {
    fn push(&mut self, v: i32) -> Result<(), ArrayError>;
    fn pop(&mut self);
    fn shrink(&mut self) -> Result<(), ArrayError>;
    fn wipe(&mut self);
    fn insert_front(&mut self, count: usize, v: i32) -> Result<(), ArrayError>;
    fn erase_back_half(&mut self) -> Result<(), ArrayError>;
    fn size(&self) -> usize;
}

impl Container for Vec<i32> {
    fn push(&mut self, v: i32) -> Result<(), ArrayError> {
        self.push(v);
        Ok(())
    }

    fn pop(&mut self) {
        self.pop();
    }

    fn shrink(&mut self) -> Result<(), ArrayError> {
        self.shrink_to_fit();
        Ok(())
    }

    fn wipe(&mut self) {
        self.clear();
    }

    fn insert_front(&mut self, count: usize, v: i32) -> Result<(), ArrayError> {
        drop(self.splice(0..0, std::iter::repeat(v).take(count)));
        Ok(())
    }

    fn erase_back_half(&mut self) -> Result<(), ArrayError> {
        self.truncate(self.len() / 2);
        Ok(())
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<A: Allocator<i32>> Container for DynamicArray<i32, A> {
    fn push(&mut self, v: i32) -> Result<(), ArrayError> {
        self.push_back(v)
    }

    fn pop(&mut self) {
        self.pop_back();
    }

    fn shrink(&mut self) -> Result<(), ArrayError> {
        self.shrink_to_fit()
    }

    fn wipe(&mut self) {
        self.clear();
    }

    fn insert_front(&mut self, count: usize, v: i32) -> Result<(), ArrayError> {
        self.insert_n(0, count, v).map(|_| ())
    }

    fn erase_back_half(&mut self) -> Result<(), ArrayError> {
        let half = self.len() / 2;
        self.erase_range(half..).map(|_| ())
    }

    fn size(&self) -> usize {
        self.len()
    }
}

/// Runs round `k` of `workload` on `c`, with every element count capped at
/// `limit`. Returns the final length, so the work cannot be optimised away.
pub fn run_round<C: Container>(
    workload: Workload,
    c: &mut C,
    k: usize,
    limit: usize,
) -> Result<usize, ArrayError> {
    match workload {
        Workload::PushBack => {
            for i in 0..k.min(limit) {
                c.push(i as i32)?;
            }
        }
        Workload::Complex => {
            for i in 0..k.saturating_mul(250).min(limit) {
                c.push(i as i32)?;
            }
            for _ in 0..k.saturating_mul(150).min(limit) {
                c.pop();
            }
            c.shrink()?;
            c.wipe();
            c.insert_front(k.min(limit), 345)?;
            c.erase_back_half()?;
        }
    }
    Ok(c.size())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_pool::{HeapAllocator, MemoryPool};

    #[test]
    fn test_push_back_round() {
        let mut v: Vec<i32> = Vec::new();
        assert_eq!(run_round(Workload::PushBack, &mut v, 10, usize::MAX).unwrap(), 10);
        let mut capped: Vec<i32> = Vec::new();
        assert_eq!(run_round(Workload::PushBack, &mut capped, 10, 4).unwrap(), 4);
    }

    #[test]
    fn test_complex_round_agrees_across_containers() {
        let pool: MemoryPool<i32> = MemoryPool::new(100_000).unwrap();

        let mut v: Vec<i32> = Vec::new();
        let mut heap: DynamicArray<i32, _> = DynamicArray::new_in(HeapAllocator::new());
        let mut pooled = DynamicArray::new_in(pool.allocator());

        let a = run_round(Workload::Complex, &mut v, 8, usize::MAX).unwrap();
        let b = run_round(Workload::Complex, &mut heap, 8, usize::MAX).unwrap();
        let c = run_round(Workload::Complex, &mut pooled, 8, usize::MAX).unwrap();

        assert_eq!(a, 4);
        assert_eq!((a, a), (b, c));
        assert_eq!(v.as_slice(), heap.as_slice());
        assert_eq!(heap, pooled);
    }

    #[test]
    fn test_workload_display() {
        assert_eq!(Workload::PushBack.to_string(), "push-back");
        assert_eq!(Workload::Complex.to_string(), "complex");
    }
}
