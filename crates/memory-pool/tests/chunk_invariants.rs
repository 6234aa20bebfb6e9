// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: chunk-list invariants under arbitrary workloads.
//!
//! The pool must keep its chunks an exact, ordered partition of the backing
//! region with no two free chunks adjacent, whatever sequence of allocations
//! and frees it sees.

use memory_pool::{Allocator, Chunk, MemoryError, MemoryPool};
use proptest::prelude::*;
use std::ptr::NonNull;

const POOL_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    /// Free the live allocation at this index (modulo the live count).
    Free(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..64).prop_map(Op::Allocate),
        2 => any::<usize>().prop_map(Op::Free),
    ]
}

fn assert_partition(pool: &MemoryPool<u64>) {
    let chunks = pool.chunks();
    let total: usize = chunks.iter().map(|c| c.len).sum();
    assert_eq!(total, POOL_CAPACITY);
    assert!(chunks.windows(2).all(|w| !(w[0].free && w[1].free)));
    assert!(pool.check_invariants().is_ok());
}

proptest! {
    #[test]
    fn prop_chunks_partition_pool(ops in prop::collection::vec(arb_op(), 1..200)) {
        let pool: MemoryPool<u64> = MemoryPool::new(POOL_CAPACITY).unwrap();
        let mut live: Vec<(NonNull<u64>, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(n) => {
                    if let Ok(p) = pool.allocate(n) {
                        live.push((p, n));
                    }
                }
                Op::Free(i) if !live.is_empty() => {
                    let (p, n) = live.swap_remove(i % live.len());
                    prop_assert!(pool.deallocate(p, n).is_ok());
                }
                Op::Free(_) => {}
            }

            let used: usize = live.iter().map(|&(_, n)| n).sum();
            prop_assert_eq!(pool.used_elements(), used);
            assert_partition(&pool);
        }

        for (p, n) in live.drain(..) {
            prop_assert!(pool.deallocate(p, n).is_ok());
        }
        prop_assert_eq!(pool.chunks(), vec![Chunk { start: 0, len: POOL_CAPACITY, free: true }]);
    }

    #[test]
    fn prop_allocate_then_free_restores_layout(
        setup in prop::collection::vec(1usize..64, 0..12),
        free_mask in prop::collection::vec(any::<bool>(), 12),
        n in 1usize..64,
    ) {
        let pool: MemoryPool<u64> = MemoryPool::new(POOL_CAPACITY).unwrap();
        let mut live = Vec::new();
        for len in setup {
            if let Ok(p) = pool.allocate(len) {
                live.push((p, len));
            }
        }
        for (i, (p, len)) in live.iter().enumerate() {
            if free_mask[i] {
                pool.deallocate(*p, *len).unwrap();
            }
        }

        let before = pool.chunks();
        if let Ok(p) = pool.allocate(n) {
            pool.deallocate(p, n).unwrap();
        }
        prop_assert_eq!(pool.chunks(), before);
    }
}

#[test]
fn reference_scenario_two_adjacent_allocations_coalesce() {
    let pool: MemoryPool<i32> = MemoryPool::new(100_000_000).unwrap();
    let alloc = pool.allocator();

    let a = alloc.allocate(5).unwrap();
    let b = alloc.allocate(3).unwrap();
    assert_eq!(unsafe { a.as_ptr().add(5) }, b.as_ptr());

    unsafe {
        alloc.deallocate(a, 5);
        alloc.deallocate(b, 3);
    }
    assert_eq!(
        pool.chunks(),
        vec![Chunk {
            start: 0,
            len: 100_000_000,
            free: true
        }]
    );
}

#[test]
fn fragmentation_is_observable() {
    let pool: MemoryPool<u64> = MemoryPool::new(40).unwrap();
    let ptrs: Vec<_> = (0..4).map(|_| pool.allocate(10).unwrap()).collect();

    // Free every other block: 20 elements free, but never more than 10 in a row.
    pool.deallocate(ptrs[0], 10).unwrap();
    pool.deallocate(ptrs[2], 10).unwrap();
    assert_eq!(pool.free_elements(), 20);

    match pool.allocate(11) {
        Err(MemoryError::OutOfMemory {
            requested,
            largest_free,
            free_total,
        }) => {
            assert_eq!(requested, 11);
            assert_eq!(largest_free, 10);
            assert_eq!(free_total, 20);
        }
        other => panic!("expected OutOfMemory, got {other:?}"),
    }

    // Exactly-sized requests still reuse the holes.
    let hole = pool.allocate(10).unwrap();
    assert_eq!(pool.stats().exact_fits, 2);
    pool.deallocate(hole, 10).unwrap();
}

#[test]
fn exhausting_the_pool() {
    let pool: MemoryPool<u8> = MemoryPool::new(8).unwrap();
    let all = pool.allocate(8).unwrap();
    assert_eq!(pool.free_elements(), 0);
    assert!(matches!(pool.allocate(1), Err(MemoryError::OutOfMemory { .. })));
    assert!(matches!(pool.allocate(9), Err(MemoryError::OutOfMemory { .. })));
    pool.deallocate(all, 8).unwrap();
    assert_eq!(pool.largest_free_chunk(), 8);
}
