// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: arrays drawing from a shared pool.
//!
//! These tests run the array against a real [`MemoryPool`] and check both
//! sides of the contract: element contents and ordering on the array, and
//! chunk bookkeeping on the pool once the arrays are done with it.

use dynamic_array::{ArrayError, DynamicArray};
use memory_pool::{HeapAllocator, MemoryPool, PoolConfig};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

// ── Helpers ────────────────────────────────────────────────────

fn small_pool() -> MemoryPool<i32> {
    MemoryPool::with_name("integration", 10_000).unwrap()
}

/// Element that counts how many times it has been dropped.
#[derive(Debug, Clone)]
struct Counted {
    id: u32,
    drops: Rc<Cell<usize>>,
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn erase_middle_of_five() {
    let pool = small_pool();
    let mut arr = DynamicArray::from_slice_in(&[1, 2, 3, 4, 5], pool.allocator()).unwrap();

    let next = arr.erase(2).unwrap();

    assert_eq!(next, 2);
    assert_eq!(arr[next], 4);
    assert_eq!(arr, [1, 2, 4, 5]);
}

#[test]
fn reserve_keeps_contents() {
    let pool = small_pool();
    let mut arr = DynamicArray::from_slice_in(&[1, 2, 3, 4, 5], pool.allocator()).unwrap();

    arr.reserve(20).unwrap();

    assert_eq!(arr.len(), 5);
    assert!(arr.capacity() >= 20);
    assert_eq!(arr, [1, 2, 3, 4, 5]);
}

#[test]
fn checked_access_past_end() {
    let pool = small_pool();
    let arr = DynamicArray::from_slice_in(&[1, 2, 3, 4, 5], pool.allocator()).unwrap();

    assert_eq!(arr.at(4), Ok(&5));
    assert_eq!(arr.at(5), Err(ArrayError::OutOfRange { index: 5, len: 5 }));
    let msg = arr.at(7).unwrap_err().to_string();
    assert!(msg.contains("index 7"));
}

#[test]
fn push_then_pop_keeps_capacity() {
    let pool = small_pool();
    let mut arr = DynamicArray::new_in(pool.allocator());
    for i in 0..50 {
        arr.push_back(i).unwrap();
    }
    let cap = arr.capacity();
    let used = pool.used_elements();

    while arr.pop_back().is_some() {}

    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), cap);
    assert_eq!(pool.used_elements(), used);
}

#[test]
fn size_never_exceeds_capacity() {
    let pool = small_pool();
    let mut arr = DynamicArray::new_in(pool.allocator());

    for i in 0..200 {
        arr.push_back(i).unwrap();
        assert!(arr.len() <= arr.capacity());
        if i % 7 == 0 {
            arr.insert(arr.len() / 2, -i).unwrap();
            assert!(arr.len() <= arr.capacity());
        }
        if i % 11 == 0 {
            arr.erase(0).unwrap();
            assert!(arr.len() <= arr.capacity());
        }
    }
    arr.shrink_to_fit().unwrap();
    assert_eq!(arr.len(), arr.capacity());
}

#[test]
fn arrays_share_one_pool() {
    let pool = small_pool();
    let mut a = DynamicArray::new_in(pool.allocator());
    let mut b = DynamicArray::new_in(pool.allocator());

    for i in 0..100 {
        a.push_back(i).unwrap();
        b.push_back(i * 10).unwrap();
    }
    assert_eq!(pool.used_elements(), a.capacity() + b.capacity());
    assert!(pool.check_invariants().is_ok());

    drop(a);
    assert_eq!(pool.used_elements(), b.capacity());
    drop(b);

    assert_eq!(pool.used_elements(), 0);
    assert_eq!(pool.chunk_count(), 1);
    assert_eq!(pool.stats().invalid_frees, 0);
}

#[test]
fn array_outlives_pool_handle() {
    let arr = {
        let pool = small_pool();
        DynamicArray::from_slice_in(&[7, 8, 9], pool.allocator()).unwrap()
    };
    // The allocator handle keeps the backing region alive.
    assert_eq!(arr, [7, 8, 9]);
    assert_eq!(arr.allocator().pool_name(), "integration");
}

#[test]
fn exhausted_pool_reports_out_of_memory() {
    let pool: MemoryPool<i32> = MemoryPool::new(16).unwrap();
    let mut arr = DynamicArray::new_in(pool.allocator());

    let err = loop {
        if let Err(e) = arr.push_back(0) {
            break e;
        }
    };

    assert!(matches!(err, ArrayError::Memory(_)));
    assert!(arr.len() < 16);
    assert!(pool.stats().oom_count >= 1);
    assert!(pool.check_invariants().is_ok());
}

#[test]
fn reserve_beyond_pool_is_length_error() {
    let pool: MemoryPool<i32> = MemoryPool::new(64).unwrap();
    let mut arr = DynamicArray::new_in(pool.allocator());

    assert_eq!(arr.max_size(), 64);
    assert_eq!(
        arr.reserve(65),
        Err(ArrayError::LengthError {
            requested: 65,
            max: 64
        })
    );
    assert_eq!(arr.capacity(), 0);
}

#[test]
fn clear_versus_erase_all() {
    let pool = small_pool();
    let mut arr = DynamicArray::from_slice_in(&[1, 2, 3], pool.allocator()).unwrap();

    arr.erase_range(..).unwrap();
    assert!(arr.is_empty());
    assert!(arr.capacity() > 0);
    assert!(pool.used_elements() > 0);

    arr.clear();
    assert_eq!(arr.capacity(), 0);
    assert_eq!(pool.used_elements(), 0);
}

#[test]
fn every_element_destroyed_exactly_once() {
    let pool: MemoryPool<Counted> = MemoryPool::new(1_000).unwrap();
    let drops = Rc::new(Cell::new(0));
    let make = |id| Counted {
        id,
        drops: Rc::clone(&drops),
    };

    {
        let mut arr = DynamicArray::new_in(pool.allocator());
        for id in 0..40 {
            arr.push_back(make(id)).unwrap();
        }
        arr.insert_slice(10, &[make(100), make(101)]).unwrap();
        // The two temporaries passed by slice are clones; the originals die here.
        assert_eq!(drops.get(), 2);

        let copy = arr.try_clone().unwrap();
        assert_eq!(copy, arr);
        drop(copy);
        assert_eq!(drops.get(), 2 + 42);

        arr.erase_range(0..5).unwrap();
        arr.resize_with(30, || make(999)).unwrap();
        arr.reserve(500).unwrap();
        assert_eq!(drops.get(), 2 + 42 + 5 + 7);
    }

    assert_eq!(drops.get(), 2 + 42 + 5 + 7 + 30);
    assert_eq!(pool.used_elements(), 0);
}

#[test]
fn assign_from_heap_backed_array() {
    let pool = small_pool();
    let heap = DynamicArray::from_slice_in(&[4, 5, 6], HeapAllocator::new()).unwrap();
    let mut pooled = DynamicArray::from_elem_in(10, 0, pool.allocator()).unwrap();

    pooled.assign_from(&heap).unwrap();

    assert_eq!(pooled, heap);
    assert_eq!(pooled.len(), 3);
}

#[test]
fn pool_built_from_config() {
    let config = PoolConfig::from_toml("name = \"arrays\"\ncapacity = \"4K\"\n").unwrap();
    let pool: MemoryPool<u16> = config.build().unwrap();
    let mut arr = DynamicArray::new_in(pool.allocator());

    arr.resize(1_000, 3).unwrap();

    assert_eq!(pool.capacity(), 4_000);
    assert_eq!(arr.iter().map(|&x| x as u32).sum::<u32>(), 3_000);
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_insert_then_erase_roundtrip(
        items in prop::collection::vec(any::<i32>(), 0..100),
        pos in any::<prop::sample::Index>(),
        value in any::<i32>(),
    ) {
        let pool = small_pool();
        let mut arr = DynamicArray::from_slice_in(&items, pool.allocator()).unwrap();
        let index = pos.index(items.len() + 1);

        let at = arr.insert(index, value).unwrap();
        prop_assert_eq!(at, index);
        prop_assert_eq!(arr[index], value);
        prop_assert_eq!(arr.len(), items.len() + 1);

        arr.erase(index).unwrap();
        prop_assert_eq!(arr.as_slice(), items.as_slice());
    }

    #[test]
    fn prop_matches_vec_model(ops in prop::collection::vec((0u8..5, any::<i16>()), 0..300)) {
        let pool: MemoryPool<i16> = MemoryPool::new(20_000).unwrap();
        let mut arr = DynamicArray::new_in(pool.allocator());
        let mut model: Vec<i16> = Vec::new();

        for (op, v) in ops {
            match op {
                0 | 1 => {
                    arr.push_back(v).unwrap();
                    model.push(v);
                }
                2 => {
                    prop_assert_eq!(arr.pop_back(), model.pop());
                }
                3 => {
                    let i = v.unsigned_abs() as usize % (model.len() + 1);
                    arr.insert(i, v).unwrap();
                    model.insert(i, v);
                }
                _ if !model.is_empty() => {
                    let i = v.unsigned_abs() as usize % model.len();
                    arr.erase(i).unwrap();
                    model.remove(i);
                }
                _ => {}
            }
            prop_assert!(arr.len() <= arr.capacity());
        }

        prop_assert_eq!(arr.as_slice(), model.as_slice());
        drop(arr);
        prop_assert_eq!(pool.used_elements(), 0);
    }
}
