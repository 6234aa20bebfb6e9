// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocator capability consumed by containers.
//!
//! [`Allocator`] is the narrow contract a container needs: reserve and
//! return contiguous element ranges, and construct or destroy one element in
//! place. Two implementations ship with the crate:
//!
//! - [`PoolAllocator`] sub-allocates from a [`MemoryPool`].
//! - [`HeapAllocator`] forwards to the global heap, as a baseline.
//!
//! [`MemoryPool`]: crate::MemoryPool

use crate::pool::PoolInner;
use crate::{MemoryError, PoolStats};
use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::rc::Rc;

/// Storage provider for containers of `T`.
pub trait Allocator<T> {
    /// Reserves `n` contiguous, uninitialised elements.
    fn allocate(&self, n: usize) -> Result<NonNull<T>, MemoryError>;

    /// Returns storage obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate(n)` on this allocator or
    /// one equal to it, and must not have been deallocated since. Elements
    /// still live in the range are not dropped.
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize);

    /// Initialises the slot at `ptr` with `value`.
    ///
    /// # Safety
    /// `ptr` must point at an uninitialised slot inside a live allocation.
    unsafe fn construct(&self, ptr: NonNull<T>, value: T) {
        ptr.as_ptr().write(value);
    }

    /// Drops the element at `ptr` in place, leaving the slot uninitialised.
    ///
    /// # Safety
    /// `ptr` must point at an initialised element inside a live allocation.
    unsafe fn destroy(&self, ptr: NonNull<T>) {
        ptr::drop_in_place(ptr.as_ptr());
    }

    /// Returns the largest number of elements a single allocation can hold.
    fn max_size(&self) -> usize;
}

/// Allocator handle bound to one [`MemoryPool`](crate::MemoryPool).
///
/// Handles are cheap to clone and keep the pool's backing region alive.
/// Two handles compare equal when they are bound to the same pool, so
/// storage allocated through one may be returned through the other.
///
/// Deallocating a `(pointer, length)` pair that matches no used chunk is
/// ignored, logged at `warn` level, and counted in
/// [`PoolStats::invalid_frees`]. Use
/// [`MemoryPool::deallocate`](crate::MemoryPool::deallocate) for the strict
/// form that reports the error.
pub struct PoolAllocator<T> {
    pool: Rc<PoolInner<T>>,
}

impl<T> PoolAllocator<T> {
    pub(crate) fn from_inner(pool: Rc<PoolInner<T>>) -> Self {
        Self { pool }
    }

    /// Returns the name of the pool this allocator draws from.
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }

    /// Returns a snapshot of the underlying pool's statistics.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats_snapshot()
    }
}

impl<T> Allocator<T> for PoolAllocator<T> {
    fn allocate(&self, n: usize) -> Result<NonNull<T>, MemoryError> {
        self.pool.allocate(n)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        if let Err(e) = self.pool.deallocate(ptr, n) {
            tracing::warn!(pool = %self.pool.name(), error = %e, "ignoring deallocation");
        }
    }

    fn max_size(&self) -> usize {
        self.pool.capacity()
    }
}

impl<T> Clone for PoolAllocator<T> {
    fn clone(&self) -> Self {
        Self {
            pool: Rc::clone(&self.pool),
        }
    }
}

impl<T> PartialEq for PoolAllocator<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.pool, &other.pool)
    }
}

impl<T> Eq for PoolAllocator<T> {}

impl<T> fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("pool", &self.pool.name())
            .field("max_size", &self.pool.capacity())
            .finish()
    }
}

/// Allocator that forwards every request to the global heap.
///
/// All instances are interchangeable and compare equal.
pub struct HeapAllocator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> HeapAllocator<T> {
    /// Creates a heap allocator.
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Allocator<T> for HeapAllocator<T> {
    fn allocate(&self, n: usize) -> Result<NonNull<T>, MemoryError> {
        if std::mem::size_of::<T>() == 0 {
            return Err(MemoryError::ZeroSizedElement);
        }
        if n == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        let oom = MemoryError::OutOfMemory {
            requested: n,
            largest_free: 0,
            free_total: 0,
        };
        let layout = Layout::array::<T>(n).map_err(|_| oom.clone())?;
        // SAFETY: `layout` has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or(oom)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // The layout was validated when the storage was allocated.
        if let Ok(layout) = Layout::array::<T>(n) {
            alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout);
        }
    }

    fn max_size(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => 0,
            size => isize::MAX as usize / size,
        }
    }
}

impl<T> Default for HeapAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for HeapAllocator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HeapAllocator<T> {}

impl<T> PartialEq for HeapAllocator<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Eq for HeapAllocator<T> {}

impl<T> fmt::Debug for HeapAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HeapAllocator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryPool;
    use std::cell::Cell;
    use std::rc::Rc as StdRc;

    struct DropCounter(StdRc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_pool_allocator_equality() {
        let pool: MemoryPool<u32> = MemoryPool::new(16).unwrap();
        let other: MemoryPool<u32> = MemoryPool::new(16).unwrap();

        let a = pool.allocator();
        let b = pool.allocator();
        assert_eq!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a, other.allocator());
    }

    #[test]
    fn test_max_size_is_pool_capacity() {
        let pool: MemoryPool<u64> = MemoryPool::new(1234).unwrap();
        assert_eq!(pool.allocator().max_size(), 1234);
    }

    #[test]
    fn test_construct_and_destroy() {
        let pool: MemoryPool<DropCounter> = MemoryPool::new(4).unwrap();
        let alloc = pool.allocator();
        let drops = StdRc::new(Cell::new(0));

        let p = alloc.allocate(1).unwrap();
        unsafe {
            alloc.construct(p, DropCounter(StdRc::clone(&drops)));
            assert_eq!(drops.get(), 0);
            alloc.destroy(p);
            alloc.deallocate(p, 1);
        }
        assert_eq!(drops.get(), 1);
        // Bookkeeping is untouched by construct/destroy.
        assert_eq!(pool.used_elements(), 0);
    }

    #[test]
    fn test_mismatched_deallocate_is_ignored() {
        let pool: MemoryPool<u32> = MemoryPool::new(16).unwrap();
        let alloc = pool.allocator();

        let p = alloc.allocate(4).unwrap();
        unsafe { alloc.deallocate(p, 3) };
        assert_eq!(pool.used_elements(), 4);
        assert_eq!(alloc.pool_stats().invalid_frees, 1);

        unsafe { alloc.deallocate(p, 4) };
        assert_eq!(pool.used_elements(), 0);
    }

    #[test]
    fn test_heap_allocator_roundtrip() {
        let alloc = HeapAllocator::<u64>::new();
        let p = alloc.allocate(8).unwrap();
        unsafe {
            for i in 0..8 {
                alloc.construct(NonNull::new_unchecked(p.as_ptr().add(i)), i as u64);
            }
            assert_eq!(*p.as_ptr().add(7), 7);
            alloc.deallocate(p, 8);
        }
        assert_eq!(alloc, HeapAllocator::default());
    }

    #[test]
    fn test_heap_allocator_errors() {
        let alloc = HeapAllocator::<u32>::new();
        assert_eq!(alloc.allocate(0), Err(MemoryError::ZeroSizedAllocation));
        assert!(matches!(
            alloc.allocate(usize::MAX),
            Err(MemoryError::OutOfMemory { .. })
        ));
        assert_eq!(alloc.max_size(), isize::MAX as usize / 4);
        assert_eq!(HeapAllocator::<()>::new().allocate(1), Err(MemoryError::ZeroSizedElement));
    }
}
