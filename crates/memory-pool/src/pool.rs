// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-capacity memory pool for elements of a single type.
//!
//! The [`MemoryPool`] reserves one contiguous region of `capacity` elements
//! when it is created and never grows it. It:
//!
//! 1. Sub-allocates contiguous element ranges with a first-fit search over
//!    an ordered chunk list. Requests no single free chunk can hold return
//!    `Err(OutOfMemory)`, even when the free total would suffice.
//! 2. Coalesces every freed range with its free neighbours.
//! 3. Tracks allocation statistics for profiling.
//!
//! # Ownership
//! The pool is a handle: the region lives in a reference-counted
//! `PoolInner`, shared with every [`PoolAllocator`] created from the pool.
//! The region is released when the last handle is dropped.
//!
//! # Thread Safety
//! `MemoryPool` is neither `Send` nor `Sync`. Chunk bookkeeping sits behind
//! a `RefCell` with no locking; share a pool between threads only by moving
//! all of its users behind one external lock.

use crate::chunk::{ChunkList, Fit};
use crate::{Chunk, MemoryError, PoolAllocator, PoolStats};
use std::alloc::{self, Layout};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::rc::Rc;

/// Internal pool state, shared between the pool and its allocators via `Rc`.
pub(crate) struct PoolInner<T> {
    name: String,
    /// Start of the backing region.
    base: NonNull<T>,
    /// Layout the backing region was allocated with.
    layout: Layout,
    /// Capacity in elements.
    capacity: usize,
    chunks: RefCell<ChunkList>,
    stats: RefCell<PoolStats>,
    _marker: PhantomData<T>,
}

impl<T> PoolInner<T> {
    fn new(name: String, capacity: usize) -> Result<Self, MemoryError> {
        if capacity == 0 {
            return Err(MemoryError::ZeroCapacity);
        }
        if std::mem::size_of::<T>() == 0 {
            return Err(MemoryError::ZeroSizedElement);
        }

        let layout = Layout::array::<T>(capacity).map_err(|_| {
            MemoryError::InvalidCapacity(format!(
                "{capacity} elements of {} bytes exceed the address space",
                std::mem::size_of::<T>()
            ))
        })?;

        // SAFETY: `layout` has non-zero size (capacity > 0, T not zero-sized).
        let raw = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(raw.cast::<T>()).ok_or(MemoryError::OutOfMemory {
            requested: capacity,
            largest_free: 0,
            free_total: 0,
        })?;

        Ok(Self {
            name,
            base,
            layout,
            capacity,
            chunks: RefCell::new(ChunkList::new(capacity)),
            stats: RefCell::new(PoolStats::default()),
            _marker: PhantomData,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn stats_snapshot(&self) -> PoolStats {
        self.stats.borrow().clone()
    }

    pub(crate) fn allocate(&self, len: usize) -> Result<NonNull<T>, MemoryError> {
        if len == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }

        let mut chunks = self.chunks.borrow_mut();
        let mut stats = self.stats.borrow_mut();

        match chunks.allocate(len) {
            Some((start, fit)) => {
                match fit {
                    Fit::Exact => stats.record_exact_fit(len),
                    Fit::Split => stats.record_split(len),
                }
                stats.update_peak(chunks.used_elements());
                Ok(self.pointer_at(start))
            }
            None => {
                stats.record_oom();
                let err = MemoryError::OutOfMemory {
                    requested: len,
                    largest_free: chunks.largest_free(),
                    free_total: chunks.free_elements(),
                };
                tracing::debug!(pool = %self.name, chunks = chunks.len(), "{err}");
                Err(err)
            }
        }
    }

    pub(crate) fn deallocate(&self, ptr: NonNull<T>, len: usize) -> Result<(), MemoryError> {
        let offset = self.offset_of(ptr);
        let merged = offset.and_then(|start| self.chunks.borrow_mut().deallocate(start, len));

        let mut stats = self.stats.borrow_mut();
        match merged {
            Some(merges) => {
                stats.record_deallocation(merges);
                Ok(())
            }
            None => {
                stats.record_invalid_free();
                Err(MemoryError::InvalidFree {
                    offset: offset.unwrap_or(usize::MAX),
                    len,
                })
            }
        }
    }

    fn pointer_at(&self, offset: usize) -> NonNull<T> {
        debug_assert!(offset < self.capacity);
        // SAFETY: `offset` lies inside the backing region, so the result is
        // in bounds of the same allocation and non-null.
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) }
    }

    /// Maps a pointer back to its element offset, if it points at an element
    /// boundary inside the backing region.
    fn offset_of(&self, ptr: NonNull<T>) -> Option<usize> {
        let size = std::mem::size_of::<T>();
        let delta = (ptr.as_ptr() as usize).checked_sub(self.base.as_ptr() as usize)?;
        if delta % size != 0 {
            return None;
        }
        let offset = delta / size;
        (offset < self.capacity).then_some(offset)
    }
}

impl<T> Drop for PoolInner<T> {
    fn drop(&mut self) {
        let used = self.chunks.get_mut().used_elements();
        if used > 0 {
            tracing::warn!(
                pool = %self.name,
                used,
                "pool dropped while elements are still allocated"
            );
        }
        // SAFETY: `base` was returned by `alloc::alloc(self.layout)`.
        unsafe { alloc::dealloc(self.base.as_ptr().cast::<u8>(), self.layout) }
    }
}

/// A fixed-capacity pool of `T` slots.
///
/// # Example
/// ```
/// use memory_pool::MemoryPool;
///
/// let pool: MemoryPool<u32> = MemoryPool::new(1024).unwrap();
///
/// let a = pool.allocate(5).unwrap();
/// let b = pool.allocate(3).unwrap();
/// assert_eq!(pool.used_elements(), 8);
///
/// pool.deallocate(a, 5).unwrap();
/// pool.deallocate(b, 3).unwrap();
/// assert_eq!(pool.chunk_count(), 1);
/// ```
pub struct MemoryPool<T> {
    inner: Rc<PoolInner<T>>,
}

impl<T> MemoryPool<T> {
    /// Creates a pool holding `capacity` elements.
    pub fn new(capacity: usize) -> Result<Self, MemoryError> {
        Self::with_name(std::any::type_name::<T>(), capacity)
    }

    /// Creates a pool with a diagnostic name used in log events.
    pub fn with_name(name: impl Into<String>, capacity: usize) -> Result<Self, MemoryError> {
        let inner = PoolInner::new(name.into(), capacity)?;
        tracing::info!(
            pool = %inner.name,
            capacity,
            bytes = inner.layout.size(),
            "memory pool created"
        );
        Ok(Self {
            inner: Rc::new(inner),
        })
    }

    /// Reserves `len` contiguous, uninitialised elements.
    ///
    /// Returns `Err(OutOfMemory)` when no single free chunk holds `len`
    /// elements and `Err(ZeroSizedAllocation)` when `len` is zero.
    pub fn allocate(&self, len: usize) -> Result<NonNull<T>, MemoryError> {
        self.inner.allocate(len)
    }

    /// Returns a range obtained from [`allocate`](Self::allocate).
    ///
    /// `len` must be the length that was requested. A pair that matches no
    /// used chunk is rejected with `Err(InvalidFree)` and changes nothing.
    /// Elements still live in the range are not dropped.
    pub fn deallocate(&self, ptr: NonNull<T>, len: usize) -> Result<(), MemoryError> {
        self.inner.deallocate(ptr, len)
    }

    /// Returns a new allocator bound to this pool.
    pub fn allocator(&self) -> PoolAllocator<T> {
        PoolAllocator::from_inner(Rc::clone(&self.inner))
    }

    /// Returns the diagnostic name of the pool.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the fixed capacity in elements.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Returns the number of elements held by used chunks.
    pub fn used_elements(&self) -> usize {
        self.inner.chunks.borrow().used_elements()
    }

    /// Returns the number of elements in free chunks.
    pub fn free_elements(&self) -> usize {
        self.inner.chunks.borrow().free_elements()
    }

    /// Returns the length of the largest free chunk, which bounds the
    /// largest request that can currently succeed.
    pub fn largest_free_chunk(&self) -> usize {
        self.inner.chunks.borrow().largest_free()
    }

    /// Returns the number of chunks, free and used.
    pub fn chunk_count(&self) -> usize {
        self.inner.chunks.borrow().len()
    }

    /// Returns a snapshot of the chunk list in address order.
    pub fn chunks(&self) -> Vec<Chunk> {
        self.inner.chunks.borrow().as_slice().to_vec()
    }

    /// Returns the element offset of `ptr` from the start of the region, or
    /// `None` if it does not point at an element of this pool.
    pub fn offset_of(&self, ptr: NonNull<T>) -> Option<usize> {
        self.inner.offset_of(ptr)
    }

    /// Verifies the chunk list invariants.
    pub fn check_invariants(&self) -> Result<(), MemoryError> {
        self.inner
            .chunks
            .borrow()
            .check_invariants()
            .map_err(MemoryError::PoolCorruption)
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> PoolStats {
        self.inner.stats_snapshot()
    }
}

impl<T> fmt::Debug for MemoryPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPool")
            .field("name", &self.name())
            .field("capacity", &self.capacity())
            .field("used_elements", &self.used_elements())
            .field("chunks", &self.chunk_count())
            .finish()
    }
}
