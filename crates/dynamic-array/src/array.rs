// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Growable contiguous array over an [`Allocator`].
//!
//! # Layout
//! ```text
//!  ptr                      ptr + len             ptr + cap
//!   ├───── live elements ──────┼──── reserved, uninit ───┤
//! ```
//!
//! # Growth
//! All capacity changes go through one primitive, `reallocate`. A request
//! at or above the current capacity is scaled by 1.5 (truncating) to leave
//! headroom; a smaller request is an explicit shrink and is used as-is.
//! Appends trigger growth one slot early, when `len + 1` would *reach* the
//! capacity rather than exceed it.
//!
//! # Panic Safety
//! Moving elements between allocations is a bitwise copy and cannot fail.
//! Element code that can panic (`Clone`, `Default`, constructor closures,
//! `Drop`) runs only while `len` covers exactly the initialised prefix, so
//! an unwinding panic never exposes uninitialised slots or drops an element
//! twice. Elements behind an open insertion gap are leaked in that case.

use crate::ArrayError;
use memory_pool::{Allocator, PoolAllocator};
use std::fmt;
use std::iter;
use std::marker::PhantomData;
use std::ops::{Bound, Deref, DerefMut, RangeBounds};
use std::ptr::{self, NonNull};
use std::slice;

/// Capacity for a growth request of `requested` elements: 1.5 × the request,
/// truncated, clamped to `max` but never below the request itself.
fn grown_capacity(requested: usize, max: usize) -> usize {
    requested
        .saturating_add(requested / 2)
        .min(max)
        .max(requested)
}

/// A growable array whose storage comes from an [`Allocator`].
///
/// The array owns at most one allocation at a time and returns it exactly
/// once, on [`clear`](Self::clear), on reallocation, or on drop.
///
/// # Example
/// ```
/// use dynamic_array::DynamicArray;
/// use memory_pool::MemoryPool;
///
/// let pool: MemoryPool<i32> = MemoryPool::new(1024).unwrap();
/// let mut arr = DynamicArray::from_slice_in(&[1, 2, 3, 4, 5], pool.allocator()).unwrap();
///
/// arr.erase(2).unwrap();
/// assert_eq!(arr, [1, 2, 4, 5]);
///
/// arr.push_back(6).unwrap();
/// assert_eq!(arr.len(), 5);
/// assert!(arr.capacity() >= 5);
/// ```
pub struct DynamicArray<T, A: Allocator<T> = PoolAllocator<T>> {
    alloc: A,
    ptr: Option<NonNull<T>>,
    len: usize,
    cap: usize,
    _marker: PhantomData<T>,
}

impl<T, A: Allocator<T>> DynamicArray<T, A> {
    // ── Construction ───────────────────────────────────────────

    /// Creates an empty array. No storage is allocated.
    pub fn new_in(alloc: A) -> Self {
        Self {
            alloc,
            ptr: None,
            len: 0,
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Creates an array of `n` default-constructed elements.
    pub fn with_len_in(n: usize, alloc: A) -> Result<Self, ArrayError>
    where
        T: Default,
    {
        let mut arr = Self::new_in(alloc);
        arr.resize_with(n, T::default)?;
        Ok(arr)
    }

    /// Creates an array of `n` clones of `value`.
    pub fn from_elem_in(n: usize, value: T, alloc: A) -> Result<Self, ArrayError>
    where
        T: Clone,
    {
        let mut arr = Self::new_in(alloc);
        arr.assign(n, value)?;
        Ok(arr)
    }

    /// Creates an array holding clones of `items`, in order.
    pub fn from_slice_in(items: &[T], alloc: A) -> Result<Self, ArrayError>
    where
        T: Clone,
    {
        let mut arr = Self::new_in(alloc);
        arr.assign_slice(items)?;
        Ok(arr)
    }

    /// Creates an array from the items of `iter`, in order.
    pub fn from_iter_in<I>(iter: I, alloc: A) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut arr = Self::new_in(alloc);
        arr.assign_iter(iter)?;
        Ok(arr)
    }

    /// Deep-copies the array into a new allocation of exactly `len()`
    /// elements from the same allocator.
    pub fn try_clone(&self) -> Result<Self, ArrayError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::new_in(self.alloc.clone());
        if self.len == 0 {
            return Ok(copy);
        }
        let ptr = copy.alloc.allocate(self.len)?;
        copy.ptr = Some(ptr);
        copy.cap = self.len;
        for item in self.iter() {
            // SAFETY: copy.len < copy.cap == self.len.
            unsafe { copy.write_at(copy.len, item.clone()) };
            copy.len += 1;
        }
        Ok(copy)
    }

    /// Moves the contents out, leaving `self` empty with no storage.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone());
        std::mem::replace(self, empty)
    }

    // ── Capacity ───────────────────────────────────────────────

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the current allocation can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the largest capacity the allocator can ever provide.
    pub fn max_size(&self) -> usize {
        self.alloc.max_size()
    }

    /// Returns the allocator backing this array.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Ensures capacity for at least `new_cap` elements. Never shrinks.
    ///
    /// Fails with [`ArrayError::LengthError`] when `new_cap` exceeds
    /// [`max_size`](Self::max_size).
    pub fn reserve(&mut self, new_cap: usize) -> Result<(), ArrayError> {
        let max = self.max_size();
        if new_cap > max {
            return Err(ArrayError::LengthError {
                requested: new_cap,
                max,
            });
        }
        if new_cap > self.cap {
            self.reallocate(new_cap)?;
        }
        Ok(())
    }

    /// Reallocates to exactly `len()` elements, releasing the storage
    /// entirely when the array is empty.
    pub fn shrink_to_fit(&mut self) -> Result<(), ArrayError> {
        if self.len < self.cap {
            self.reallocate(self.len)?;
        }
        Ok(())
    }

    /// Resizes to `new_len`, filling new slots with values from `f`.
    ///
    /// Shrinking drops the elements past `new_len` and keeps the capacity.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), ArrayError>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        if new_len > self.cap {
            self.reallocate(new_len)?;
        }
        while self.len < new_len {
            // SAFETY: len < new_len <= cap.
            unsafe { self.write_at(self.len, f()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Resizes to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<(), ArrayError>
    where
        T: Clone,
    {
        self.resize_with(new_len, || value.clone())
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize) -> Result<(), ArrayError>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Drops the elements past `new_len`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let old_len = self.len;
        self.len = new_len;
        self.destroy_range(new_len, old_len);
    }

    /// Drops every element and releases the storage, leaving the array
    /// empty with zero capacity.
    ///
    /// Unlike `erase_range(..)`, which keeps the allocation, this returns
    /// the chunk to the allocator.
    pub fn clear(&mut self) {
        self.truncate(0);
        self.release();
    }

    // ── Element access ─────────────────────────────────────────

    /// Returns the element at `index`, or [`ArrayError::OutOfRange`].
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(ArrayError::OutOfRange { index, len })
    }

    /// Returns the element at `index` mutably, or [`ArrayError::OutOfRange`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::OutOfRange { index, len })
    }

    /// Returns the first element, if any.
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Returns the first element mutably, if any.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Returns the last element, if any.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns the last element mutably, if any.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Returns a pointer to the first slot, dangling when no storage is held.
    pub fn as_ptr(&self) -> *const T {
        self.base().as_ptr()
    }

    /// Returns a mutable pointer to the first slot, dangling when no storage
    /// is held.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.base().as_ptr()
    }

    /// Views the live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialised; `base` is dangling
        // but aligned when len == 0.
        unsafe { slice::from_raw_parts(self.base().as_ptr(), self.len) }
    }

    /// Views the live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with unique access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.base().as_ptr(), self.len) }
    }

    // ── Modifiers ──────────────────────────────────────────────

    /// Appends `value`.
    pub fn push_back(&mut self, value: T) -> Result<(), ArrayError> {
        self.grow_for(1)?;
        // SAFETY: grow_for guarantees len + 1 <= cap.
        unsafe { self.write_at(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Appends the value built by `f` directly in the next slot and returns
    /// a reference to it.
    pub fn emplace_back<F>(&mut self, f: F) -> Result<&mut T, ArrayError>
    where
        F: FnOnce() -> T,
    {
        self.grow_for(1)?;
        let index = self.len;
        // SAFETY: grow_for guarantees index + 1 <= cap.
        unsafe { self.write_at(index, f()) };
        self.len += 1;
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index is initialised and is no
        // longer covered by `len`, so it is read exactly once.
        Some(unsafe { ptr::read(self.slot(self.len).as_ptr()) })
    }

    /// Inserts `value` before `index` and returns `index`.
    ///
    /// `index == len()` appends. Any reallocation invalidates pointers and
    /// references into the array.
    pub fn insert(&mut self, index: usize, value: T) -> Result<usize, ArrayError> {
        self.emplace(index, move || value)
    }

    /// Inserts the value built by `f` before `index` and returns `index`.
    pub fn emplace<F>(&mut self, index: usize, f: F) -> Result<usize, ArrayError>
    where
        F: FnOnce() -> T,
    {
        self.insert_from(index, 1, iter::once_with(f))
    }

    /// Inserts `count` clones of `value` before `index` and returns `index`.
    pub fn insert_n(&mut self, index: usize, count: usize, value: T) -> Result<usize, ArrayError>
    where
        T: Clone,
    {
        self.insert_from(index, count, iter::repeat(value).take(count))
    }

    /// Inserts clones of `items` before `index`, preserving their order, and
    /// returns `index`.
    pub fn insert_slice(&mut self, index: usize, items: &[T]) -> Result<usize, ArrayError>
    where
        T: Clone,
    {
        self.insert_from(index, items.len(), items.iter().cloned())
    }

    /// Removes the element at `index`, closing the gap, and returns the
    /// index of the element that followed it (which is `index`).
    pub fn erase(&mut self, index: usize) -> Result<usize, ArrayError> {
        if index >= self.len {
            return Err(ArrayError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.erase_range(index..index + 1)
    }

    /// Removes the elements in `range`, closing the gap, and returns the
    /// index of the element that followed the range.
    ///
    /// Capacity is unchanged, so `erase_range(..)` empties the array but
    /// keeps its storage.
    pub fn erase_range<R>(&mut self, range: R) -> Result<usize, ArrayError>
    where
        R: RangeBounds<usize>,
    {
        let (first, last) = self.resolve(range)?;
        let count = last - first;
        if count == 0 {
            return Ok(first);
        }

        let old_len = self.len;
        // Hide everything from `first` on while element destructors run.
        self.len = first;
        self.destroy_range(first, last);
        // SAFETY: [last, old_len) is initialised; moving it to `first`
        // stays inside the allocation.
        unsafe {
            ptr::copy(
                self.slot(last).as_ptr(),
                self.slot(first).as_ptr(),
                old_len - last,
            );
        }
        self.len = old_len - count;
        Ok(first)
    }

    /// Replaces the contents with `n` clones of `value`.
    pub fn assign(&mut self, n: usize, value: T) -> Result<(), ArrayError>
    where
        T: Clone,
    {
        self.truncate(0);
        self.resize(n, value)
    }

    /// Replaces the contents with clones of `items`.
    pub fn assign_slice(&mut self, items: &[T]) -> Result<(), ArrayError>
    where
        T: Clone,
    {
        self.truncate(0);
        if items.len() > self.cap {
            self.reallocate(items.len())?;
        }
        for item in items {
            // SAFETY: len < items.len() <= cap.
            unsafe { self.write_at(self.len, item.clone()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Replaces the contents with the items of `iter`.
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<(), ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        self.truncate(0);
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > self.cap {
            self.reallocate(lower)?;
        }
        for item in iter {
            self.push_back(item)?;
        }
        Ok(())
    }

    /// Replaces the contents with clones of `other`'s elements.
    pub fn assign_from<B>(&mut self, other: &DynamicArray<T, B>) -> Result<(), ArrayError>
    where
        T: Clone,
        B: Allocator<T>,
    {
        self.assign_slice(other.as_slice())
    }

    /// Exchanges contents, storage, and allocators with `other` without
    /// touching any element.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // ── Internals ──────────────────────────────────────────────

    /// The single growth/shrink primitive.
    fn reallocate(&mut self, requested: usize) -> Result<(), ArrayError> {
        let new_cap = if requested >= self.cap {
            grown_capacity(requested, self.alloc.max_size())
        } else {
            requested
        };

        if new_cap == 0 {
            self.truncate(0);
            self.release();
            return Ok(());
        }

        let new_ptr = self.alloc.allocate(new_cap).map_err(|e| {
            tracing::debug!(len = self.len, cap = self.cap, new_cap, "reallocation failed: {e}");
            ArrayError::Memory(e)
        })?;

        if Some(new_ptr) == self.ptr {
            // The allocator handed back the chunk we already own.
            self.cap = new_cap;
            return Ok(());
        }

        let keep = self.len.min(new_cap);
        self.truncate(keep);

        if let Some(old) = self.ptr {
            // SAFETY: the allocations are distinct and both hold at least
            // `keep` slots; the old slots become logically uninitialised.
            unsafe {
                ptr::copy_nonoverlapping(old.as_ptr(), new_ptr.as_ptr(), keep);
                self.alloc.deallocate(old, self.cap);
            }
        }

        tracing::debug!(len = self.len, old_cap = self.cap, new_cap, "array reallocated");
        self.ptr = Some(new_ptr);
        self.cap = new_cap;
        Ok(())
    }

    /// Grows ahead of adding `count` elements. Growth triggers as soon as
    /// `len + count` reaches the capacity.
    fn grow_for(&mut self, count: usize) -> Result<(), ArrayError> {
        let needed = self
            .len
            .checked_add(count)
            .ok_or_else(|| ArrayError::LengthError {
                requested: usize::MAX,
                max: self.max_size(),
            })?;
        if needed >= self.cap {
            self.reallocate(needed)?;
        }
        Ok(())
    }

    /// Opens a gap of `count` slots at `index` and fills it from `items`.
    ///
    /// If `items` runs dry early the unfilled part of the gap is closed
    /// again, so the array only ever grows by the number of items written.
    fn insert_from<I>(&mut self, index: usize, count: usize, items: I) -> Result<usize, ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        if index > self.len {
            return Err(ArrayError::OutOfRange {
                index,
                len: self.len,
            });
        }
        if count == 0 {
            return Ok(index);
        }
        self.grow_for(count)?;

        let old_len = self.len;
        let tail = old_len - index;
        // SAFETY: grow_for guarantees old_len + count <= cap, so the shifted
        // tail stays inside the allocation.
        unsafe {
            ptr::copy(
                self.slot(index).as_ptr(),
                self.slot(index + count).as_ptr(),
                tail,
            );
        }

        // The shifted tail is hidden until the gap is filled; a panic while
        // producing an item leaks it rather than exposing the gap.
        self.len = index;
        for (i, item) in (index..index + count).zip(items) {
            // SAFETY: slot `i` is inside the gap and uninitialised.
            unsafe { self.write_at(i, item) };
            self.len = i + 1;
        }

        let filled = self.len - index;
        if filled < count {
            // SAFETY: both ranges lie inside the allocation; the source is
            // the initialised tail moved above.
            unsafe {
                ptr::copy(
                    self.slot(index + count).as_ptr(),
                    self.slot(index + filled).as_ptr(),
                    tail,
                );
            }
        }
        self.len = old_len + filled;
        Ok(index)
    }

    fn resolve<R>(&self, range: R) -> Result<(usize, usize), ArrayError>
    where
        R: RangeBounds<usize>,
    {
        let len = self.len;
        let first = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let last = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if last > len {
            return Err(ArrayError::OutOfRange { index: last, len });
        }
        if first > last {
            return Err(ArrayError::OutOfRange { index: first, len });
        }
        Ok((first, last))
    }

    /// Destroys the elements in `[from, to)` through the allocator.
    fn destroy_range(&mut self, from: usize, to: usize) {
        for i in from..to {
            // SAFETY: callers pass a range of initialised slots that `len`
            // no longer covers.
            unsafe { self.alloc.destroy(self.slot(i)) };
        }
    }

    /// Returns the storage to the allocator. Elements must already be gone.
    fn release(&mut self) {
        debug_assert_eq!(self.len, 0);
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: `ptr` came from `allocate(self.cap)` and is released once.
            unsafe { self.alloc.deallocate(ptr, self.cap) };
        }
        self.cap = 0;
    }

    fn base(&self) -> NonNull<T> {
        self.ptr.unwrap_or(NonNull::dangling())
    }

    /// Pointer to slot `index`. Only meaningful for `index <= cap`.
    fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.cap);
        // SAFETY: index <= cap keeps the pointer within (or one past) the
        // allocation; with no allocation, index is 0.
        unsafe { NonNull::new_unchecked(self.base().as_ptr().add(index)) }
    }

    /// # Safety
    /// `index < cap` and the slot must be uninitialised.
    unsafe fn write_at(&self, index: usize, value: T) {
        self.alloc.construct(self.slot(index), value);
    }
}

impl<T, A: Allocator<T>> Drop for DynamicArray<T, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, A: Allocator<T>> Deref for DynamicArray<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator<T>> DerefMut for DynamicArray<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T, A: Allocator<T>> IntoIterator for &'a DynamicArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator<T>> IntoIterator for &'a mut DynamicArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: fmt::Debug, A: Allocator<T>> fmt::Debug for DynamicArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator<T>, B: Allocator<T>> PartialEq<DynamicArray<T, B>>
    for DynamicArray<T, A>
{
    fn eq(&self, other: &DynamicArray<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: Allocator<T>> Eq for DynamicArray<T, A> {}

impl<T: PartialEq, A: Allocator<T>> PartialEq<[T]> for DynamicArray<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: Allocator<T>, const N: usize> PartialEq<[T; N]> for DynamicArray<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

// SAFETY: the array uniquely owns its elements and allocation, like `Vec`.
unsafe impl<T: Send, A: Allocator<T> + Send> Send for DynamicArray<T, A> {}
// SAFETY: shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: Allocator<T> + Sync> Sync for DynamicArray<T, A> {}
