use core::{
    any::type_name,
    cmp,
    convert::Infallible,
    fmt,
    hash::{Hash, Hasher},
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut},
    ptr, slice,
};

use log::trace;

use crate::{
    constants::{GROWTH_FACTOR, MIN_NON_ZERO_CAPACITY},
    error::{AllocError, EmplaceError},
    raw::RawBuffer,
    traits::{Allocator, Global},
};

use super::{guard::construct_n, iter::IntoIter};

/// A contiguous growable array.
///
/// Elements live in a single [`RawBuffer`]. Slots `[0, len)` hold live values and the rest of the
/// buffer is uninitialized. When an insertion finds the buffer full, the array allocates a new
/// buffer of twice the capacity, moves every element over, and releases the old one.
///
/// Every operation that may allocate returns `Result`. On `Err` the array is left as it was.
///
/// Element constructors can fail too, either by returning `Err` from the closure passed to a
/// `try_*` operation or by panicking. Either way, the values built by the failed call are dropped
/// and nothing leaks.
pub struct DynamicArray<T, A: Allocator = Global> {
    buf: RawBuffer<T, A>,
    len: usize,
}

/// Moves `count` values from `src` to `dst`, leaving the source slots logically uninitialized.
///
/// ## Safety
///
/// - `src` must point to `count` live values, `dst` to `count` free slots.
/// - The ranges must not overlap.
#[inline]
unsafe fn relocate<T>(src: *const T, dst: *mut T, count: usize) {
    // SAFETY: upheld by caller
    unsafe { ptr::copy_nonoverlapping(src, dst, count) }
}

impl<T> DynamicArray<T> {
    /// Constructs a new, empty `DynamicArray<T>`.
    ///
    /// The array does not allocate until elements are inserted.
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Constructs an empty array with room for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, Global)
    }

    /// Constructs an array of `len` default values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn with_len(len: usize) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::with_len_in(len, Global)
    }

    /// Constructs an array of `len` values, calling `f` with the index of each.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated or `f` fails. The values built before the
    /// failure are dropped.
    pub fn try_from_fn<E, F>(len: usize, f: F) -> Result<Self, EmplaceError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_from_fn_in(len, f, Global)
    }

    /// Constructs an array holding clones of the elements of `source`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn from_slice(source: &[T]) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::from_slice_in(source, Global)
    }
}

impl<T, A: Allocator> DynamicArray<T, A> {
    /// Constructs a new, empty array that will allocate from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buf: RawBuffer::new_in(alloc),
            len: 0,
        }
    }

    /// Constructs an empty array with room for exactly `capacity` elements, allocated from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocError> {
        Ok(Self {
            buf: RawBuffer::with_capacity_in(capacity, alloc)?,
            len: 0,
        })
    }

    /// Constructs an array of `len` default values, allocated from `alloc`.
    ///
    /// The capacity is exactly `len`. If `T::default` panics, the values built so far are dropped
    /// and the buffer is released.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn with_len_in(len: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::try_from_fn_in(len, |_| Ok::<T, Infallible>(T::default()), alloc)
            .map_err(AllocError::from)
    }

    /// Constructs an array of `len` values allocated from `alloc`, calling `f` with the index of
    /// each.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated or `f` fails. The values built before the
    /// failure are dropped and the buffer is released.
    pub fn try_from_fn_in<E, F>(len: usize, f: F, alloc: A) -> Result<Self, EmplaceError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let mut buf: RawBuffer<T, A> = RawBuffer::with_capacity_in(len, alloc)?;
        // SAFETY: the fresh buffer has `len` free slots
        unsafe { construct_n(buf.as_mut_ptr(), len, f) }.map_err(EmplaceError::Element)?;
        Ok(Self { buf, len })
    }

    /// Constructs an array holding clones of the elements of `source`, allocated from `alloc`.
    ///
    /// The capacity is exactly `source.len()`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn from_slice_in(source: &[T], alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::try_from_fn_in(
            source.len(),
            |i| Ok::<T, Infallible>(source[i].clone()),
            alloc,
        )
        .map_err(AllocError::from)
    }

    /// Returns the number of elements in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns a raw pointer to the first element.
    ///
    /// The pointer is dangling if the array has not allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a raw mutable pointer to the first element.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Extracts a slice of the live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is live
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice of the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `[0, len)` is live
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Exchanges the storage and length of two arrays.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Drops the elements past `len`, keeping the capacity.
    ///
    /// Does nothing if `len` is not less than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(self.buf.slot_mut(len), self.len - len);
        // shrink first so a panicking destructor cannot cause a double drop
        self.len = len;
        // SAFETY: the tail was live and is no longer covered by `len`
        unsafe { ptr::drop_in_place(tail) }
    }

    /// Drops every element, keeping the capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes and returns the element at `index`, shifting the following elements down.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");
        // SAFETY: `index < len`, so the slot is live and the suffix `(index, len)` fits one slot
        // lower
        unsafe {
            let hole = self.buf.slot_mut(index);
            let value = hole.read();
            ptr::copy(hole.add(1), hole, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Removes and returns the element at `index`, replacing it with the last element.
    ///
    /// Does not preserve ordering, but is O(1).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "swap_remove index (is {index}) should be < len (is {len})");
        // SAFETY: both `index` and `len - 1` are live; the last slot is vacated afterwards
        unsafe {
            let value = self.buf.slot(index).read();
            let last = self.buf.slot(len - 1);
            ptr::copy(last, self.buf.slot_mut(index), 1);
            self.len = len - 1;
            value
        }
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is no longer covered by `len`
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Returns the capacity a full array grows to.
    fn grown_capacity(&self) -> Result<usize, AllocError> {
        match self.capacity() {
            0 => Ok(MIN_NON_ZERO_CAPACITY),
            capacity => capacity
                .checked_mul(GROWTH_FACTOR)
                .ok_or(AllocError::CapacityOverflow {
                    capacity: capacity.saturating_mul(GROWTH_FACTOR),
                }),
        }
    }
}

impl<T, A: Allocator + Clone> DynamicArray<T, A> {
    /// Moves the contents out into a new array, leaving `self` empty with no capacity.
    pub fn take(&mut self) -> Self {
        let empty = Self::new_in(self.allocator().clone());
        mem::replace(self, empty)
    }

    /// Ensures the array can hold at least `new_capacity` elements.
    ///
    /// Unlike [`Vec::reserve`], the argument is the total capacity, not an additional amount.
    /// If the capacity is already sufficient, nothing happens. Otherwise a buffer of exactly
    /// `new_capacity` slots replaces the current one and all element addresses change.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated. The array is unchanged.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let new_buf = RawBuffer::with_capacity_in(new_capacity, self.allocator().clone())?;
        self.adopt(new_buf);
        Ok(())
    }

    /// Shrinks the capacity to the length.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the smaller buffer cannot be allocated. The array is unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<(), AllocError> {
        if self.capacity() > self.len {
            let new_buf = RawBuffer::with_capacity_in(self.len, self.allocator().clone())?;
            self.adopt(new_buf);
        }
        Ok(())
    }

    /// Moves every element into `new_buf` and releases the current buffer.
    fn adopt(&mut self, mut new_buf: RawBuffer<T, A>) {
        debug_assert!(new_buf.capacity() >= self.len);
        trace!(
            "relocating {} elements of `{}` from {} to {} slots",
            self.len,
            type_name::<T>(),
            self.capacity(),
            new_buf.capacity()
        );
        // SAFETY: `[0, len)` is live in the old buffer and free in the new one
        unsafe { relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), self.len) };
        self.buf.swap(&mut new_buf);
        // `new_buf` now owns the old memory, whose values were moved out
    }

    /// Grows geometrically until at least `required` elements fit.
    fn reserve_for(&mut self, required: usize) -> Result<(), AllocError> {
        if required <= self.capacity() {
            return Ok(());
        }
        let grown = self.grown_capacity().unwrap_or(required);
        self.reserve(cmp::max(required, grown))
    }

    /// Constructs an element at `index` with `f`, shifting the following elements up.
    ///
    /// `index == len` appends. If the array is full, a buffer of twice the capacity is allocated,
    /// the new element is constructed into its final slot, and the existing elements are moved
    /// around it. Otherwise the new element is constructed before any element is shifted.
    ///
    /// Returns a reference to the new element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated, or if `f` fails. The
    /// array is unchanged in both cases.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`. If `f` panics, the array is unchanged.
    pub fn try_emplace<E, F>(&mut self, index: usize, f: F) -> Result<&mut T, EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let len = self.len;
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");

        if len == self.capacity() {
            let new_capacity = self.grown_capacity()?;
            let mut new_buf: RawBuffer<T, A> =
                RawBuffer::with_capacity_in(new_capacity, self.allocator().clone())?;
            let value = f().map_err(EmplaceError::Element)?;
            trace!(
                "growing `{}` from {} to {} slots",
                type_name::<T>(),
                self.capacity(),
                new_capacity
            );
            // SAFETY: `new_buf` has `len + 1` free slots; the prefix and the suffix are moved to
            // either side of the new element
            unsafe {
                new_buf.slot_mut(index).write(value);
                relocate(self.buf.slot(0), new_buf.slot_mut(0), index);
                relocate(self.buf.slot(index), new_buf.slot_mut(index + 1), len - index);
            }
            self.buf.swap(&mut new_buf);
        } else if index == len {
            let value = f().map_err(EmplaceError::Element)?;
            // SAFETY: `len < capacity`, so the tail slot is free
            unsafe { self.buf.slot_mut(len).write(value) };
        } else {
            let value = f().map_err(EmplaceError::Element)?;
            // SAFETY: `len < capacity`, so `[index, len)` fits one slot higher
            unsafe {
                let hole = self.buf.slot_mut(index);
                ptr::copy(hole, hole.add(1), len - index);
                hole.write(value);
            }
        }

        self.len = len + 1;
        // SAFETY: initialized above
        Ok(unsafe { &mut *self.buf.slot_mut(index) })
    }

    /// Constructs an element at `index` with `f`, shifting the following elements up.
    ///
    /// See [`try_emplace`](DynamicArray::try_emplace).
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace<F>(&mut self, index: usize, f: F) -> Result<&mut T, AllocError>
    where
        F: FnOnce() -> T,
    {
        self.try_emplace(index, || Ok::<T, Infallible>(f()))
            .map_err(AllocError::from)
    }

    /// Inserts `value` at `index`, shifting the following elements up.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated. `value` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[inline]
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T, AllocError> {
        self.emplace(index, || value)
    }

    /// Appends `value` to the back of the array.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated. `value` is dropped.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<&mut T, AllocError> {
        let len = self.len;
        self.emplace(len, || value)
    }

    /// Constructs an element at the back of the array with `f`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated.
    #[inline]
    pub fn emplace_back<F>(&mut self, f: F) -> Result<&mut T, AllocError>
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        self.emplace(len, f)
    }

    /// Constructs an element at the back of the array with a fallible `f`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated, or if `f` fails.
    #[inline]
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let len = self.len;
        self.try_emplace(len, f)
    }

    /// Resizes the array to `new_len`, constructing new elements with `f`.
    ///
    /// Reserves exactly `new_len` slots if the array must grow.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be grown, or if `f` fails. On a failure of `f` the
    /// elements constructed by this call are dropped and the length is unchanged; a reservation
    /// made before the failure is kept.
    pub fn try_resize_with<E, F>(&mut self, new_len: usize, mut f: F) -> Result<(), EmplaceError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        let len = self.len;
        if new_len > len {
            self.reserve(new_len)?;
            // SAFETY: `reserve` made room for `new_len` values and `[len, new_len)` is free
            unsafe { construct_n(self.buf.slot_mut(len), new_len - len, |_| f()) }
                .map_err(EmplaceError::Element)?;
            self.len = new_len;
        } else {
            self.truncate(new_len);
        }
        Ok(())
    }

    /// Resizes the array to `new_len`, constructing new elements with `f`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be grown.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), AllocError>
    where
        F: FnMut() -> T,
    {
        self.try_resize_with(new_len, || Ok::<T, Infallible>(f()))
            .map_err(AllocError::from)
    }

    /// Resizes the array to `new_len`, filling new slots with default values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be grown.
    pub fn resize(&mut self, new_len: usize) -> Result<(), AllocError>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Clones the array into a new one with capacity equal to its length.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::from_slice_in(self.as_slice(), self.allocator().clone())
    }

    /// Replaces the contents of the array with clones of `source`.
    ///
    /// If `source` does not fit the current capacity, a complete copy is built first and then
    /// swapped in. Otherwise the shared prefix is assigned element by element with
    /// [`Clone::clone_from`], and the tail is either cloned in or dropped.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated. The array is
    /// unchanged.
    pub fn assign_from_slice(&mut self, source: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        if source.len() > self.capacity() {
            let mut copy = Self::from_slice_in(source, self.allocator().clone())?;
            self.swap(&mut copy);
            return Ok(());
        }

        let len = self.len;
        let shared = cmp::min(len, source.len());
        self.as_mut_slice()[..shared].clone_from_slice(&source[..shared]);

        if source.len() > len {
            let tail = &source[len..];
            // SAFETY: `source.len() <= capacity` and `[len, source.len())` is free
            let result = unsafe {
                construct_n(self.buf.slot_mut(len), tail.len(), |i| {
                    Ok::<T, Infallible>(tail[i].clone())
                })
            };
            if let Err(never) = result {
                match never {}
            }
            self.len = source.len();
        } else {
            self.truncate(source.len());
        }
        Ok(())
    }

    /// Appends clones of every element of `other`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a larger buffer is needed but cannot be allocated. The array is
    /// unchanged.
    pub fn extend_from_slice(&mut self, other: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let len = self.len;
        let required = len
            .checked_add(other.len())
            .ok_or(AllocError::CapacityOverflow { capacity: usize::MAX })?;
        self.reserve_for(required)?;
        // SAFETY: room for `required` values was reserved and `[len, required)` is free
        let result = unsafe {
            construct_n(self.buf.slot_mut(len), other.len(), |i| {
                Ok::<T, Infallible>(other[i].clone())
            })
        };
        if let Err(never) = result {
            match never {}
        }
        self.len = required;
        Ok(())
    }
}

impl<T, A: Allocator> Drop for DynamicArray<T, A> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` is live; the buffer releases the memory afterwards
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T, A: Allocator + Default> Default for DynamicArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for DynamicArray<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| err.handle())
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.assign_from_slice(source.as_slice()) {
            err.handle()
        }
    }
}

impl<T, A: Allocator> Deref for DynamicArray<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> DerefMut for DynamicArray<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator> AsRef<[T]> for DynamicArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> AsMut<[T]> for DynamicArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for DynamicArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, U, A, B> PartialEq<DynamicArray<U, B>> for DynamicArray<T, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &DynamicArray<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<[U]> for DynamicArray<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<&[U]> for DynamicArray<T, A> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, A: Allocator, const N: usize> PartialEq<[U; N]> for DynamicArray<T, A> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T: Eq, A: Allocator> Eq for DynamicArray<T, A> {}

impl<T: Hash, A: Allocator> Hash for DynamicArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(self.as_slice(), state)
    }
}

impl<T, A: Allocator + Clone> Extend<T> for DynamicArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Some(required) = self.len.checked_add(lower) {
            if let Err(err) = self.reserve_for(required) {
                err.handle()
            }
        }
        for value in iter {
            if let Err(err) = self.push(value) {
                err.handle()
            }
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, A: Allocator> IntoIterator for DynamicArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        let array = ManuallyDrop::new(self);
        // SAFETY: `array` is never dropped, so the buffer is moved out exactly once
        let buf = unsafe { ptr::read(&array.buf) };
        IntoIter::new(buf, array.len)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a DynamicArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.as_slice().iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut DynamicArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.as_mut_slice().iter_mut()
    }
}
