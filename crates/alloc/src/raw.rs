use core::{
    alloc::Layout,
    any::type_name,
    fmt,
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

use bytesize::ByteSize;
use log::{error, trace};

use crate::{
    error::AllocError,
    traits::{Allocator, Global},
};

/// An owned block of uninitialized storage for `capacity` values of `T`.
///
/// `RawBuffer` only manages memory. It never constructs, reads, or drops a `T`; whoever owns the
/// buffer decides which slots hold live values and must drop them before the buffer goes away.
///
/// A buffer with zero capacity owns nothing and its pointer is dangling. Buffers of zero-sized
/// types never allocate either, but still report the capacity they were created with.
///
/// `RawBuffer` cannot be cloned: duplicating the memory without duplicating the values in it
/// would leave two owners of the same elements. Ownership moves with the value, or explicitly
/// with [`take`](RawBuffer::take) and [`swap`](RawBuffer::swap).
pub struct RawBuffer<T, A: Allocator = Global> {
    ptr: NonNull<T>,
    capacity: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer uniquely owns its memory
unsafe impl<T: Send, A: Allocator + Send> Send for RawBuffer<T, A> {}
// SAFETY: shared access only hands out addresses
unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawBuffer<T, A> {}

impl<T> RawBuffer<T> {
    /// Constructs an empty buffer that owns no memory.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            alloc: Global,
            _marker: PhantomData,
        }
    }

    /// Allocates a buffer with room for `capacity` values from the global allocator.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the size overflows or the allocator refuses the request.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, A: Allocator> RawBuffer<T, A> {
    /// Constructs an empty buffer that will hand `alloc` back on release.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Allocates a buffer with room for `capacity` values from `alloc`.
    ///
    /// A `capacity` of zero does not allocate.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `capacity` values of `T` exceed `isize::MAX` bytes or the allocator
    /// refuses the request. No memory is held on failure.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocError> {
        if capacity == 0 {
            return Ok(Self::new_in(alloc));
        }

        let layout = match Layout::array::<T>(capacity) {
            Ok(layout) => layout,
            Err(_) => {
                error!(
                    "capacity overflow: {} slots of `{}` exceed the maximum allocation size",
                    capacity,
                    type_name::<T>()
                );
                return Err(AllocError::CapacityOverflow { capacity });
            }
        };

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                alloc,
                _marker: PhantomData,
            });
        }

        let ptr = alloc.allocate(layout).map_err(|err| {
            error!(
                "failed to allocate {} for {} slots of `{}`",
                ByteSize::b(layout.size() as u64).to_string_as(true),
                capacity,
                type_name::<T>()
            );
            err
        })?;

        trace!(
            "allocated {} for {} slots of `{}`",
            ByteSize::b(layout.size() as u64).to_string_as(true),
            capacity,
            type_name::<T>()
        );

        Ok(Self {
            ptr: ptr.cast(),
            capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Returns the number of slots in the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a reference to the allocator that owns the memory.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns a pointer to the first slot.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a mutable pointer to the first slot.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the address of slot `index`.
    ///
    /// `index == capacity` is allowed and yields the one-past-the-end address. The slot may be
    /// uninitialized; reading through the pointer is only sound for slots the owner has written.
    #[inline]
    pub fn slot(&self, index: usize) -> *const T {
        debug_assert!(
            index <= self.capacity,
            "slot index (is {index}) should be <= capacity (is {})",
            self.capacity
        );
        self.ptr.as_ptr().wrapping_add(index)
    }

    /// Returns the mutable address of slot `index`.
    ///
    /// See [`slot`](RawBuffer::slot).
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> *mut T {
        debug_assert!(
            index <= self.capacity,
            "slot index (is {index}) should be <= capacity (is {})",
            self.capacity
        );
        self.ptr.as_ptr().wrapping_add(index)
    }

    /// Exchanges the memory (and the allocators that own it) with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
        mem::swap(&mut self.alloc, &mut other.alloc);
    }

    /// Moves the memory out into a new buffer, leaving `self` empty.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    /// Returns the layout of the owned block, or `None` if nothing was allocated.
    fn current_layout(&self) -> Option<Layout> {
        let size = mem::size_of::<T>() * self.capacity;
        if size == 0 {
            None
        } else {
            // SAFETY: the same layout was validated by `Layout::array` on allocation
            Some(unsafe { Layout::from_size_align_unchecked(size, mem::align_of::<T>()) })
        }
    }
}

impl<T, A: Allocator> Drop for RawBuffer<T, A> {
    fn drop(&mut self) {
        if let Some(layout) = self.current_layout() {
            trace!(
                "releasing {} for {} slots of `{}`",
                ByteSize::b(layout.size() as u64).to_string_as(true),
                self.capacity,
                type_name::<T>()
            );
            // SAFETY: allocated by `self.alloc` with this layout and never freed
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) }
        }
    }
}

impl<T, A: Allocator + Default> Default for RawBuffer<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: Allocator> fmt::Debug for RawBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_empty_marker() {
        let buf = RawBuffer::<u64>::with_capacity(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.as_ptr(), NonNull::<u64>::dangling().as_ptr() as *const u64);
        assert!(buf.current_layout().is_none());
    }

    #[test]
    fn slots_are_contiguous() {
        let mut buf = RawBuffer::<u32>::with_capacity(4).unwrap();
        assert_eq!(buf.capacity(), 4);
        let base = buf.as_ptr() as usize;
        for i in 0..=4 {
            assert_eq!(buf.slot(i) as usize, base + i * mem::size_of::<u32>());
        }
        unsafe {
            buf.slot_mut(3).write(7);
            assert_eq!(buf.slot(3).read(), 7);
        }
    }

    #[test]
    fn swap_exchanges_ownership() {
        let mut a = RawBuffer::<u8>::with_capacity(8).unwrap();
        let mut b = RawBuffer::<u8>::new();
        let ptr = a.as_ptr();
        a.swap(&mut b);
        assert_eq!(a.capacity(), 0);
        assert_eq!(b.capacity(), 8);
        assert_eq!(b.as_ptr(), ptr);
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut a = RawBuffer::<String>::with_capacity(3).unwrap();
        let ptr = a.as_ptr();
        let b = a.take();
        assert_eq!(a.capacity(), 0);
        assert_eq!(b.capacity(), 3);
        assert_eq!(b.as_ptr(), ptr);
    }

    #[test]
    fn zero_sized_types_never_allocate() {
        let buf = RawBuffer::<()>::with_capacity(1024).unwrap();
        assert_eq!(buf.capacity(), 1024);
        assert!(buf.current_layout().is_none());
    }

    #[test]
    fn oversized_request_overflows() {
        let err = RawBuffer::<u64>::with_capacity(usize::MAX / 4).unwrap_err();
        assert_eq!(err, AllocError::CapacityOverflow { capacity: usize::MAX / 4 });
    }
}
