use core::{alloc::Layout, ptr::NonNull};

use crate::error::AllocError;

/// A source of raw memory for buffers.
///
/// Buffers ask for memory with [`Layout::array`] and hand every block back with the layout it
/// was allocated with. Zero-sized layouts are never requested.
///
/// ## Safety
///
/// Implementors must return blocks that are valid for reads and writes of `layout.size()` bytes,
/// aligned to `layout.align()`, and not aliased by any other live block, until they are passed to
/// [`deallocate`](Allocator::deallocate).
pub unsafe trait Allocator {
    /// Allocates an uninitialized block of memory that fits `layout`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the request cannot be satisfied.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Frees a block of memory.
    ///
    /// ## Safety
    ///
    /// - `ptr` must have been returned by [`allocate`](Allocator::allocate) on this allocator
    ///   (or a handle to the same allocator) and not freed since.
    /// - `layout` must be the layout it was allocated with.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: forwards to the registered global allocator
unsafe impl Allocator for Global {
    /// Zero-sized layouts get a dangling pointer aligned to `layout.align()`.
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // SAFETY: alignments are non-zero
            return Ok(unsafe { NonNull::new_unchecked(layout.align() as *mut u8) });
        }
        // SAFETY: layout has a non-zero size
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::OutOfMemory { layout })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: upheld by caller
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: forwards to `A`
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: upheld by caller
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
