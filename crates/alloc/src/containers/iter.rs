use core::{fmt, iter::FusedIterator, ptr, slice};

use crate::{
    raw::RawBuffer,
    traits::{Allocator, Global},
};

/// An iterator that moves elements out of a [`DynamicArray`](super::DynamicArray).
///
/// Elements that are never yielded are dropped along with the iterator.
pub struct IntoIter<T, A: Allocator = Global> {
    buf: RawBuffer<T, A>,
    start: usize,
    end: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// `[0, len)` of `buf` must be live.
    pub(crate) fn new(buf: RawBuffer<T, A>, len: usize) -> Self {
        Self { buf, start: 0, end: len }
    }

    /// Returns the elements that have not been yielded yet.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live
        unsafe { slice::from_raw_parts(self.buf.slot(self.start), self.end - self.start) }
    }

    /// Returns the elements that have not been yielded yet, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.end - self.start;
        // SAFETY: `[start, end)` is live
        unsafe { slice::from_raw_parts_mut(self.buf.slot_mut(self.start), len) }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: live, and excluded from `[start, end)` right after
        let value = unsafe { self.buf.slot(self.start).read() };
        self.start += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: live until `end` was lowered past it
        Some(unsafe { self.buf.slot(self.end).read() })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        self.start = self.end;
        // SAFETY: never yielded, and no longer covered by `[start, end)`
        unsafe { ptr::drop_in_place(remaining) }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
