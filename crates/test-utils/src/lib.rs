//! Instrumented element types and allocators for testing magpie containers.
//!
//! [`Tracker`] hands out [`Tracked`] values that report every construction, clone, and drop, and
//! can be told to fail a later construction or clone. [`CountingAlloc`] wraps the global allocator,
//! counts what flows through it, and can be told to refuse requests.

use std::{alloc::Layout, cell::Cell, fmt, ptr::NonNull, rc::Rc};

use magpie_alloc::{AllocError, Allocator, Global};

#[derive(Default)]
struct Counters {
    created: Cell<usize>,
    cloned: Cell<usize>,
    dropped: Cell<usize>,
    fuse: Cell<Option<usize>>,
}

/// Shared bookkeeping for a family of [`Tracked`] values.
#[derive(Clone, Default)]
pub struct Tracker(Rc<Counters>);

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a value. Never fails.
    pub fn make(&self, value: i32) -> Tracked {
        self.0.created.set(self.0.created.get() + 1);
        Tracked {
            value,
            tracker: self.clone(),
        }
    }

    /// Constructs a value, failing if the fuse trips.
    pub fn try_make(&self, value: i32) -> Result<Tracked, InjectedFailure> {
        if self.trip() {
            return Err(InjectedFailure);
        }
        Ok(self.make(value))
    }

    /// Lets the next `n` fallible constructions or clones succeed and fails the one after.
    ///
    /// The fuse is one-shot: once it trips, everything succeeds again.
    pub fn fail_after(&self, n: usize) {
        self.0.fuse.set(Some(n));
    }

    pub fn disarm(&self) {
        self.0.fuse.set(None);
    }

    pub fn created(&self) -> usize {
        self.0.created.get()
    }

    pub fn cloned(&self) -> usize {
        self.0.cloned.get()
    }

    pub fn dropped(&self) -> usize {
        self.0.dropped.get()
    }

    /// Number of values currently alive.
    pub fn live(&self) -> usize {
        self.created() + self.cloned() - self.dropped()
    }

    fn trip(&self) -> bool {
        match self.0.fuse.get() {
            None => false,
            Some(0) => {
                self.0.fuse.set(None);
                true
            }
            Some(n) => {
                self.0.fuse.set(Some(n - 1));
                false
            }
        }
    }
}

/// A value whose lifecycle is reported to a [`Tracker`].
///
/// Cloning panics when the tracker's fuse trips.
pub struct Tracked {
    value: i32,
    tracker: Tracker,
}

impl Tracked {
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if self.tracker.trip() {
            panic!("injected clone failure");
        }
        self.tracker.0.cloned.set(self.tracker.cloned() + 1);
        Self {
            value: self.value,
            tracker: self.tracker.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.tracker.0.dropped.set(self.tracker.dropped() + 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<i32> for Tracked {
    fn eq(&self, other: &i32) -> bool {
        self.value == *other
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}

/// The error returned when a [`Tracker`]'s fuse trips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectedFailure;

impl fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("injected construction failure")
    }
}

impl std::error::Error for InjectedFailure {}

#[derive(Default)]
struct Stats {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    live_bytes: Cell<usize>,
    remaining: Cell<Option<usize>>,
}

/// An allocator that forwards to [`Global`] and counts every request.
///
/// Clones share their counters.
#[derive(Clone, Default)]
pub struct CountingAlloc(Rc<Stats>);

impl CountingAlloc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets the next `n` allocations succeed and refuses all after them.
    pub fn limit_allocations(&self, n: usize) {
        self.0.remaining.set(Some(n));
    }

    pub fn unlimit(&self) {
        self.0.remaining.set(None);
    }

    pub fn allocations(&self) -> usize {
        self.0.allocations.get()
    }

    pub fn deallocations(&self) -> usize {
        self.0.deallocations.get()
    }

    /// Bytes allocated and not yet freed.
    pub fn live_bytes(&self) -> usize {
        self.0.live_bytes.get()
    }
}

// SAFETY: forwards to `Global`
unsafe impl Allocator for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        match self.0.remaining.get() {
            Some(0) => return Err(AllocError::OutOfMemory { layout }),
            Some(n) => self.0.remaining.set(Some(n - 1)),
            None => {}
        }
        let ptr = Global.allocate(layout)?;
        self.0.allocations.set(self.allocations() + 1);
        self.0.live_bytes.set(self.live_bytes() + layout.size());
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.deallocations.set(self.deallocations() + 1);
        self.0.live_bytes.set(self.live_bytes() - layout.size());
        // SAFETY: upheld by caller
        unsafe { Global.deallocate(ptr, layout) }
    }
}

impl fmt::Debug for CountingAlloc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingAlloc")
            .field("allocations", &self.allocations())
            .field("deallocations", &self.deallocations())
            .field("live_bytes", &self.live_bytes())
            .finish()
    }
}
