//! Failing element constructors and clones must leave arrays as they were and leak nothing.

use std::panic::{catch_unwind, AssertUnwindSafe};

use magpie_alloc::{DynamicArray, EmplaceError};
use magpie_test_utils::{CountingAlloc, InjectedFailure, Tracked, Tracker};

fn filled(
    tracker: &Tracker,
    alloc: &CountingAlloc,
    values: &[i32],
) -> DynamicArray<Tracked, CountingAlloc> {
    let mut array = DynamicArray::new_in(alloc.clone());
    for &value in values {
        array.push(tracker.make(value)).unwrap();
    }
    array
}

fn values<A: magpie_alloc::Allocator>(array: &DynamicArray<Tracked, A>) -> Vec<i32> {
    array.iter().map(Tracked::value).collect()
}

#[test]
fn failed_append_at_full_capacity_changes_nothing() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let mut array = filled(&tracker, &alloc, &[1, 2, 3, 4]);
    assert_eq!(array.len(), array.capacity());
    let ptr = array.as_ptr();
    let live_bytes = alloc.live_bytes();

    tracker.fail_after(0);
    let err = array.try_emplace_back(|| tracker.try_make(5)).unwrap_err();

    assert_eq!(err, EmplaceError::Element(InjectedFailure));
    assert_eq!(values(&array), [1, 2, 3, 4]);
    assert_eq!(array.capacity(), 4);
    assert_eq!(array.as_ptr(), ptr);
    // the larger buffer was allocated and released again
    assert_eq!(alloc.live_bytes(), live_bytes);
    assert_eq!(tracker.live(), 4);
}

#[test]
fn failed_interior_emplace_changes_nothing() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let mut array = filled(&tracker, &alloc, &[1, 2, 3]);
    array.reserve(8).unwrap();
    let allocations = alloc.allocations();

    tracker.fail_after(0);
    assert!(array.try_emplace(1, || tracker.try_make(9)).is_err());

    assert_eq!(values(&array), [1, 2, 3]);
    assert_eq!(array.capacity(), 8);
    assert_eq!(alloc.allocations(), allocations);
    assert_eq!(tracker.live(), 3);
}

#[test]
fn panicking_emplace_changes_nothing() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let mut array = filled(&tracker, &alloc, &[1, 2]);
    let live_bytes = alloc.live_bytes();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _ = array.emplace(0, || panic!("constructor"));
    }));

    assert!(result.is_err());
    assert_eq!(values(&array), [1, 2]);
    assert_eq!(alloc.live_bytes(), live_bytes);
    assert_eq!(tracker.live(), 2);
}

#[test]
fn failed_resize_drops_partial_tail() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let mut array = filled(&tracker, &alloc, &[1, 2]);

    let mut next = 10;
    tracker.fail_after(3);
    let err = array
        .try_resize_with(8, || {
            next += 1;
            tracker.try_make(next)
        })
        .unwrap_err();

    assert_eq!(err, EmplaceError::Element(InjectedFailure));
    assert_eq!(values(&array), [1, 2]);
    assert_eq!(tracker.created(), 5);
    assert_eq!(tracker.live(), 2);
    // the reservation survives the failure
    assert_eq!(array.capacity(), 8);
}

#[test]
fn failed_from_fn_releases_everything() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();

    tracker.fail_after(4);
    let result =
        DynamicArray::try_from_fn_in(6, |i| tracker.try_make(i as i32), alloc.clone());

    assert_eq!(result.unwrap_err(), EmplaceError::Element(InjectedFailure));
    assert_eq!(tracker.live(), 0);
    assert_eq!(alloc.allocations(), 1);
    assert_eq!(alloc.deallocations(), 1);
}

#[test]
fn panicking_clone_leaves_source_intact() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let array = filled(&tracker, &alloc, &[1, 2, 3, 4, 5]);
    let live_bytes = alloc.live_bytes();

    tracker.fail_after(2);
    let result = catch_unwind(AssertUnwindSafe(|| array.clone()));

    assert!(result.is_err());
    assert_eq!(values(&array), [1, 2, 3, 4, 5]);
    assert_eq!(tracker.cloned(), 2);
    assert_eq!(tracker.live(), 5);
    assert_eq!(alloc.live_bytes(), live_bytes);
}

#[test]
fn panicking_tail_clone_in_clone_from_keeps_length() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let source = filled(&tracker, &alloc, &[7, 8, 9, 10]);
    let mut target = filled(&tracker, &alloc, &[1]);
    target.reserve(4).unwrap();

    // the prefix is assigned in place, the first tail clone succeeds, the second panics
    tracker.fail_after(2);
    let result = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));

    assert!(result.is_err());
    assert_eq!(target.len(), 1);
    assert_eq!(tracker.live(), 5);
}

#[test]
fn panicking_extend_from_slice_keeps_length() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    let source = filled(&tracker, &alloc, &[4, 5, 6]);
    let mut target = filled(&tracker, &alloc, &[1, 2, 3]);

    tracker.fail_after(1);
    let result = catch_unwind(AssertUnwindSafe(|| target.extend_from_slice(&source)));

    assert!(result.is_err());
    assert_eq!(values(&target), [1, 2, 3]);
    assert_eq!(tracker.live(), 6);
}

#[test]
fn everything_is_dropped_exactly_once() {
    let tracker = Tracker::new();
    let alloc = CountingAlloc::new();
    {
        let mut array = filled(&tracker, &alloc, &[1, 2, 3, 4, 5, 6]);
        let copy = array.clone();
        array.remove(2);
        array.insert(0, tracker.make(0)).unwrap();
        array.truncate(3);
        array.clone_from(&copy);
        let mut iter = copy.into_iter();
        iter.next();
        iter.next_back();
    }
    assert_eq!(tracker.live(), 0);
    assert_eq!(alloc.live_bytes(), 0);
    assert_eq!(alloc.allocations(), alloc.deallocations());
}
