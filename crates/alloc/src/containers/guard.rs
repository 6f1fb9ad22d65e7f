use core::{mem, ptr};

/// Drops the values written so far into a run of slots unless disarmed.
///
/// Covers both failure paths of a bulk construction: an `Err` from the constructor and a panic
/// unwinding through it.
struct PartialInit<T> {
    dst: *mut T,
    initialized: usize,
}

impl<T> Drop for PartialInit<T> {
    fn drop(&mut self) {
        // SAFETY: exactly `initialized` values were written starting at `dst`
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.dst, self.initialized));
        }
    }
}

/// Constructs `count` values into consecutive slots starting at `dst`, calling `f` with the
/// offset of each slot.
///
/// If `f` fails or panics, the values constructed by this call are dropped before the failure
/// propagates, and the slots are uninitialized again.
///
/// ## Safety
///
/// - `dst` must be valid for writes of `count` values.
/// - The slots must not hold live values.
pub(crate) unsafe fn construct_n<T, E, F>(dst: *mut T, count: usize, mut f: F) -> Result<(), E>
where
    F: FnMut(usize) -> Result<T, E>,
{
    let mut guard = PartialInit { dst, initialized: 0 };
    while guard.initialized < count {
        let value = f(guard.initialized)?;
        // SAFETY: in bounds and uninitialized
        unsafe { guard.dst.add(guard.initialized).write(value) };
        guard.initialized += 1;
    }
    mem::forget(guard);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        mem::MaybeUninit,
        panic::{catch_unwind, AssertUnwindSafe},
        rc::Rc,
    };

    use super::*;

    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn error_drops_constructed_prefix() {
        let drops = Rc::new(Cell::new(0));
        let mut slots: [MaybeUninit<Counted>; 5] = std::array::from_fn(|_| MaybeUninit::uninit());
        let result = unsafe {
            construct_n(slots.as_mut_ptr().cast::<Counted>(), 5, |i| {
                if i == 3 {
                    Err("fourth")
                } else {
                    Ok(Counted(drops.clone()))
                }
            })
        };
        assert_eq!(result.err(), Some("fourth"));
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn panic_drops_constructed_prefix() {
        let drops = Rc::new(Cell::new(0));
        let mut slots: [MaybeUninit<Counted>; 4] = std::array::from_fn(|_| MaybeUninit::uninit());
        let result = catch_unwind(AssertUnwindSafe(|| unsafe {
            construct_n::<_, (), _>(slots.as_mut_ptr().cast::<Counted>(), 4, |i| {
                assert!(i < 2, "third");
                Ok(Counted(drops.clone()))
            })
        }));
        assert!(result.is_err());
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn success_keeps_values() {
        let mut slots: [MaybeUninit<u32>; 3] = [MaybeUninit::uninit(); 3];
        unsafe {
            construct_n::<_, (), _>(slots.as_mut_ptr().cast::<u32>(), 3, |i| Ok(i as u32 * 10))
                .unwrap();
            assert_eq!(slots[2].assume_init(), 20);
        }
    }
}
