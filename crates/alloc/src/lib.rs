//! Owned raw storage and a growable array built on top of it.
//!
//! [`RawBuffer`] owns a block of uninitialized slots and nothing else. [`DynamicArray`] tracks
//! which of those slots are live and keeps every operation failure-atomic: an allocation error or
//! a failing element constructor leaves the array exactly as it was.
#![deny(unsafe_op_in_unsafe_fn)]
pub mod constants;
mod containers;
mod error;
mod raw;
mod traits;

pub use containers::{DynamicArray, IntoIter};
pub use error::{AllocError, EmplaceError};
pub use raw::RawBuffer;
pub use traits::{Allocator, Global};
