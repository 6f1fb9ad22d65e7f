use core::{alloc::Layout, convert::Infallible, fmt};
use std::error::Error;

use bytesize::ByteSize;

/// An error with allocating memory for a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested capacity cannot be represented as an allocation of at most `isize::MAX` bytes.
    CapacityOverflow {
        /// Number of slots that were requested.
        capacity: usize,
    },
    /// The allocator could not satisfy the request.
    OutOfMemory {
        /// Layout of the refused request.
        layout: Layout,
    },
}

impl AllocError {
    /// Escalates the error for callers that cannot return a `Result`.
    ///
    /// Overflow panics. Exhaustion is forwarded to [`std::alloc::handle_alloc_error`],
    /// which aborts the process by default.
    pub fn handle(self) -> ! {
        match self {
            Self::CapacityOverflow { .. } => panic!("{self}"),
            Self::OutOfMemory { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { capacity } => {
                write!(f, "capacity overflow: {capacity} slots exceed the maximum allocation size")
            }
            Self::OutOfMemory { layout } => {
                write!(
                    f,
                    "out of memory: failed to allocate {} (align {})",
                    ByteSize::b(layout.size() as u64).to_string_as(true),
                    layout.align()
                )
            }
        }
    }
}

impl Error for AllocError {}

/// An error from an operation that constructs an element with a fallible constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmplaceError<E> {
    /// Storage for the element could not be allocated.
    Alloc(AllocError),
    /// The element constructor failed.
    Element(E),
}

impl<E> From<AllocError> for EmplaceError<E> {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}

impl From<EmplaceError<Infallible>> for AllocError {
    fn from(err: EmplaceError<Infallible>) -> Self {
        match err {
            EmplaceError::Alloc(err) => err,
            EmplaceError::Element(never) => match never {},
        }
    }
}

impl<E: fmt::Display> fmt::Display for EmplaceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(err) => write!(f, "{err}"),
            Self::Element(err) => write!(f, "element construction failed: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for EmplaceError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            Self::Element(err) => Some(err),
        }
    }
}
