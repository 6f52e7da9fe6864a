//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations.
///
/// [`Error::Incomplete`] and [`Error::Exhausted`] are recoverable control-flow
/// signals, not data corruption: the caller retries the same operation once
/// more bytes (or a larger destination buffer) are available. The remaining
/// variants indicate bytes that decoded structurally but cannot inhabit the
/// target type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The view does not yet hold enough bytes. `required` is the total byte
    /// count, measured from the position the failed call started at, that a
    /// retry needs to succeed.
    #[error("insufficient data: {required} bytes required")]
    Incomplete { required: usize },
    /// A fixed (non-growable) destination cannot fit the write. `required` is
    /// the total capacity the destination would need.
    #[error("buffer capacity exhausted: {required} bytes required")]
    Exhausted { required: usize },
    #[error("invalid utf-8 in text payload")]
    InvalidText,
    #[error("value out of range for {0}")]
    OutOfRange(&'static str),
    #[error("cannot cast {from} to {to}")]
    Cast {
        from: &'static str,
        to: &'static str,
    },
}

impl Error {
    // Re-expresses an element-relative `Incomplete` hint relative to the start
    // of the operation that contains the element.
    pub(crate) fn deepen(self, offset: usize) -> Self {
        match self {
            Self::Incomplete { required } => Self::Incomplete {
                required: offset + required,
            },
            other => other,
        }
    }
}
