//! # Error — Typed Failure Kinds
//!
//! Every fallible operation in the crate returns [`Result`]. The four kinds
//! mirror the failure semantics of the sieve core:
//!
//! - [`Error::InvalidArgument`] — bad bounds, flags ≥ 2²⁰, or a callback
//!   flag without a registered callback. Reported before any side effect.
//! - [`Error::OutOfRange`] — start/stop/seek beyond the legal 64-bit window,
//!   or segment arithmetic that would overflow it.
//! - [`Error::ResourceExhausted`] — allocation failure while growing the
//!   bucket store or a segment buffer. Fatal to the current sieve run.
//! - [`Error::Internal`] — a broken invariant (e.g. a sieving prime handed
//!   to the wrong cross-off tier). Indicates a bug, never user input.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds surfaced by the sieve core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Caller passed an argument the API rejects (bounds, flags, callbacks).
    InvalidArgument(String),
    /// A value lies outside the legal sieving window.
    OutOfRange(String),
    /// Memory allocation failed.
    ResourceExhausted(String),
    /// An internal invariant was violated.
    Internal(String),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Error {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Error {
        Error::OutOfRange(msg.into())
    }

    pub(crate) fn resource_exhausted(msg: impl Into<String>) -> Error {
        Error::ResourceExhausted(msg.into())
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Error {
        Error::Internal(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::OutOfRange(msg) => write!(f, "out of range: {}", msg),
            Error::ResourceExhausted(msg) => write!(f, "resource exhausted: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
