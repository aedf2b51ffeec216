//! Error classification shared by every layer.

use std::fmt::{self, Display};

/// The client-facing class of a failure.
///
/// Each layer keeps its own error enum; this is the one place the mapping
/// to a response class is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad input. Never retried, message surfaced verbatim.
    Validation,

    /// Lost stock race or stale cart. The client must re-fetch.
    Conflict,

    /// Order, item, address or coupon absent.
    NotFound,

    /// Illegal state transition.
    State,

    /// Persistence or infrastructure failure.
    Internal,
}

impl ErrorClass {
    /// Stable label used in logs and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::State => "state",
            Self::Internal => "internal",
        }
    }
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every error that can reach a caller.
pub trait Classify {
    /// The class this error belongs to.
    fn class(&self) -> ErrorClass;
}
