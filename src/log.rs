//! Logging shim
//!
//! With the `tracing` feature the macros forward to the `tracing` crate;
//! without it they expand to nothing.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop {
    /// No-op trace-level event.
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level event.
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {debug, trace};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, trace};
