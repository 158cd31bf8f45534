//! Shared error helpers.
//!
//! User-facing error messages in this crate are stable strings. The underlying
//! cause (io error, parser output, `systemctl` stderr) is only appended when the
//! crate is built with debug assertions, so release builds never leak internals
//! into operator output.

use std::fmt;

/// Optional internal cause attached to a user-facing error.
///
/// Renders as ` (cause)` in development builds and as nothing otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cause(Option<String>);

impl Cause {
    /// Capture `err` as the internal cause (dropped in release builds).
    pub fn from_err(err: impl fmt::Display) -> Self {
        if cfg!(debug_assertions) {
            Self(Some(err.to_string()))
        } else {
            Self(None)
        }
    }

    /// No internal cause.
    pub fn none() -> Self {
        Self(None)
    }

    /// The captured cause, if any.
    pub fn detail(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(cause) => write!(f, " ({})", cause),
            None => Ok(()),
        }
    }
}
