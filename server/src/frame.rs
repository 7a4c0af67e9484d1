//! Outbound error frames.
//!
//! DESIGN
//! ======
//! Typed errors that can reach a client implement [`ErrorCode`]: a grepable
//! code plus a retryable flag. [`error_frame`] turns any of them into the
//! `error` relay event sent back to the offending connection only. Errors
//! never go to the room.

use history::{RelayEvent, WireError};

/// Code for an inbound message that could not be parsed as an intent.
pub const E_MALFORMED: &str = "E_MALFORMED";

/// Grepable error code and retryable flag for structured error frames.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

impl ErrorCode for WireError {
    fn error_code(&self) -> &'static str {
        E_MALFORMED
    }
}

/// Build the `error` event for a typed error.
#[must_use]
pub fn error_frame(err: &(impl ErrorCode + ?Sized)) -> RelayEvent {
    RelayEvent::Error { code: err.error_code().to_owned(), message: err.to_string(), retryable: err.retryable() }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
