//! Error types for relay HTTP operations.
//!
//! This module defines the error enum returned by every client operation,
//! together with the [`Result`] alias used throughout the crate.
//!
//! # Error Categories
//!
//! | Category | Variants | Connection failure |
//! |----------|----------|--------------------|
//! | Connect | `ConnectFailed` | Yes |
//! | Response | `StatusRejected`, `EnvelopeMismatch` | No |
//! | Stream | `StreamInterrupted` | Yes |
//!
//! Every failure is terminal for the request that produced it: the client
//! stops the operation's connection before returning the error, and never
//! retries internally. Retry policy belongs to the caller, who can use
//! [`RelayError::is_connection_failure`] to separate transient network
//! trouble from conclusive protocol answers.
//!
//! Note that an over-long timetoken is *not* an error: the token is stored
//! truncated to capacity and a warning is logged.
//!
//! # Examples
//!
//! ```
//! use relay_http::RelayError;
//!
//! let err = RelayError::StreamInterrupted;
//! assert!(err.is_connection_failure());
//!
//! let err = RelayError::StatusRejected;
//! assert!(!err.is_connection_failure());
//! ```

use thiserror::Error;

/// Result type for relay HTTP operations.
///
/// Provides a convenient shorthand for `Result<T, RelayError>`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur while issuing a request or reading its response.
///
/// Each variant represents a distinct failure mode. Use pattern matching to
/// handle specific errors appropriately.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    /// The transport could not establish a connection to the origin.
    #[error("could not connect to {origin}:{port}")]
    ConnectFailed {
        /// Origin host the connection was attempted against.
        origin: String,
        /// TCP port the connection was attempted against.
        port: u16,
    },

    /// The response status code did not start with `2`.
    ///
    /// Nothing past the first status digit is consumed; the caller is
    /// expected to discard the connection (the client does this before
    /// returning the error).
    #[error("server answered with a non-2xx status")]
    StatusRejected,

    /// The connection dropped while a decoder was waiting for bytes.
    ///
    /// Raised from any blocking wait: the status line, the header
    /// terminator, the envelope's opening bracket.
    #[error("connection closed before the response completed")]
    StreamInterrupted,

    /// A subscribe response body did not open with `[`.
    #[error("subscribe body did not open with '['")]
    EnvelopeMismatch,
}

impl RelayError {
    /// Whether this error reflects a failed connection rather than a
    /// conclusive answer from the server.
    ///
    /// Callers layering their own retry policy will typically retry
    /// connection failures and treat the rest as final.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            RelayError::ConnectFailed { .. } | RelayError::StreamInterrupted
        )
    }
}
