//! Response preamble validation.
//!
//! Every response starts with a status line and headers the client has no
//! use for beyond one question: did the request succeed, and where does the
//! body start? The gate answers it while discarding the preamble
//! byte-for-byte, holding nothing but a four-byte match counter.
//!
//! # Operation
//!
//! 1. Discard bytes through the first space (the end of `HTTP/1.x`).
//! 2. Read one byte: the first status digit. Anything but `2` is a
//!    conclusive rejection and nothing further is consumed.
//! 3. Discard bytes until the exact sequence `\r\n\r\n` has been seen.
//! 4. Optionally discard one more line, covering the chunked
//!    transfer-encoding framing line some endpoints put ahead of the body.
//!
//! On success the transport cursor sits exactly at the first body byte.

use crate::error::{RelayError, Result};
use crate::protocol::HEADER_TERMINATOR;
use crate::transport::{wait_byte, Transport};

/// Validate the response status and skip the rest of the preamble.
///
/// Blocks until bytes arrive or the connection drops. Returns
/// [`RelayError::StatusRejected`] if the status code's first digit is not
/// `2` (the preamble is *not* consumed further in that case; discard the
/// connection), or [`RelayError::StreamInterrupted`] if the connection
/// drops at any wait. No retries happen here; failure is terminal for the
/// request.
///
/// With `chunked_extra_line`, one line past the blank line is discarded as
/// well; the responses to publish and subscribe requests carry a chunked
/// transfer-encoding framing line there.
pub fn validate_and_skip<T: Transport + ?Sized>(
    transport: &mut T,
    chunked_extra_line: bool,
) -> Result<()> {
    // "HTTP/1.x ": everything before the first space is noise.
    loop {
        let byte = wait_byte(transport).ok_or(RelayError::StreamInterrupted)?;
        if byte == b' ' {
            break;
        }
    }

    // The first status digit decides everything.
    let digit = wait_byte(transport).ok_or(RelayError::StreamInterrupted)?;
    if digit != b'2' {
        return Err(RelayError::StatusRejected);
    }

    // Exact `\r\n\r\n` scan. A mismatched byte is discarded outright and
    // never reconsidered as the start of a new match: scanning resumes
    // from the byte after the failed match point.
    let mut matched = 0;
    while matched < HEADER_TERMINATOR.len() {
        let byte = wait_byte(transport).ok_or(RelayError::StreamInterrupted)?;
        if byte == HEADER_TERMINATOR[matched] {
            matched += 1;
        } else {
            matched = 0;
        }
    }

    if chunked_extra_line {
        loop {
            let byte = wait_byte(transport).ok_or(RelayError::StreamInterrupted)?;
            if byte == b'\r' {
                break;
            }
        }
        // The '\n' closing the framing line.
        wait_byte(transport).ok_or(RelayError::StreamInterrupted)?;
    }

    Ok(())
}
