//! Timetoken capture from the envelope tail.
//!
//! Once the boundary filter marks the end of the payload, the rest of the
//! subscribe envelope is `,"<timetoken>"]`. The extractor consumes that
//! tail, first from whatever bytes a buffered read pulled past the
//! boundary, then straight from the transport, and stores the token in a
//! fixed-capacity buffer. The token is opaque to this crate; it is echoed
//! back verbatim in the next subscribe request path.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::transport::{wait_byte, Transport};

/// Fixed-capacity buffer holding the most recent timetoken.
///
/// Sized for a 64-bit decimal identifier. A longer token is stored
/// truncated to capacity (never overflowed) and logged as a warning.
/// The default value is the single byte `0`, the "start of history" token
/// a first subscribe sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetoken {
    bytes: [u8; Self::CAPACITY],
    len: usize,
}

impl Timetoken {
    /// Maximum number of token bytes stored.
    pub const CAPACITY: usize = 21;

    /// The captured token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Whether the token still holds its initial `0` value.
    pub fn is_initial(&self) -> bool {
        self.as_bytes() == crate::protocol::INITIAL_TIMETOKEN
    }

    /// Overwrite the stored token. `bytes` must already fit capacity.
    ///
    /// The whole buffer is rewritten so equality and hashing never see
    /// residue from a longer previous token.
    fn store(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= Self::CAPACITY);
        self.bytes = [0; Self::CAPACITY];
        self.bytes[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
    }
}

impl Default for Timetoken {
    fn default() -> Self {
        let mut token = Timetoken {
            bytes: [0; Self::CAPACITY],
            len: 0,
        };
        token.store(crate::protocol::INITIAL_TIMETOKEN);
        token
    }
}

impl fmt::Display for Timetoken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are decimal on the wire; non-UTF-8 garbage from a broken
        // peer displays lossily rather than failing.
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl Serialize for Timetoken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Two-source byte sequence: a leftover slice first, then the transport.
///
/// A buffered read may have pulled bytes past the payload boundary; those
/// bytes belong to the envelope tail and are consumed here before any
/// further transport reads.
pub(crate) struct TailSource<'a, T: Transport + ?Sized> {
    leftover: &'a [u8],
    transport: &'a mut T,
}

impl<'a, T: Transport + ?Sized> TailSource<'a, T> {
    pub(crate) fn new(leftover: &'a [u8], transport: &'a mut T) -> Self {
        TailSource {
            leftover,
            transport,
        }
    }

    /// Next tail byte, or `None` once the connection drops with the
    /// leftover drained.
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        if let Some((&first, rest)) = self.leftover.split_first() {
            self.leftover = rest;
            return Some(first);
        }
        wait_byte(self.transport)
    }
}

/// Consume the `,"<token>"]` tail and capture the token.
///
/// Skips to the first `,`, then to the first `"` after it, then copies
/// bytes until the closing `"`. Bytes beyond [`Timetoken::CAPACITY`] are
/// read and discarded so extraction completes even on an over-long token.
/// The stored token is replaced only on a complete capture; if the
/// connection drops before the closing quote, `token` is left unchanged
/// and the dead connection is the caller-visible symptom.
pub(crate) fn extract_trailing_token<T: Transport + ?Sized>(
    leftover: &[u8],
    transport: &mut T,
    token: &mut Timetoken,
) {
    let mut source = TailSource::new(leftover, transport);

    loop {
        match source.next_byte() {
            Some(b',') => break,
            Some(_) => {}
            None => return,
        }
    }
    loop {
        match source.next_byte() {
            Some(b'"') => break,
            Some(_) => {}
            None => return,
        }
    }

    let mut captured = [0u8; Timetoken::CAPACITY];
    let mut len = 0;
    let mut overflow = 0usize;
    loop {
        match source.next_byte() {
            Some(b'"') => break,
            Some(byte) => {
                if len < captured.len() {
                    captured[len] = byte;
                    len += 1;
                } else {
                    overflow += 1;
                }
            }
            None => return,
        }
    }

    if overflow > 0 {
        tracing::warn!(
            stored = len,
            discarded = overflow,
            "timetoken exceeded capacity, stored truncated"
        );
    }
    token.store(&captured[..len]);
}
