//! Body readers over a transport connection.
//!
//! Two reader types hand a response body to the caller:
//!
//! - [`BodyReader`] passes bytes through untouched until the connection
//!   drains. Publish acknowledgements and history responses use it.
//! - [`SubscribeReader`] additionally drives the JSON boundary filter over
//!   every byte it pulls, cuts the caller-visible stream exactly at the
//!   payload boundary, hands any read-ahead bytes to the timetoken
//!   extractor, and stops the connection, so the payload embedded in the
//!   envelope reads as if it were the whole stream.
//!
//! Both implement [`std::io::Read`]. A read blocks for the first byte,
//! then drains whatever else is already available; end of body (or a
//! dropped connection, which is indistinguishable by design) reads as EOF.

use std::io;

use crate::client::filter::{FilterEvent, JsonBoundaryFilter};
use crate::client::token::{extract_trailing_token, Timetoken};
use crate::transport::{wait_byte, Transport};

/// Unfiltered pass-through reader for response bodies.
///
/// Surfaces transport bytes verbatim until the connection drains, then
/// reads as EOF. Dropping the reader stops the connection (responses are
/// `Connection: close`; there is nothing to reuse).
#[derive(Debug)]
pub struct BodyReader<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: Transport + ?Sized> BodyReader<'a, T> {
    pub(crate) fn new(transport: &'a mut T) -> Self {
        BodyReader { transport }
    }

    /// Read one body byte, blocking until data arrives or the connection
    /// drops (`None`).
    pub fn read_byte(&mut self) -> Option<u8> {
        wait_byte(self.transport)
    }
}

impl<T: Transport + ?Sized> io::Read for BodyReader<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let Some(first) = wait_byte(self.transport) else {
            return Ok(0);
        };
        buf[0] = first;
        let mut filled = 1;
        while filled < buf.len() && self.transport.available() {
            match self.transport.read() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }
}

impl<T: Transport + ?Sized> Drop for BodyReader<'_, T> {
    fn drop(&mut self) {
        self.transport.stop();
    }
}

/// Boundary-truncating reader for subscribe payloads.
///
/// Constructed with fresh filter state, right after the envelope's opening
/// `[` has been eaten. Every byte pulled from the transport goes through
/// [`JsonBoundaryFilter`]; when the boundary fires the reader surfaces
/// bytes only up to and including the boundary byte, feeds everything read
/// beyond it to the timetoken extractor, and stops the transport.
/// Subsequent reads observe EOF.
///
/// Letting the reader go out of scope before the payload is consumed takes
/// the [`close`](SubscribeReader::close) path: the rest of the stream is
/// drained *through the filter* so the timetoken is still captured, rather
/// than the connection being dropped on the floor.
#[derive(Debug)]
pub struct SubscribeReader<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    filter: JsonBoundaryFilter,
    timetoken: &'a mut Timetoken,
    live: bool,
}

impl<'a, T: Transport + ?Sized> SubscribeReader<'a, T> {
    pub(crate) fn new(transport: &'a mut T, timetoken: &'a mut Timetoken) -> Self {
        SubscribeReader {
            transport,
            filter: JsonBoundaryFilter::new(),
            timetoken,
            live: true,
        }
    }

    /// Read one payload byte, blocking until data arrives.
    ///
    /// Returns `None` at the payload boundary (after which the timetoken
    /// has been captured and the connection stopped) and on a dropped
    /// connection alike. The boundary byte itself is the last byte
    /// returned.
    pub fn read_byte(&mut self) -> Option<u8> {
        if !self.live {
            return None;
        }
        let Some(byte) = wait_byte(self.transport) else {
            self.live = false;
            return None;
        };
        if self.filter.feed(byte) == FilterEvent::Boundary {
            extract_trailing_token(&[], self.transport, self.timetoken);
            self.finish();
        }
        Some(byte)
    }

    /// Stop reading the payload without consuming it.
    ///
    /// Drains the remaining stream through the boundary filter so the
    /// trailing timetoken is still captured, then stops the transport.
    pub fn close(mut self) {
        self.drain();
    }

    fn drain(&mut self) {
        if !self.live {
            return;
        }
        while let Some(byte) = wait_byte(self.transport) {
            if self.filter.feed(byte) == FilterEvent::Boundary {
                extract_trailing_token(&[], self.transport, self.timetoken);
                break;
            }
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.live = false;
        self.transport.stop();
        tracing::debug!(timetoken = %self.timetoken, "subscribe body finished");
    }
}

impl<T: Transport + ?Sized> io::Read for SubscribeReader<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.live || buf.is_empty() {
            return Ok(0);
        }
        let Some(first) = wait_byte(self.transport) else {
            self.live = false;
            return Ok(0);
        };
        buf[0] = first;
        let mut filled = 1;
        while filled < buf.len() && self.transport.available() {
            match self.transport.read() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        for index in 0..filled {
            if self.filter.feed(buf[index]) == FilterEvent::Boundary {
                // Everything past the boundary byte belongs to the
                // envelope tail, never to the caller.
                let visible = index + 1;
                extract_trailing_token(&buf[visible..filled], self.transport, self.timetoken);
                self.finish();
                return Ok(visible);
            }
        }
        Ok(filled)
    }
}

impl<T: Transport + ?Sized> Drop for SubscribeReader<'_, T> {
    fn drop(&mut self) {
        self.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use std::io::Read;

    fn open_transport(script: &[u8]) -> MemoryTransport {
        let mut transport = MemoryTransport::replying(script.to_vec());
        transport.connect("relay.example.com", 80);
        transport
    }

    #[test]
    fn test_buffered_read_stops_exactly_at_the_boundary() {
        // Everything after the payload's `]` is read ahead here, yet none
        // of it reaches the caller.
        let mut transport = open_transport(br#"["Hello, world!"],"13511688131075270"]"#);
        let mut token = Timetoken::default();
        {
            let mut reader = SubscribeReader::new(&mut transport, &mut token);
            let mut payload = Vec::new();
            reader.read_to_end(&mut payload).unwrap();
            assert_eq!(payload, br#"["Hello, world!"]"#);
        }
        assert_eq!(token.as_bytes(), b"13511688131075270");
    }

    #[test]
    fn test_single_byte_reads_cross_the_boundary_identically() {
        let mut transport = open_transport(br#"{"a":1},"42"]"#);
        let mut token = Timetoken::default();
        let mut payload = Vec::new();
        {
            let mut reader = SubscribeReader::new(&mut transport, &mut token);
            while let Some(byte) = reader.read_byte() {
                payload.push(byte);
            }
        }
        assert_eq!(payload, br#"{"a":1}"#);
        assert_eq!(token.as_bytes(), b"42");
    }

    #[test]
    fn test_tiny_destination_buffers_split_the_tail_handoff() {
        // A 3-byte buffer forces the boundary to land mid-buffer with
        // read-ahead bytes that must go to the extractor.
        let mut transport = open_transport(br#"[1,2],"99"]"#);
        let mut token = Timetoken::default();
        let mut payload = Vec::new();
        {
            let mut reader = SubscribeReader::new(&mut transport, &mut token);
            let mut buf = [0u8; 3];
            loop {
                let n = reader.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                payload.extend_from_slice(&buf[..n]);
            }
        }
        assert_eq!(payload, b"[1,2]");
        assert_eq!(token.as_bytes(), b"99");
    }

    #[test]
    fn test_bare_string_payload_closes_on_its_quote() {
        let mut transport = open_transport(br#""ping","7"]"#);
        let mut token = Timetoken::default();
        let mut payload = Vec::new();
        {
            let mut reader = SubscribeReader::new(&mut transport, &mut token);
            reader.read_to_end(&mut payload).unwrap();
        }
        assert_eq!(payload, br#""ping""#);
        assert_eq!(token.as_bytes(), b"7");
    }

    #[test]
    fn test_close_before_consuming_still_captures_the_token() {
        let mut transport = open_transport(br#"["unread"],"1234"]"#);
        let mut token = Timetoken::default();
        let reader = SubscribeReader::new(&mut transport, &mut token);
        reader.close();
        assert_eq!(token.as_bytes(), b"1234");
        assert!(!transport.connected());
    }

    #[test]
    fn test_dropping_an_unfinished_reader_drains_the_stream() {
        let mut transport = open_transport(br#"[1,2,3],"55"]"#);
        let mut token = Timetoken::default();
        {
            let mut reader = SubscribeReader::new(&mut transport, &mut token);
            let mut buf = [0u8; 2];
            reader.read(&mut buf).unwrap();
        }
        assert_eq!(token.as_bytes(), b"55");
    }

    #[test]
    fn test_disconnect_mid_payload_reads_as_eof_and_keeps_old_token() {
        let mut transport = open_transport(br#"[1,2"#);
        let mut token = Timetoken::default();
        let mut payload = Vec::new();
        {
            let mut reader = SubscribeReader::new(&mut transport, &mut token);
            reader.read_to_end(&mut payload).unwrap();
        }
        assert_eq!(payload, b"[1,2");
        assert!(token.is_initial());
    }

    #[test]
    fn test_body_reader_passes_everything_through() {
        let mut transport = open_transport(br#"[["a"],["b"],"x"]"#);
        let mut body = Vec::new();
        BodyReader::new(&mut transport)
            .read_to_end(&mut body)
            .unwrap();
        assert_eq!(body, br#"[["a"],["b"],"x"]"#);
    }

    #[test]
    fn test_reads_after_the_boundary_observe_eof() {
        let mut transport = open_transport(br#"[],"1"]"#);
        let mut token = Timetoken::default();
        let mut reader = SubscribeReader::new(&mut transport, &mut token);
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload).unwrap();
        assert_eq!(payload, b"[]");
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read_byte(), None);
    }
}
