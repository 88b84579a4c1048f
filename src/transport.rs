//! The byte-channel seam between the streaming decoders and the network.
//!
//! The crate never opens sockets itself. Everything it does (writing a
//! request, skipping a response preamble, filtering a subscribe body) is
//! expressed against the [`Transport`] trait, a minimal blocking byte
//! channel owned by the caller. Implement it over whatever carries bytes in
//! your environment: a TCP stream, a serial link, a TLS session managed
//! elsewhere.
//!
//! # Contract
//!
//! - `connect` establishes the link and reports success; the client calls
//!   it once per request.
//! - `connected` must keep reporting `true` while unread data remains
//!   buffered, even if the peer already closed. The decoders' blocking
//!   waits and end-of-stream detection rely on this.
//! - `available` is a non-blocking "data ready" probe; the decoders
//!   busy-wait on it, yielding between probes.
//! - `read` returns the next byte, or `None` once the link is down and no
//!   buffered byte remains.
//! - `write` failures are not reported at this seam. A broken link shows
//!   up on the read side, which is where every operation ends up waiting.
//!
//! There is deliberately no timeout anywhere in this contract: a peer that
//! stays connected but silent will block the caller indefinitely. Callers
//! that need bounded waits must enforce them inside their `Transport`
//! implementation (e.g. a socket read timeout that drops the connection).
//!
//! # MemoryTransport
//!
//! [`MemoryTransport`] is the in-memory reference implementation: it
//! replays a scripted inbound byte sequence and captures outbound writes.
//! The test suite runs entirely on it, and downstreams can use it as a
//! test double.

/// A blocking, byte-oriented transport connection.
///
/// See the [module documentation](self) for the full contract.
pub trait Transport {
    /// Establish the connection. Returns `false` if the link could not be
    /// brought up; no partial state may linger in that case.
    fn connect(&mut self, host: &str, port: u16) -> bool;

    /// Whether the connection is usable or still has unread data buffered.
    fn connected(&self) -> bool;

    /// Non-blocking probe: is at least one byte ready to read?
    fn available(&self) -> bool;

    /// Read the next byte, or `None` when the link is down and drained.
    fn read(&mut self) -> Option<u8>;

    /// Write bytes to the link. Failures surface later, on the read side.
    fn write(&mut self, bytes: &[u8]);

    /// Tear the connection down. Safe to call more than once.
    fn stop(&mut self);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn connect(&mut self, host: &str, port: u16) -> bool {
        (**self).connect(host, port)
    }

    fn connected(&self) -> bool {
        (**self).connected()
    }

    fn available(&self) -> bool {
        (**self).available()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Block until a byte is ready or the connection drops, then read it.
///
/// This is the single suspension point of the whole crate: a busy-wait on
/// `available()`, re-checked until data arrives or `connected()` goes
/// false.
pub(crate) fn wait_byte<T: Transport + ?Sized>(transport: &mut T) -> Option<u8> {
    while transport.connected() && !transport.available() {
        std::thread::yield_now();
    }
    if !transport.connected() {
        return None;
    }
    transport.read()
}

/// Scripted in-memory transport.
///
/// Replays a preloaded inbound byte script and captures everything written
/// to it. `connected()` stays true while unread script bytes remain, then
/// drops to false, the same shape as a peer that sends a complete
/// `Connection: close` response and hangs up.
///
/// # Examples
///
/// ```
/// use relay_http::{MemoryTransport, Transport};
///
/// let mut transport = MemoryTransport::replying(b"hi".to_vec());
/// assert!(transport.connect("relay.example.com", 80));
/// transport.write(b"GET / HTTP/1.1\r\n\r\n");
/// assert_eq!(transport.read(), Some(b'h'));
/// assert_eq!(transport.read(), Some(b'i'));
/// assert_eq!(transport.read(), None);
/// assert!(!transport.connected());
/// ```
#[derive(Debug, Default)]
pub struct MemoryTransport {
    script: Vec<u8>,
    cursor: usize,
    written: Vec<u8>,
    open: bool,
    refuse: bool,
}

impl MemoryTransport {
    /// A transport with nothing scripted. Reads report a dropped link as
    /// soon as the (empty) script is exhausted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that will replay `script` as its inbound bytes.
    pub fn replying(script: Vec<u8>) -> Self {
        MemoryTransport {
            script,
            ..Self::default()
        }
    }

    /// A transport whose `connect` always fails.
    pub fn refusing() -> Self {
        MemoryTransport {
            refuse: true,
            ..Self::default()
        }
    }

    /// Everything written to the transport so far, across connections.
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, _host: &str, _port: u16) -> bool {
        if self.refuse {
            return false;
        }
        self.open = true;
        true
    }

    fn connected(&self) -> bool {
        self.open && self.cursor < self.script.len()
    }

    fn available(&self) -> bool {
        self.open && self.cursor < self.script.len()
    }

    fn read(&mut self) -> Option<u8> {
        if !self.open || self.cursor >= self.script.len() {
            return None;
        }
        let byte = self.script[self.cursor];
        self.cursor += 1;
        Some(byte)
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.open {
            self.written.extend_from_slice(bytes);
        }
    }

    fn stop(&mut self) {
        self.open = false;
    }
}
