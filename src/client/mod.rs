//! Relay HTTP client implementation.
//!
//! This module contains the client facade and the streaming decoders it is
//! built from. The decoders process the transport byte-by-byte: nothing
//! larger than a request head or the caller's own read buffer is ever held
//! in memory, and the subscribe payload, embedded in a JSON envelope on
//! the wire, is surfaced without buffering it.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch    - RelayClient and the three request kinds
//! ├── config   - Client configuration
//! ├── encode   - Streaming percent-encoding of outbound messages
//! ├── preamble - HTTP response preamble validation and skipping
//! ├── filter   - Incremental JSON boundary detection
//! ├── token    - Timetoken buffer and envelope-tail extraction
//! └── reader   - Body readers (pass-through and boundary-truncating)
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RelayClient`] | Client facade: publish, subscribe, history |
//! | [`ClientConfig`] | Keys, origin, and request defaults |
//! | [`SubscribeReader`] | Payload reader that stops at the envelope boundary |
//! | [`BodyReader`] | Verbatim body reader |
//! | [`JsonBoundaryFilter`] | Per-byte top-level-value end detector |
//! | [`Timetoken`] | Fixed-capacity token carried between subscribes |
//!
//! # Examples
//!
//! ## Feeding the boundary filter
//!
//! ```
//! use relay_http::client::{FilterEvent, JsonBoundaryFilter};
//!
//! let mut filter = JsonBoundaryFilter::new();
//! for byte in br#"{"msg":"hi"}"#.iter().take(11) {
//!     assert_eq!(filter.feed(*byte), FilterEvent::Continue);
//! }
//! assert_eq!(filter.feed(b'}'), FilterEvent::Boundary);
//! ```
//!
//! ## Skipping a response preamble
//!
//! ```
//! use relay_http::client::validate_and_skip;
//! use relay_http::{MemoryTransport, Transport};
//!
//! let mut transport =
//!     MemoryTransport::replying(b"HTTP/1.1 200 OK\r\n\r\nBODY".to_vec());
//! transport.connect("relay.example.com", 80);
//! validate_and_skip(&mut transport, false).unwrap();
//! assert_eq!(transport.read(), Some(b'B'));
//! ```

mod config;
mod encode;
mod fetch;
mod filter;
mod preamble;
mod reader;
mod token;

pub use config::ClientConfig;
pub use encode::write_percent_encoded;
pub use fetch::RelayClient;
pub use filter::{FilterEvent, JsonBoundaryFilter};
pub use preamble::validate_and_skip;
pub use reader::{BodyReader, SubscribeReader};
pub use token::Timetoken;
