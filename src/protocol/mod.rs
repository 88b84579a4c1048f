//! Wire-level constants shared by the client and its decoders.
//!
//! The relay service speaks plain HTTP/1.1 `GET` requests whose payload
//! travels entirely in the URL path, and answers with bodies the streaming
//! decoders in [`crate::client`] pick apart byte by byte. This module holds
//! the few fixed byte sequences and defaults both sides of that exchange
//! agree on.
//!
//! # Request shape
//!
//! ```text
//! GET /<op>/<keys...>/0/<channel>/<suffix> HTTP/1.1\r\n
//! Host: <origin>\r\n
//! User-Agent: <agent>\r\n
//! Connection: close\r\n
//! \r\n
//! ```
//!
//! No request body is ever sent; a publish message is percent-encoded into
//! the final path segment.

/// Path segments naming the three request kinds.
pub mod paths {
    /// Publish a message to a channel.
    pub const PUBLISH: &str = "publish";
    /// Stream messages from a channel.
    pub const SUBSCRIBE: &str = "subscribe";
    /// Fetch recently published messages.
    pub const HISTORY: &str = "history";
}

/// Exact byte sequence separating the response head from the body.
pub const HEADER_TERMINATOR: [u8; 4] = *b"\r\n\r\n";

/// Default origin port.
pub const DEFAULT_PORT: u16 = 80;

/// User agent sent when the configuration does not override it.
pub const DEFAULT_USER_AGENT: &str = "relay-http/0.1";

/// Timetoken sent on a first subscribe, before the server has issued one.
pub const INITIAL_TIMETOKEN: &[u8] = b"0";
