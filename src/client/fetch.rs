//! The relay client and its three request kinds.
//!
//! [`RelayClient`] owns one transport per request kind (publish,
//! subscribe, history) so an outstanding subscribe never blocks a
//! concurrent publish, plus the persistent timetoken that threads one
//! subscribe response into the next subscribe request.
//!
//! Every operation follows the same shape: connect the operation's
//! transport, write a `GET` request whose payload travels in the URL path,
//! run the response preamble gate, and hand back a reader over the body.
//! A publish message is percent-encoded straight onto the transport while
//! it is written; at no point does an encoded copy of it exist in memory.
//!
//! The model is single-threaded and blocking: exactly one logical
//! operation is in flight per transport, waits are busy-waits on the
//! transport's "data ready" probe, and there are no internal retries and
//! no timeouts. A peer that stays connected but silent blocks the caller
//! indefinitely; callers needing bounded waits enforce them in their
//! `Transport` implementation.
//!
//! # Examples
//!
//! ```ignore
//! use relay_http::{ClientConfig, RelayClient};
//! use std::io::Read;
//!
//! let config = ClientConfig::new("pub-key", "sub-key", "relay.example.com");
//! let mut client = RelayClient::<TcpTransport>::new(config);
//!
//! client.publish("sensors", r#"{"temp":21}"#)?;
//!
//! let mut payload = Vec::new();
//! let mut reader = client.subscribe("sensors")?;
//! reader.read_to_end(&mut payload)?;
//! ```

use bytes::BytesMut;

use crate::client::config::ClientConfig;
use crate::client::encode::write_percent_encoded;
use crate::client::preamble::validate_and_skip;
use crate::client::reader::{BodyReader, SubscribeReader};
use crate::client::token::Timetoken;
use crate::error::{RelayError, Result};
use crate::protocol::paths;
use crate::transport::{wait_byte, Transport};

/// Channel messaging client over byte-oriented transports.
///
/// Generic over the [`Transport`] implementation; see the
/// [module documentation](self) for the request model.
pub struct RelayClient<T: Transport> {
    config: ClientConfig,
    publish_transport: T,
    subscribe_transport: T,
    history_transport: T,
    timetoken: Timetoken,
}

impl<T: Transport + Default> RelayClient<T> {
    /// Client with freshly constructed (unconnected) transports.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transports(config, T::default(), T::default(), T::default())
    }
}

impl<T: Transport> RelayClient<T> {
    /// Client over caller-provided transports, one per request kind.
    pub fn with_transports(
        config: ClientConfig,
        publish_transport: T,
        subscribe_transport: T,
        history_transport: T,
    ) -> Self {
        RelayClient {
            config,
            publish_transport,
            subscribe_transport,
            history_transport,
            timetoken: Timetoken::default(),
        }
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The timetoken most recently captured from a subscribe response.
    ///
    /// Holds its initial `0` value until a subscribe body has been
    /// consumed (or closed) at least once.
    pub fn timetoken(&self) -> &Timetoken {
        &self.timetoken
    }

    /// Publish `message` to `channel`.
    ///
    /// The message must be a JSON value in its wire form (e.g.
    /// `r#""hello""#` for a string, `r#"{"temp":21}"#` for an object); it
    /// is percent-encoded into the request path while being written. The
    /// returned reader yields the server's acknowledgement body verbatim.
    pub fn publish(&mut self, channel: &str, message: &str) -> Result<BodyReader<'_, T>> {
        let config = &self.config;
        let transport = &mut self.publish_transport;
        if config.enable_logging {
            tracing::debug!(channel, "publishing message");
        }
        connect(transport, config)?;

        let mut head = BytesMut::with_capacity(128);
        head.extend_from_slice(b"GET /");
        head.extend_from_slice(paths::PUBLISH.as_bytes());
        head.extend_from_slice(b"/");
        head.extend_from_slice(config.publish_key.as_bytes());
        head.extend_from_slice(b"/");
        head.extend_from_slice(config.subscribe_key.as_bytes());
        head.extend_from_slice(b"/0/");
        head.extend_from_slice(channel.as_bytes());
        head.extend_from_slice(b"/0/");
        transport.write(&head);
        write_percent_encoded(transport, message.as_bytes());
        write_request_tail(transport, config);

        finish_preamble(transport, config, true)?;
        Ok(BodyReader::new(transport))
    }

    /// Serialize `value` and publish it to `channel`.
    pub fn publish_value(
        &mut self,
        channel: &str,
        value: &serde_json::Value,
    ) -> Result<BodyReader<'_, T>> {
        let message = value.to_string();
        self.publish(channel, &message)
    }

    /// Subscribe to `channel`, streaming the next message payload.
    ///
    /// Sends the stored timetoken (initially `0`) and returns a reader
    /// exposing the payload embedded in the response envelope as if it
    /// were the whole stream. Consuming (or closing) the reader captures
    /// the envelope's trailing timetoken, which the next `subscribe` call
    /// sends back.
    pub fn subscribe(&mut self, channel: &str) -> Result<SubscribeReader<'_, T>> {
        let config = &self.config;
        let transport = &mut self.subscribe_transport;
        if config.enable_logging {
            tracing::debug!(channel, timetoken = %self.timetoken, "subscribing");
        }
        connect(transport, config)?;

        let mut head = BytesMut::with_capacity(128);
        head.extend_from_slice(b"GET /");
        head.extend_from_slice(paths::SUBSCRIBE.as_bytes());
        head.extend_from_slice(b"/");
        head.extend_from_slice(config.subscribe_key.as_bytes());
        head.extend_from_slice(b"/");
        head.extend_from_slice(channel.as_bytes());
        head.extend_from_slice(b"/0/");
        head.extend_from_slice(self.timetoken.as_bytes());
        transport.write(&head);
        write_request_tail(transport, config);

        finish_preamble(transport, config, true)?;

        // The envelope owns the outermost '['; eat it so the reader
        // exposes only the payload value.
        match wait_byte(transport) {
            Some(b'[') => {}
            Some(_) => {
                transport.stop();
                return Err(RelayError::EnvelopeMismatch);
            }
            None => {
                transport.stop();
                return Err(RelayError::StreamInterrupted);
            }
        }

        Ok(SubscribeReader::new(transport, &mut self.timetoken))
    }

    /// Fetch up to `limit` recently published messages from `channel`.
    ///
    /// The body, a JSON array of messages, is handed back unfiltered;
    /// history responses carry no envelope and no timetoken.
    pub fn history(&mut self, channel: &str, limit: u16) -> Result<BodyReader<'_, T>> {
        let config = &self.config;
        let transport = &mut self.history_transport;
        if config.enable_logging {
            tracing::debug!(channel, limit, "fetching history");
        }
        connect(transport, config)?;

        let mut head = BytesMut::with_capacity(128);
        head.extend_from_slice(b"GET /");
        head.extend_from_slice(paths::HISTORY.as_bytes());
        head.extend_from_slice(b"/");
        head.extend_from_slice(config.subscribe_key.as_bytes());
        head.extend_from_slice(b"/");
        head.extend_from_slice(channel.as_bytes());
        head.extend_from_slice(b"/0/");
        head.extend_from_slice(limit.to_string().as_bytes());
        transport.write(&head);
        write_request_tail(transport, config);

        finish_preamble(transport, config, false)?;
        Ok(BodyReader::new(transport))
    }
}

/// Bring the operation's connection up, or fail without leaving state.
fn connect<T: Transport + ?Sized>(transport: &mut T, config: &ClientConfig) -> Result<()> {
    if transport.connect(&config.origin, config.port) {
        return Ok(());
    }
    transport.stop();
    if config.enable_logging {
        tracing::warn!(origin = %config.origin, port = config.port, "connect failed");
    }
    Err(RelayError::ConnectFailed {
        origin: config.origin.clone(),
        port: config.port,
    })
}

/// Close the request head and write the fixed header block.
fn write_request_tail<T: Transport + ?Sized>(transport: &mut T, config: &ClientConfig) {
    let mut tail = BytesMut::with_capacity(96);
    tail.extend_from_slice(b" HTTP/1.1\r\nHost: ");
    tail.extend_from_slice(config.origin.as_bytes());
    tail.extend_from_slice(b"\r\nUser-Agent: ");
    tail.extend_from_slice(config.user_agent.as_bytes());
    tail.extend_from_slice(b"\r\nConnection: close\r\n\r\n");
    transport.write(&tail);
}

/// Run the preamble gate; stop the connection on any failure.
fn finish_preamble<T: Transport + ?Sized>(
    transport: &mut T,
    config: &ClientConfig,
    chunked_extra_line: bool,
) -> Result<()> {
    match validate_and_skip(transport, chunked_extra_line) {
        Ok(()) => Ok(()),
        Err(err) => {
            transport.stop();
            if config.enable_logging {
                tracing::warn!(error = %err, "request failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    const PUBLISH_OK: &[u8] =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n11\r\n[1,\"Sent\",\"1\"]";

    fn client_with(
        publish: MemoryTransport,
        subscribe: MemoryTransport,
        history: MemoryTransport,
    ) -> RelayClient<MemoryTransport> {
        let config = ClientConfig::new("pub-key", "sub-key", "relay.example.com");
        RelayClient::with_transports(config, publish, subscribe, history)
    }

    fn first_line(written: &[u8]) -> &str {
        let text = std::str::from_utf8(written).unwrap();
        text.split("\r\n").next().unwrap()
    }

    #[test]
    fn test_publish_writes_the_exact_request_shape() {
        let mut client = client_with(
            MemoryTransport::replying(PUBLISH_OK.to_vec()),
            MemoryTransport::new(),
            MemoryTransport::new(),
        );
        client.publish("demo-channel", r#"{"temp":21}"#).unwrap();

        let written = client.publish_transport.written().to_vec();
        assert_eq!(
            first_line(&written),
            "GET /publish/pub-key/sub-key/0/demo-channel/0/%7B%22temp%22:21%7D HTTP/1.1"
        );
        let text = std::str::from_utf8(&written).unwrap();
        assert!(text.contains("\r\nHost: relay.example.com\r\n"));
        assert!(text.contains("\r\nUser-Agent: relay-http/0.1\r\n"));
        assert!(text.ends_with("\r\nConnection: close\r\n\r\n"));
    }

    #[test]
    fn test_publish_value_serializes_before_encoding() {
        let mut client = client_with(
            MemoryTransport::replying(PUBLISH_OK.to_vec()),
            MemoryTransport::new(),
            MemoryTransport::new(),
        );
        let value = serde_json::json!({ "on": true });
        client.publish_value("demo-channel", &value).unwrap();
        assert!(
            first_line(client.publish_transport.written()).contains("/0/%7B%22on%22:true%7D ")
        );
    }

    #[test]
    fn test_history_request_omits_the_chunk_line_skip() {
        let mut client = client_with(
            MemoryTransport::new(),
            MemoryTransport::new(),
            MemoryTransport::replying(
                b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\n[\"a\",\"b\"]".to_vec(),
            ),
        );
        let mut body = Vec::new();
        {
            use std::io::Read;
            let mut reader = client.history("demo-channel", 5).unwrap();
            reader.read_to_end(&mut body).unwrap();
        }
        assert_eq!(body, br#"["a","b"]"#);
        assert_eq!(
            first_line(client.history_transport.written()),
            "GET /history/sub-key/demo-channel/0/5 HTTP/1.1"
        );
    }

    #[test]
    fn test_connect_refusal_surfaces_connect_failed() {
        let mut client = client_with(
            MemoryTransport::refusing(),
            MemoryTransport::new(),
            MemoryTransport::new(),
        );
        let err = client.publish("demo-channel", "1").unwrap_err();
        assert!(matches!(err, RelayError::ConnectFailed { .. }));
        assert!(!client.publish_transport.connected());
    }

    #[test]
    fn test_rejected_status_stops_the_transport() {
        let mut client = client_with(
            MemoryTransport::replying(b"HTTP/1.1 403 Forbidden\r\n\r\n".to_vec()),
            MemoryTransport::new(),
            MemoryTransport::new(),
        );
        let err = client.publish("demo-channel", "1").unwrap_err();
        assert!(matches!(err, RelayError::StatusRejected));
        assert!(!client.publish_transport.connected());
    }

    #[test]
    fn test_subscribe_rejects_a_body_not_opening_with_bracket() {
        let mut client = client_with(
            MemoryTransport::new(),
            MemoryTransport::replying(
                b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nxoops".to_vec(),
            ),
            MemoryTransport::new(),
        );
        let err = client.subscribe("demo-channel").unwrap_err();
        assert!(matches!(err, RelayError::EnvelopeMismatch));
    }
}
