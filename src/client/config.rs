//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::protocol::{DEFAULT_PORT, DEFAULT_USER_AGENT};

/// Configuration for a [`RelayClient`](crate::RelayClient).
///
/// An explicitly constructed value the caller owns; there is no implicit
/// process-wide client. Keys and origin are required at construction; the
/// rest defaults sensibly and can be adjusted with the `with_*` builders
/// or struct-update syntax.
///
/// # Examples
///
/// ```
/// use relay_http::ClientConfig;
///
/// let config = ClientConfig::new("pub-key", "sub-key", "relay.example.com")
///     .with_port(8080)
///     .with_logging(true);
/// assert_eq!(config.port, 8080);
/// assert_eq!(config.user_agent, "relay-http/0.1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Key authorizing publish requests; first path segment after the
    /// operation name.
    pub publish_key: String,
    /// Key scoping subscribe and history requests.
    pub subscribe_key: String,
    /// Origin host the transports connect to, also sent as `Host:`.
    pub origin: String,
    /// Origin port.
    pub port: u16,
    /// Value of the `User-Agent:` request header.
    pub user_agent: String,
    /// Emit `tracing` events for request lifecycle and failures.
    pub enable_logging: bool,
}

impl ClientConfig {
    /// Configuration with the given keys and origin, defaults elsewhere.
    pub fn new(
        publish_key: impl Into<String>,
        subscribe_key: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        ClientConfig {
            publish_key: publish_key.into(),
            subscribe_key: subscribe_key.into(),
            origin: origin.into(),
            port: DEFAULT_PORT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            enable_logging: false,
        }
    }

    /// Override the origin port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Toggle request lifecycle logging.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new("demo", "demo", "localhost")
    }
}
