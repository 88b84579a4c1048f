#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Crate layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`client`] | Client facade and the streaming decoders |
//! | [`transport`] | The `Transport` trait and the in-memory test double |
//! | [`protocol`] | Wire constants (paths, terminators, defaults) |
//! | [`error`] | Error enum and `Result` alias |
//!
//! The commonly used types are re-exported at the crate root.

pub mod client;
pub mod error;
pub mod protocol;
pub mod transport;

pub use client::{
    BodyReader, ClientConfig, FilterEvent, JsonBoundaryFilter, RelayClient, SubscribeReader,
    Timetoken,
};
pub use error::{RelayError, Result};
pub use transport::{MemoryTransport, Transport};
