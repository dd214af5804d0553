//! OverlayPlugin event feed for the Eureka Moment tracker.
//!
//! Maintains a subscription to the plugin's WebSocket server, survives
//! transport failures with a fixed backoff, and delivers classified
//! [`DomainEvent`](eureka_core::DomainEvent)s plus connectivity notices to a
//! consumer over a channel.

mod client;
pub mod config;
mod error;
pub mod protocol;
mod state;
mod transport;

pub use client::StreamClient;
pub use config::{ConfigError, DEFAULT_URL, StreamConfig};
pub use error::StreamError;
pub use state::{ConnectionState, FeedUpdate, StatusUpdate};
pub use transport::{Connector, Transport, WebSocketConnector};
