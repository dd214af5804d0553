//! Connection state and the updates delivered to consumers.

use std::fmt;
use std::time::Duration;

use eureka_core::DomainEvent;

/// Lifecycle of the client's logical connection.
///
/// Owned by the client; consumers only observe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Stopping,
}

impl ConnectionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory connectivity notice emitted at each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Connecting { url: String },
    Connected,
    Retrying { delay: Duration, reason: String },
    Stopped,
}

impl StatusUpdate {
    /// State the client enters when this status is emitted.
    pub const fn state(&self) -> ConnectionState {
        match self {
            Self::Connecting { .. } | Self::Retrying { .. } => ConnectionState::Connecting,
            Self::Connected => ConnectionState::Connected,
            Self::Stopped => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { url } => write!(f, "Connecting to {url}..."),
            Self::Connected => f.write_str("Connected, listening for ability uses"),
            Self::Retrying { delay, .. } => {
                write!(f, "Connection lost, retrying in {}s...", delay.as_secs_f64())
            }
            Self::Stopped => f.write_str("Stopped"),
        }
    }
}

/// Everything the client sends to its consumer, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    Event(DomainEvent),
    Status(StatusUpdate),
}
