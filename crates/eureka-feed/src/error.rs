//! Transport-level errors.
//!
//! None of these reach the consumer. The client logs them and retries.

use std::time::Duration;

use thiserror::Error;

/// Stream client errors.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The connection attempt did not finish in time.
    #[error("connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Socket-level failure outside the WebSocket protocol.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// Handshake, protocol or frame error from the WebSocket library.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The peer closed the stream.
    #[error("connection closed by peer")]
    Closed,

    /// The subscription request could not be encoded.
    #[error("failed to encode subscription: {0}")]
    Encode(#[from] serde_json::Error),
}
