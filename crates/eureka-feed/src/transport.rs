//! Transport seam between the client state machine and the network.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::error::StreamError;

/// An established message stream.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text message.
    async fn send_text(&mut self, text: String) -> Result<(), StreamError>;

    /// Waits for the next text message.
    ///
    /// Returns `None` once the peer has closed the stream.
    async fn recv(&mut self) -> Option<Result<String, StreamError>>;

    /// Closes the stream. Called once per connection.
    async fn close(&mut self);
}

/// Opens transports to an endpoint.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, StreamError>;
}

/// Connects to the OverlayPlugin WebSocket server.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, StreamError> {
        let (stream, response) = connect_async(url).await?;
        debug!(%url, status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WebSocketTransport { stream }))
    }
}

struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                    Ok(text) => return Some(Ok(text.to_owned())),
                    Err(_) => debug!(len = bytes.len(), "ignoring non-UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "peer sent close frame");
                    return None;
                }
                // Ping replies are queued by tungstenite and flushed on the next read.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(error) => return Some(Err(error.into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(error) = self.stream.close(None).await {
            debug!(%error, "error while closing websocket");
        }
    }
}
