//! OverlayPlugin wire messages.
//!
//! The only outbound message is the subscription request. Inbound messages
//! of interest look like `{"type": "LogLine", "line": ["21", ...]}`.

use eureka_core::RawLogLine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Event category carrying combat log lines.
pub const LOG_LINE_EVENT: &str = "LogLine";

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    call: &'static str,
    events: [&'a str; 1],
}

/// Encodes `{"call": "subscribe", "events": ["LogLine"]}`.
pub fn subscribe_request() -> Result<String, serde_json::Error> {
    serde_json::to_string(&SubscribeRequest {
        call: "subscribe",
        events: [LOG_LINE_EVENT],
    })
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    line: RawLogLine,
}

/// Extracts the log line from an inbound message.
///
/// Returns `None` for undecodable JSON, other event categories and empty
/// lines. None of these are connection failures.
pub fn decode_log_line(text: &str) -> Option<RawLogLine> {
    let message: InboundMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(error) => {
            debug!(%error, "dropping undecodable message");
            return None;
        }
    };
    if message.kind.as_deref() != Some(LOG_LINE_EVENT) || message.line.is_empty() {
        return None;
    }
    Some(message.line)
}
