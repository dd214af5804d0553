//! Raw log lines and the domain events derived from them.

use serde::{Deserialize, Serialize};

use crate::timestamp::format_timestamp;

/// One combat log record as pushed by the overlay plugin.
///
/// Field positions follow the plugin's versioned wire schema: field 0 is the
/// line type discriminator and field 1 an ISO-8601 timestamp. The length is
/// not validated here; consumers must check before indexing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLogLine(Vec<String>);

impl RawLogLine {
    /// Wraps an ordered field sequence.
    pub const fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Returns the field at `index`, if the line is long enough.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for RawLogLine {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<'a> FromIterator<&'a str> for RawLogLine {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// A tracked occurrence extracted from the log stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A tracked ability was cast.
    AbilityUse {
        /// Ability name as it appeared on the wire.
        name: String,
        /// Raw ISO-8601 timestamp from field 1.
        timestamp: String,
    },
    /// The tracked buff was applied.
    StatusGain {
        /// Status name as it appeared on the wire.
        name: String,
        /// Raw ISO-8601 timestamp from field 1.
        timestamp: String,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::AbilityUse { name, .. } | Self::StatusGain { name, .. } => name,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Self::AbilityUse { timestamp, .. } | Self::StatusGain { timestamp, .. } => timestamp,
        }
    }

    /// The `HH:MM:SS` part of the timestamp, or a placeholder.
    pub fn short_time(&self) -> &str {
        format_timestamp(self.timestamp())
    }
}
