//! Session counters and the derived proc rate.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::event::DomainEvent;
use crate::types::TrackedNames;

/// Errors from counter updates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// The ability is not one of the two tracked casts.
    #[error("ability {name:?} is not tracked")]
    UntrackedAbility { name: String },
}

/// Proc rate derived from counters at read time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum ProcRate {
    /// No tracked casts yet.
    NoData,
    /// Procs per tracked cast, as a percentage.
    Percent(f64),
}

impl ProcRate {
    /// Percentage value, if any casts have been seen.
    pub const fn percent(self) -> Option<f64> {
        match self {
            Self::NoData => None,
            Self::Percent(value) => Some(value),
        }
    }
}

impl fmt::Display for ProcRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data"),
            Self::Percent(value) => write!(f, "{value:.1}%"),
        }
    }
}

/// Immutable view of the session tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub solid_reason_count: u64,
    pub ageless_words_count: u64,
    pub eureka_proc_count: u64,
}

impl SessionCounters {
    pub const fn total_casts(&self) -> u64 {
        self.solid_reason_count
            .saturating_add(self.ageless_words_count)
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "session counts stay far below 2^52"
    )]
    pub fn proc_rate(&self) -> ProcRate {
        match self.total_casts() {
            0 => ProcRate::NoData,
            total => ProcRate::Percent(self.eureka_proc_count as f64 / total as f64 * 100.0),
        }
    }
}

/// Owner of the session counters.
///
/// Mutation goes through `&mut self`, so a single owner (the consumer task)
/// serializes updates and every [`snapshot`](Self::snapshot) is consistent.
#[derive(Debug, Clone, Default)]
pub struct CounterEngine {
    names: TrackedNames,
    counters: SessionCounters,
}

impl CounterEngine {
    pub fn new(names: TrackedNames) -> Self {
        Self {
            names,
            counters: SessionCounters::default(),
        }
    }

    /// Counts a cast of one of the tracked abilities.
    pub fn record_ability_use(&mut self, name: &str, timestamp: &str) -> Result<(), CounterError> {
        let slot = if name == self.names.solid_reason {
            &mut self.counters.solid_reason_count
        } else if name == self.names.ageless_words {
            &mut self.counters.ageless_words_count
        } else {
            return Err(CounterError::UntrackedAbility {
                name: name.to_string(),
            });
        };
        *slot = slot.saturating_add(1);
        debug!(%name, %timestamp, total = self.counters.total_casts(), "recorded ability use");
        Ok(())
    }

    /// Counts a proc. The classifier has already filtered by name.
    pub fn record_status_gain(&mut self, name: &str, timestamp: &str) {
        self.counters.eureka_proc_count = self.counters.eureka_proc_count.saturating_add(1);
        debug!(%name, %timestamp, procs = self.counters.eureka_proc_count, "recorded status gain");
    }

    /// Applies a classified event.
    pub fn record(&mut self, event: &DomainEvent) -> Result<(), CounterError> {
        match event {
            DomainEvent::AbilityUse { name, timestamp } => self.record_ability_use(name, timestamp),
            DomainEvent::StatusGain { name, timestamp } => {
                self.record_status_gain(name, timestamp);
                Ok(())
            }
        }
    }

    pub fn reset(&mut self) {
        debug!(previous = ?self.counters, "resetting counters");
        self.counters = SessionCounters::default();
    }

    pub const fn snapshot(&self) -> SessionCounters {
        self.counters
    }
}
