//! Core domain logic for the Eureka Moment tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: reducing raw combat log lines to tracked ability uses and buff gains
//! - Counters: per-session cast and proc tallies with a derived proc rate
//! - Timestamps: shortening wire timestamps for display

mod classifier;
mod counters;
pub mod event;
pub mod line_type;
pub mod timestamp;
pub mod types;

pub use classifier::EventClassifier;
pub use counters::{CounterEngine, CounterError, ProcRate, SessionCounters};
pub use event::{DomainEvent, RawLogLine};
pub use line_type::{LineType, UnknownLineType};
pub use timestamp::{TIMESTAMP_PLACEHOLDER, format_timestamp};
pub use types::{TrackedNames, ValidationError};
