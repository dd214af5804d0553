//! Whitelist filter from raw log lines to domain events.

use crate::event::{DomainEvent, RawLogLine};
use crate::line_type::LineType;
use crate::types::TrackedNames;

/// Maps raw log lines to at most one [`DomainEvent`].
///
/// Classification is pure and total: short, malformed or untracked lines
/// yield `None`. The stream delivers thousands of irrelevant lines per
/// encounter, so the discriminator and length are checked before any name
/// comparison.
#[derive(Debug, Clone, Default)]
pub struct EventClassifier {
    names: TrackedNames,
}

impl EventClassifier {
    pub const fn new(names: TrackedNames) -> Self {
        Self { names }
    }

    pub const fn names(&self) -> &TrackedNames {
        &self.names
    }

    pub fn classify(&self, line: &RawLogLine) -> Option<DomainEvent> {
        let line_type: LineType = line.field(0)?.parse().ok()?;
        let name_index = line_type.name_index();
        if line.len() <= name_index {
            return None;
        }
        let name = line.field(name_index)?;
        let timestamp = line.field(1).unwrap_or_default().to_string();

        match line_type {
            LineType::NetworkAbility if self.names.is_tracked_ability(name) => {
                Some(DomainEvent::AbilityUse {
                    name: name.to_string(),
                    timestamp,
                })
            }
            LineType::StatusAdd if self.names.is_tracked_buff(name) => {
                Some(DomainEvent::StatusGain {
                    name: name.to_string(),
                    timestamp,
                })
            }
            _ => None,
        }
    }
}
