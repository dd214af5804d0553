//! Tracked name whitelist with validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Both tracked abilities resolve to the same name.
    #[error("tracked abilities must be distinct, both are {name:?}")]
    DuplicateAbility { name: String },
}

/// Names the classifier and counters match against.
///
/// Defaults are the English client names. Localized clients report
/// translated names on the wire, so every entry can be overridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedNames {
    /// First tracked gathering ability.
    #[serde(default = "default_solid_reason")]
    pub solid_reason: String,

    /// Second tracked gathering ability.
    #[serde(default = "default_ageless_words")]
    pub ageless_words: String,

    /// The buff both abilities can proc.
    #[serde(default = "default_eureka_moment")]
    pub eureka_moment: String,
}

fn default_solid_reason() -> String {
    "Solid Reason".to_string()
}

fn default_ageless_words() -> String {
    "Ageless Words".to_string()
}

fn default_eureka_moment() -> String {
    "Eureka Moment".to_string()
}

impl Default for TrackedNames {
    fn default() -> Self {
        Self {
            solid_reason: default_solid_reason(),
            ageless_words: default_ageless_words(),
            eureka_moment: default_eureka_moment(),
        }
    }
}

impl TrackedNames {
    /// Whether `name` is one of the two tracked abilities.
    pub fn is_tracked_ability(&self, name: &str) -> bool {
        name == self.solid_reason || name == self.ageless_words
    }

    /// Whether `name` is the tracked buff.
    pub fn is_tracked_buff(&self, name: &str) -> bool {
        name == self.eureka_moment
    }

    /// Checks that every name is set and the abilities are distinguishable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("solid_reason", &self.solid_reason),
            ("ageless_words", &self.ageless_words),
            ("eureka_moment", &self.eureka_moment),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Empty { field });
            }
        }
        if self.solid_reason == self.ageless_words {
            return Err(ValidationError::DuplicateAbility {
                name: self.solid_reason.clone(),
            });
        }
        Ok(())
    }
}
