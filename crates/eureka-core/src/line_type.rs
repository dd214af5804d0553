//! Log line discriminators as the single source of truth for field 0 values.

use std::fmt;
use std::str::FromStr;

/// Log line categories this tracker understands.
///
/// The wire carries these as decimal strings in field 0 of every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    /// `NetworkAbility`: field 3 is the source, field 5 the ability name.
    NetworkAbility,
    /// `StatusAdd`: field 3 is the status name, field 6 the source.
    StatusAdd,
}

impl LineType {
    /// Discriminator as it appears in field 0.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkAbility => "21",
            Self::StatusAdd => "26",
        }
    }

    /// Index of the field holding the tracked name for this line type.
    #[must_use]
    pub const fn name_index(&self) -> usize {
        match self {
            Self::NetworkAbility => 5,
            Self::StatusAdd => 3,
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LineType {
    type Err = UnknownLineType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "21" => Ok(Self::NetworkAbility),
            "26" => Ok(Self::StatusAdd),
            _ => Err(UnknownLineType(s.to_string())),
        }
    }
}

/// Error type for discriminators outside the tracked set.
#[derive(Debug, Clone)]
pub struct UnknownLineType(String);

impl fmt::Display for UnknownLineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "untracked log line type: {}", self.0)
    }
}

impl std::error::Error for UnknownLineType {}
