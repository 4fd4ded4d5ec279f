//! Learner proficiency tiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared proficiency of the learner
///
/// Selects the register and vocabulary constraints in the system prompt.
/// Parsing is infallible: anything that is not a known tier becomes
/// [`ProficiencyTier::Unspecified`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProficiencyTier {
    /// Simple vocabulary, short sentences
    #[default]
    Beginner,
    /// Moderate vocabulary, mostly Japanese
    Intermediate,
    /// Natural, fluent Japanese
    Advanced,
    /// Unrecognized tier; uses the generic instructions
    Unspecified,
}

impl ProficiencyTier {
    /// All selectable tiers, in ascending order
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Parse a tier name, case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Unspecified,
        }
    }

    /// Lowercase tier name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for ProficiencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProficiencyTier {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ProficiencyTier {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ProficiencyTier> for String {
    fn from(tier: ProficiencyTier) -> Self {
        tier.as_str().to_string()
    }
}
