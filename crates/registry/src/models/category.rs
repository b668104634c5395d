use serde::{Deserialize, Serialize};

use crate::RegistryError;

/// Skate discipline a player is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkateCategory {
    Beginner,
    Fancy,
    Inline,
    Quad,
}

impl SkateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Fancy => "fancy",
            Self::Inline => "inline",
            Self::Quad => "quad",
        }
    }

    pub fn all() -> &'static [SkateCategory] {
        &[Self::Beginner, Self::Fancy, Self::Inline, Self::Quad]
    }

    fn parse_str(s: &str) -> Result<Self, RegistryError> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| {
                RegistryError::InvalidValue(format!(
                    "unknown category '{}'. Available: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl TryFrom<&str> for SkateCategory {
    type Error = RegistryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse_str(value)
    }
}

impl std::str::FromStr for SkateCategory {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for SkateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
