use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Gender;
use crate::RegistryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderEligibility {
    Male,
    Female,
    #[default]
    #[serde(alias = "all", alias = "both")]
    Mixed,
}

impl GenderEligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Mixed => "mixed",
        }
    }

    pub fn admits(&self, gender: Gender) -> bool {
        match self {
            Self::Male => gender == Gender::Male,
            Self::Female => gender == Gender::Female,
            Self::Mixed => true,
        }
    }
}

impl std::str::FromStr for GenderEligibility {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "mixed" | "all" | "both" => Ok(Self::Mixed),
            other => Err(RegistryError::InvalidValue(format!(
                "unknown gender eligibility '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for GenderEligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub gender_eligibility: GenderEligibility,
}

impl Race {
    /// Timed races rank the lowest score first.
    pub fn is_timed(&self) -> bool {
        is_timed_race_name(&self.name)
    }
}

/// A race counts as timed when its name mentions "sprint" or "time",
/// in any letter case.
pub fn is_timed_race_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("sprint") || name.contains("time")
}
