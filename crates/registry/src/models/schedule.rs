use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PlayerId, SkateCategory};
use crate::RegistryError;

/// Number of scoring rounds a participant can be given.
pub const ROUND_COUNT: usize = 5;

pub type RoundScores = [Option<Decimal>; ROUND_COUNT];

/// Precision kept for round scores and averages; survives a trip through
/// an f64 JSON number unchanged.
pub const SCORE_DECIMAL_PLACES: u32 = 4;

/// Largest score accepted from the results sheet, in seconds or points.
pub const MAX_SCORE: i64 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    #[default]
    Pending,
    Completed,
    Dnf,
    Dq,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Dnf => "dnf",
            Self::Dq => "dq",
        }
    }

    /// Score inputs are locked for participants who did not finish or were
    /// disqualified.
    pub fn locks_scores(&self) -> bool {
        matches!(self, Self::Dnf | Self::Dq)
    }
}

impl std::str::FromStr for ParticipantStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "dnf" => Ok(Self::Dnf),
            "dq" => Ok(Self::Dq),
            other => Err(RegistryError::InvalidValue(format!(
                "unknown status '{}'. Available: pending, completed, dnf, dq",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
        }
    }
}

impl std::fmt::Display for Medal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPlayer {
    pub player_id: PlayerId,
    #[serde(default)]
    pub rounds: RoundScores,
    #[serde(default)]
    pub total_score: Decimal,
    /// 1-based position among completed participants, 0 when unranked.
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub status: ParticipantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medal: Option<Medal>,
}

impl ScheduledPlayer {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            rounds: [None; ROUND_COUNT],
            total_score: Decimal::ZERO,
            rank: 0,
            status: ParticipantStatus::Pending,
            medal: None,
        }
    }
}

/// One heat of a race for a single age group and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub event_id: Uuid,
    pub race_id: Uuid,
    pub age_group_id: Uuid,
    pub category: SkateCategory,
    pub heat: u32,
    #[serde(default)]
    pub players: Vec<ScheduledPlayer>,
    #[serde(default)]
    pub results_entered: bool,
}

impl Schedule {
    pub fn participant(&self, player_id: PlayerId) -> Option<&ScheduledPlayer> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn contains_player(&self, player_id: PlayerId) -> bool {
        self.participant(player_id).is_some()
    }

    pub fn mark_results_entered(&mut self) {
        self.results_entered = true;
    }
}
