use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SkateCategory;

pub const DEFAULT_MAX_RACES_PER_PLAYER: u32 = 1;

/// Identifies one cell of the race matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixKey {
    pub race_id: Uuid,
    pub age_group_id: Uuid,
    pub category: SkateCategory,
}

impl MatrixKey {
    pub fn new(race_id: Uuid, age_group_id: Uuid, category: SkateCategory) -> Self {
        Self {
            race_id,
            age_group_id,
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceMatrixEntry {
    pub race_id: Uuid,
    pub age_group_id: Uuid,
    pub category: SkateCategory,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default = "default_max_races")]
    pub max_races_per_player: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_max_races() -> u32 {
    DEFAULT_MAX_RACES_PER_PLAYER
}

impl RaceMatrixEntry {
    pub fn new(key: MatrixKey) -> Self {
        Self {
            race_id: key.race_id,
            age_group_id: key.age_group_id,
            category: key.category,
            is_enabled: true,
            max_races_per_player: DEFAULT_MAX_RACES_PER_PLAYER,
        }
    }

    pub fn key(&self) -> MatrixKey {
        MatrixKey::new(self.race_id, self.age_group_id, self.category)
    }

    pub fn matches(&self, key: &MatrixKey) -> bool {
        self.key() == *key
    }
}
