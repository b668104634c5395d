use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::models::SkateCategory;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Race {race_id} is not enabled for age group {age_group_id} ({category})")]
    RaceDisabled {
        race_id: Uuid,
        age_group_id: Uuid,
        category: SkateCategory,
    },

    #[error("Player {player_id} already entered {entered} of {cap} allowed races")]
    RaceCapExceeded {
        player_id: Uuid,
        entered: u32,
        cap: u32,
    },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
