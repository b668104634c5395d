use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{MAX_SCORE, ParticipantStatus, SCORE_DECIMAL_PLACES};

/// One round score typed into the results sheet. `score: None` clears it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreEntryRequest {
    pub player_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Round must be between 1 and 5"))]
    pub round: usize,

    #[validate(custom(function = "validate_score"))]
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub player_id: Uuid,
    pub status: ParticipantStatus,
}

fn validate_score(score: &Decimal) -> Result<(), ValidationError> {
    if score.is_sign_negative() && !score.is_zero() {
        return Err(ValidationError::new("negative_score"));
    }
    if *score > Decimal::from(MAX_SCORE) {
        return Err(ValidationError::new("score_too_large"));
    }
    if score.normalize().scale() > SCORE_DECIMAL_PLACES {
        return Err(ValidationError::new("score_too_precise"));
    }
    Ok(())
}
