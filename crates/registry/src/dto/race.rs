use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{AgeGroup, GenderEligibility, Race, SkateCategory};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRaceRequest {
    #[validate(length(min = 1, max = 255, message = "Race name is required"))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub gender_eligibility: GenderEligibility,
}

impl CreateRaceRequest {
    pub fn into_race(self, id: Uuid) -> Race {
        Race {
            id,
            name: self.name,
            description: self.description,
            gender_eligibility: self.gender_eligibility,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_age_range"))]
pub struct CreateAgeGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Age group name is required"))]
    pub name: String,

    #[validate(range(min = 0, max = 100))]
    pub start_age: i32,

    #[validate(range(min = 0, max = 100))]
    pub end_age: i32,
}

impl CreateAgeGroupRequest {
    pub fn into_age_group(self, id: Uuid) -> AgeGroup {
        AgeGroup {
            id,
            name: self.name,
            start_age: self.start_age,
            end_age: self.end_age,
        }
    }
}

fn validate_age_range(req: &CreateAgeGroupRequest) -> Result<(), ValidationError> {
    if req.start_age > req.end_age {
        return Err(ValidationError::new("start_age_after_end_age"));
    }
    Ok(())
}

/// Cap edit for one race matrix cell, bounded the way the entry form bounds it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMaxRacesRequest {
    pub race_id: Uuid,
    pub age_group_id: Uuid,
    pub category: SkateCategory,

    #[validate(range(min = 1, max = 10, message = "Max races per player must be between 1 and 10"))]
    pub max_races_per_player: u32,
}

/// Cap edit applied to every race of one age group/category row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRowMaxRacesRequest {
    pub age_group_id: Uuid,
    pub category: SkateCategory,

    #[validate(range(min = 1, max = 10, message = "Max races per player must be between 1 and 10"))]
    pub max_races_per_player: u32,
}
