use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Club, District, State};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStateRequest {
    #[validate(length(min = 1, max = 255, message = "State name is required"))]
    pub name: String,

    #[validate(length(min = 2, max = 3, message = "State code must be 2 or 3 characters"))]
    pub code: String,
}

impl CreateStateRequest {
    pub fn into_state(self, id: Uuid) -> State {
        State {
            id,
            name: self.name,
            code: self.code.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDistrictRequest {
    #[validate(length(min = 1, max = 255, message = "District name is required"))]
    pub name: String,

    pub state_id: Uuid,
}

impl CreateDistrictRequest {
    pub fn into_district(self, id: Uuid) -> District {
        District {
            id,
            name: self.name,
            state_id: self.state_id,
        }
    }
}

/// Request payload for creating a new club
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClubRequest {
    #[validate(length(min = 1, max = 255, message = "Club name is required"))]
    pub name: String,

    pub district_id: Option<Uuid>,

    #[validate(email)]
    pub contact_email: Option<String>,
}

impl CreateClubRequest {
    pub fn into_club(self, id: Uuid) -> Club {
        Club {
            id,
            name: self.name,
            district_id: self.district_id,
            contact_email: self.contact_email,
        }
    }
}

/// Request payload for updating an existing club
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateClubRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub contact_email: Option<String>,
}

impl UpdateClubRequest {
    pub fn apply_to(&self, club: &mut Club) {
        if let Some(ref name) = self.name {
            club.name = name.clone();
        }
        if let Some(district_id) = self.district_id {
            club.district_id = Some(district_id);
        }
        if let Some(ref contact_email) = self.contact_email {
            club.contact_email = Some(contact_email.clone());
        }
    }
}
