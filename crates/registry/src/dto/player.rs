use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Gender, Player, SkateCategory};

/// Request payload for registering a new player
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlayerRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "First name must be between 1 and 255 characters"
    ))]
    pub first_name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Last name must be between 1 and 255 characters"
    ))]
    pub last_name: String,

    #[validate(custom(function = "validate_birth_date"))]
    pub date_of_birth: NaiveDate,

    pub gender: Gender,

    pub club_id: Option<Uuid>,

    pub category: SkateCategory,

    #[validate(email)]
    #[validate(length(max = 255))]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 20, message = "Phone must be between 6 and 20 characters"))]
    pub phone: Option<String>,
}

impl CreatePlayerRequest {
    /// New registrations start unapproved.
    pub fn into_player(self, id: Uuid) -> Player {
        Player {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: Some(self.date_of_birth),
            gender: self.gender,
            club_id: self.club_id,
            category: self.category,
            approved: false,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Request payload for updating an existing player
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlayerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_birth_date"))]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<SkateCategory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
}

impl UpdatePlayerRequest {
    pub fn approve() -> Self {
        Self {
            approved: Some(true),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, player: &mut Player) {
        if let Some(ref first_name) = self.first_name {
            player.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            player.last_name = last_name.clone();
        }
        if let Some(date_of_birth) = self.date_of_birth {
            player.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = self.gender {
            player.gender = gender;
        }
        if let Some(club_id) = self.club_id {
            player.club_id = Some(club_id);
        }
        if let Some(category) = self.category {
            player.category = category;
        }
        if let Some(approved) = self.approved {
            player.approved = approved;
        }
        if let Some(ref email) = self.email {
            player.email = Some(email.clone());
        }
        if let Some(ref phone) = self.phone {
            player.phone = Some(phone.clone());
        }
    }
}

fn validate_birth_date(date: &NaiveDate) -> Result<(), validator::ValidationError> {
    if date.year() < 1900 {
        return Err(validator::ValidationError::new("birth_date_too_old"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreatePlayerRequest {
        CreatePlayerRequest {
            first_name: "Noor".to_string(),
            last_name: "Haddad".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2013, 9, 1).unwrap(),
            gender: Gender::Female,
            club_id: None,
            category: SkateCategory::Fancy,
            email: Some("noor@example.org".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_invalid_registration_fields() {
        let mut req = request();
        req.first_name.clear();
        req.email = Some("not-an-email".to_string());
        req.date_of_birth = NaiveDate::from_ymd_opt(1850, 1, 1).unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("date_of_birth"));
    }

    #[test]
    fn test_new_players_start_unapproved() {
        let player = request().into_player(Uuid::new_v4());
        assert!(!player.approved);
        assert_eq!(player.category, SkateCategory::Fancy);
    }

    #[test]
    fn test_approve_update_only_touches_flag() {
        let mut player = request().into_player(Uuid::new_v4());
        let before = player.clone();

        UpdatePlayerRequest::approve().apply_to(&mut player);

        assert!(player.approved);
        assert_eq!(player.first_name, before.first_name);
        assert_eq!(player.date_of_birth, before.date_of_birth);
    }
}
