use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::Event;

/// Request payload for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_event_dates"))]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Event name is required"))]
    pub name: String,

    #[validate(length(max = 255))]
    pub venue: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub age_as_on_date: Option<NaiveDate>,
}

impl CreateEventRequest {
    pub fn into_event(self, id: Uuid) -> Event {
        Event {
            id,
            name: self.name,
            venue: self.venue,
            start_date: self.start_date,
            end_date: self.end_date,
            age_as_on_date: self.age_as_on_date,
        }
    }
}

fn validate_event_dates(req: &CreateEventRequest) -> Result<(), ValidationError> {
    if req.end_date < req.start_date {
        return Err(ValidationError::new("end_date_before_start_date"));
    }
    Ok(())
}
