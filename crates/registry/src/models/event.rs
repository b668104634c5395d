use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Reference date for age eligibility, when the organiser fixed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_as_on_date: Option<NaiveDate>,
}

impl Event {
    /// The date ages are computed against for this event.
    pub fn age_reference_date(&self) -> NaiveDate {
        self.age_as_on_date.unwrap_or(self.start_date)
    }
}
