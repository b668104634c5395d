use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive integer age range used to bucket players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroup {
    pub id: Uuid,
    pub name: String,
    pub start_age: i32,
    pub end_age: i32,
}

impl AgeGroup {
    pub fn contains(&self, age: i32) -> bool {
        self.start_age <= age && age <= self.end_age
    }
}
