use std::collections::BTreeMap;

use registry::models::{AgeGroup, Club, District, Event, Player, Race, Schedule, State};
use registry::services::RaceMatrix;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every entity array the console works with, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub districts: Vec<District>,
    #[serde(default)]
    pub clubs: Vec<Club>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub age_groups: Vec<AgeGroup>,
    #[serde(default)]
    pub races: Vec<Race>,
    /// Race matrix per event id.
    #[serde(default)]
    pub race_matrices: BTreeMap<Uuid, RaceMatrix>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}
