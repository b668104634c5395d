use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Club, Medal, Player, PlayerId, Schedule};

pub const UNATTACHED_CLUB_NAME: &str = "Unattached";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClubMedalTally {
    pub club_id: Option<Uuid>,
    pub club_name: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

impl ClubMedalTally {
    fn empty(club_id: Option<Uuid>, club_name: String) -> Self {
        Self {
            club_id,
            club_name,
            gold: 0,
            silver: 0,
            bronze: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.gold + self.silver + self.bronze
    }

    fn record(&mut self, medal: Medal) {
        match medal {
            Medal::Gold => self.gold += 1,
            Medal::Silver => self.silver += 1,
            Medal::Bronze => self.bronze += 1,
        }
    }
}

/// Medals per club across the given schedules, best club first.
///
/// Clubs are ordered by gold, then silver, then bronze count, then name.
/// Medals of players without a known club are grouped under
/// [`UNATTACHED_CLUB_NAME`].
pub fn medal_tally(schedules: &[Schedule], players: &[Player], clubs: &[Club]) -> Vec<ClubMedalTally> {
    let player_clubs: HashMap<PlayerId, Option<Uuid>> =
        players.iter().map(|p| (p.id, p.club_id)).collect();
    let club_names: HashMap<Uuid, &str> = clubs.iter().map(|c| (c.id, c.name.as_str())).collect();

    let mut tallies: HashMap<Option<Uuid>, ClubMedalTally> = HashMap::new();

    for participant in schedules.iter().flat_map(|s| s.players.iter()) {
        let Some(medal) = participant.medal else {
            continue;
        };

        let club_id = player_clubs
            .get(&participant.player_id)
            .copied()
            .flatten()
            .filter(|id| club_names.contains_key(id));

        tallies
            .entry(club_id)
            .or_insert_with(|| {
                let name = club_id
                    .and_then(|id| club_names.get(&id).copied())
                    .unwrap_or(UNATTACHED_CLUB_NAME);
                ClubMedalTally::empty(club_id, name.to_string())
            })
            .record(medal);
    }

    let mut tallies: Vec<ClubMedalTally> = tallies.into_values().collect();
    tallies.sort_by(|a, b| {
        b.gold
            .cmp(&a.gold)
            .then(b.silver.cmp(&a.silver))
            .then(b.bronze.cmp(&a.bronze))
            .then_with(|| a.club_name.cmp(&b.club_name))
    });
    tallies
}
