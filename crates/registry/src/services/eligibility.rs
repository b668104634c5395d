use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{AgeGroup, Club, GenderEligibility, Player, SkateCategory};

/// Filter applied when picking players for a heat.
#[derive(Debug, Clone)]
pub struct EligibilityCriteria<'a> {
    pub age_group: &'a AgeGroup,
    pub category: SkateCategory,
    /// Reference date for age computation.
    pub as_of: NaiveDate,
    /// When set, the race's gender rule must admit the player.
    pub gender: Option<GenderEligibility>,
    pub search: Option<&'a str>,
}

impl<'a> EligibilityCriteria<'a> {
    pub fn new(age_group: &'a AgeGroup, category: SkateCategory, as_of: NaiveDate) -> Self {
        Self {
            age_group,
            category,
            as_of,
            gender: None,
            search: None,
        }
    }

    pub fn with_gender(mut self, gender: GenderEligibility) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_search(mut self, search: &'a str) -> Self {
        self.search = Some(search);
        self
    }
}

/// Decides whether `player` can be scheduled under `criteria`.
///
/// `club_name` is the name of the player's club, if known; the search query
/// matches against it as well as the player's full name.
pub fn is_eligible(player: &Player, club_name: Option<&str>, criteria: &EligibilityCriteria) -> bool {
    if !player.approved || player.category != criteria.category {
        return false;
    }

    let in_range = player
        .age_on(criteria.as_of)
        .is_some_and(|age| criteria.age_group.contains(age));
    if !in_range {
        return false;
    }

    if let Some(rule) = criteria.gender
        && !rule.admits(player.gender)
    {
        return false;
    }

    match criteria.search.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => matches_search(player, club_name, query),
        None => true,
    }
}

/// Players eligible under `criteria`, in input order.
pub fn eligible_players<'p>(
    players: &'p [Player],
    clubs: &[Club],
    criteria: &EligibilityCriteria,
) -> Vec<&'p Player> {
    let club_names: HashMap<Uuid, &str> = clubs
        .iter()
        .map(|club| (club.id, club.name.as_str()))
        .collect();

    let eligible: Vec<&Player> = players
        .iter()
        .filter(|player| {
            let club_name = player
                .club_id
                .and_then(|id| club_names.get(&id).copied());
            is_eligible(player, club_name, criteria)
        })
        .collect();

    tracing::debug!(
        "{} of {} players eligible for '{}' ({})",
        eligible.len(),
        players.len(),
        criteria.age_group.name,
        criteria.category
    );

    eligible
}

fn matches_search(player: &Player, club_name: Option<&str>, query: &str) -> bool {
    let query = query.to_lowercase();
    player.full_name().to_lowercase().contains(&query)
        || club_name.is_some_and(|name| name.to_lowercase().contains(&query))
}
