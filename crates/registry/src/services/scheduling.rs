use std::collections::HashSet;

use uuid::Uuid;

use super::race_matrix::RaceMatrix;
use crate::error::{RegistryError, Result};
use crate::models::{MatrixKey, PlayerId, Schedule, ScheduledPlayer};

/// Splits an ordered list of players into consecutive heats of at most
/// `heat_size` players. A size of zero is treated as one.
pub fn plan_heats(player_ids: &[PlayerId], heat_size: usize) -> Vec<Vec<PlayerId>> {
    player_ids
        .chunks(heat_size.max(1))
        .map(<[PlayerId]>::to_vec)
        .collect()
}

/// Builds one schedule per planned heat, numbering heats from `first_heat`.
pub fn build_heats(
    event_id: Uuid,
    key: MatrixKey,
    player_ids: &[PlayerId],
    heat_size: usize,
    first_heat: u32,
) -> Vec<Schedule> {
    plan_heats(player_ids, heat_size)
        .into_iter()
        .enumerate()
        .map(|(idx, heat_players)| Schedule {
            id: Uuid::new_v4(),
            event_id,
            race_id: key.race_id,
            age_group_id: key.age_group_id,
            category: key.category,
            heat: first_heat + idx as u32,
            players: heat_players.into_iter().map(ScheduledPlayer::new).collect(),
            results_entered: false,
        })
        .collect()
}

/// Number of distinct races of one age group/category row a player is
/// already scheduled into.
pub fn races_entered(schedules: &[Schedule], player_id: PlayerId, key: &MatrixKey) -> u32 {
    schedules
        .iter()
        .filter(|s| s.age_group_id == key.age_group_id && s.category == key.category)
        .filter(|s| s.contains_player(player_id))
        .map(|s| s.race_id)
        .collect::<HashSet<_>>()
        .len() as u32
}

/// Checks that `player_id` may be entered into the race identified by `key`.
pub fn check_race_cap(
    matrix: &RaceMatrix,
    schedules: &[Schedule],
    player_id: PlayerId,
    key: &MatrixKey,
) -> Result<()> {
    let cap = matrix.cap_for(key).ok_or(RegistryError::RaceDisabled {
        race_id: key.race_id,
        age_group_id: key.age_group_id,
        category: key.category,
    })?;

    let already_in_race = schedules.iter().any(|s| {
        s.race_id == key.race_id
            && s.age_group_id == key.age_group_id
            && s.category == key.category
            && s.contains_player(player_id)
    });
    if already_in_race {
        return Err(RegistryError::ConstraintViolation(format!(
            "player {} is already scheduled in race {}",
            player_id, key.race_id
        )));
    }

    let entered = races_entered(schedules, player_id, key);
    if entered >= cap {
        return Err(RegistryError::RaceCapExceeded {
            player_id,
            entered,
            cap,
        });
    }

    Ok(())
}
