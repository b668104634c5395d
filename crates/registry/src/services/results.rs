use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::models::{
    Medal, ParticipantStatus, PlayerId, ROUND_COUNT, RoundScores, SCORE_DECIMAL_PLACES,
    ScheduledPlayer,
    race::is_timed_race_name,
};

/// Direction in which completed participants are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingOrder {
    /// Lowest total first, used for timed races.
    Ascending,
    /// Highest total first, used for judged races.
    Descending,
}

impl RankingOrder {
    pub fn for_race_name(race_name: &str) -> Self {
        if is_timed_race_name(race_name) {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    fn compare(&self, a: Decimal, b: Decimal) -> Ordering {
        match self {
            Self::Ascending => a.cmp(&b),
            Self::Descending => b.cmp(&a),
        }
    }
}

/// Arithmetic mean of the entered round scores, zero when none are entered,
/// rounded to [`SCORE_DECIMAL_PLACES`].
///
/// Never panics: when the plain sum overflows the mean is taken over
/// pre-divided terms, and if even that overflows the highest entered score
/// is returned.
pub fn average_score(rounds: &RoundScores) -> Decimal {
    let entered: Vec<Decimal> = rounds.iter().flatten().copied().collect();
    let Some(highest) = entered.iter().max().copied() else {
        return Decimal::ZERO;
    };
    let count = Decimal::from(entered.len());

    let mean = entered
        .iter()
        .try_fold(Decimal::ZERO, |acc, score| acc.checked_add(*score))
        .and_then(|sum| sum.checked_div(count))
        .or_else(|| {
            entered.iter().try_fold(Decimal::ZERO, |acc, score| {
                acc.checked_add(score.checked_div(count)?)
            })
        })
        .unwrap_or_else(|| {
            tracing::warn!("Score average overflowed, using highest round {}", highest);
            highest
        });

    mean.round_dp(SCORE_DECIMAL_PLACES)
}

/// Replaces the score of one round (1-based) and refreshes the participant's
/// total. Unknown participants and rounds outside `1..=ROUND_COUNT` are
/// ignored; the return value says whether anything changed.
///
/// Rank and medal are not touched: they stay as last calculated until
/// [`calculate_ranks`] runs again.
pub fn update_score(
    participants: &mut [ScheduledPlayer],
    player_id: PlayerId,
    round: usize,
    score: Option<Decimal>,
) -> bool {
    if !(1..=ROUND_COUNT).contains(&round) {
        tracing::debug!("Ignoring score for out-of-range round {}", round);
        return false;
    }

    let Some(participant) = participants.iter_mut().find(|p| p.player_id == player_id) else {
        return false;
    };

    participant.rounds[round - 1] = score;
    participant.total_score = average_score(&participant.rounds);
    true
}

pub fn update_status(
    participants: &mut [ScheduledPlayer],
    player_id: PlayerId,
    status: ParticipantStatus,
) -> bool {
    match participants.iter_mut().find(|p| p.player_id == player_id) {
        Some(participant) => {
            participant.status = status;
            true
        }
        None => false,
    }
}

/// Recomputes rank and medal for every participant from scratch.
///
/// Only completed participants are ranked; the sort is stable, so equal
/// totals keep their list order. Everyone else ends with rank 0 and no
/// medal. The slice itself is not reordered.
pub fn calculate_ranks(participants: &mut [ScheduledPlayer], race_name: &str) {
    let order = RankingOrder::for_race_name(race_name);

    let mut completed: Vec<usize> = participants
        .iter()
        .enumerate()
        .filter(|(_, p)| p.status == ParticipantStatus::Completed)
        .map(|(idx, _)| idx)
        .collect();
    completed.sort_by(|&a, &b| order.compare(participants[a].total_score, participants[b].total_score));

    for participant in participants.iter_mut() {
        participant.rank = 0;
        participant.medal = None;
    }

    for (position, idx) in completed.iter().enumerate() {
        let rank = position as u32 + 1;
        participants[*idx].rank = rank;
        participants[*idx].medal = Medal::for_rank(rank);
    }

    tracing::debug!(
        "Ranked {} of {} participants for '{}' ({:?})",
        completed.len(),
        participants.len(),
        race_name,
        order
    );
}

/// Participants in podium order: ranked ones by rank, then the unranked in
/// list order.
pub fn standings(participants: &[ScheduledPlayer]) -> Vec<&ScheduledPlayer> {
    let mut sorted: Vec<&ScheduledPlayer> = participants.iter().collect();
    sorted.sort_by_key(|p| if p.rank == 0 { u32::MAX } else { p.rank });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn completed(total: Decimal) -> ScheduledPlayer {
        let mut participant = ScheduledPlayer::new(Uuid::new_v4());
        participant.rounds[0] = Some(total);
        participant.total_score = total;
        participant.status = ParticipantStatus::Completed;
        participant
    }

    fn sample() -> Vec<ScheduledPlayer> {
        vec![
            completed(Decimal::new(125, 1)),
            completed(Decimal::new(102, 1)),
            completed(Decimal::new(150, 1)),
        ]
    }

    #[test]
    fn test_timed_race_ranks_ascending() {
        let mut participants = sample();
        calculate_ranks(&mut participants, "100m Sprint");

        let (a, b, c) = (&participants[0], &participants[1], &participants[2]);
        assert_eq!((b.rank, b.medal), (1, Some(Medal::Gold)));
        assert_eq!((a.rank, a.medal), (2, Some(Medal::Silver)));
        assert_eq!((c.rank, c.medal), (3, Some(Medal::Bronze)));
    }

    #[test]
    fn test_judged_race_ranks_descending() {
        let mut participants = sample();
        calculate_ranks(&mut participants, "Artistic Performance");

        assert_eq!(participants[2].rank, 1);
        assert_eq!(participants[0].rank, 2);
        assert_eq!(participants[1].rank, 3);
    }

    #[test]
    fn test_time_keyword_is_case_insensitive() {
        assert_eq!(RankingOrder::for_race_name("TIME TRIAL"), RankingOrder::Ascending);
        assert_eq!(RankingOrder::for_race_name("Relay SPRINT"), RankingOrder::Ascending);
        assert_eq!(RankingOrder::for_race_name("Freestyle"), RankingOrder::Descending);
    }

    #[test]
    fn test_calculate_ranks_is_idempotent() {
        let mut participants = sample();
        participants.push(ScheduledPlayer::new(Uuid::new_v4()));

        calculate_ranks(&mut participants, "Slalom");
        let once = participants.clone();
        calculate_ranks(&mut participants, "Slalom");

        assert_eq!(participants, once);
    }

    #[test]
    fn test_non_completed_are_unranked() {
        let mut participants = sample();
        participants[0].status = ParticipantStatus::Dnf;
        participants[1].status = ParticipantStatus::Dq;
        participants.push(ScheduledPlayer::new(Uuid::new_v4()));

        // Ranked once while completed, so stale ranks must be cleared.
        let mut stale = participants.clone();
        for p in stale.iter_mut() {
            p.status = ParticipantStatus::Completed;
        }
        calculate_ranks(&mut stale, "Slalom");
        for (p, s) in participants.iter_mut().zip(stale.iter()) {
            p.rank = s.rank;
            p.medal = s.medal;
        }

        calculate_ranks(&mut participants, "Slalom");

        for p in &participants {
            if p.status == ParticipantStatus::Completed {
                assert_eq!((p.rank, p.medal), (1, Some(Medal::Gold)));
            } else {
                assert_eq!((p.rank, p.medal), (0, None));
            }
        }
    }

    #[test]
    fn test_ties_keep_list_order() {
        let first = completed(Decimal::from(9));
        let second = completed(Decimal::from(9));
        let mut participants = vec![first.clone(), second.clone()];

        calculate_ranks(&mut participants, "Speed Sprint");

        assert_eq!(participants[0].player_id, first.player_id);
        assert_eq!(participants[0].rank, 1);
        assert_eq!(participants[1].rank, 2);
    }

    #[test]
    fn test_only_top_three_get_medals() {
        let mut participants: Vec<ScheduledPlayer> =
            (1..=5).map(|score| completed(Decimal::from(score))).collect();

        calculate_ranks(&mut participants, "Figures");

        let medals: Vec<Option<Medal>> = standings(&participants).iter().map(|p| p.medal).collect();
        assert_eq!(
            medals,
            vec![Some(Medal::Gold), Some(Medal::Silver), Some(Medal::Bronze), None, None]
        );
    }

    #[test]
    fn test_update_score_recomputes_mean() {
        let mut participants = vec![ScheduledPlayer::new(Uuid::new_v4())];
        let id = participants[0].player_id;

        assert!(update_score(&mut participants, id, 1, Some(Decimal::from(10))));
        assert!(update_score(&mut participants, id, 2, Some(Decimal::from(12))));
        assert_eq!(participants[0].total_score, Decimal::from(11));

        assert!(update_score(&mut participants, id, 1, None));
        assert!(update_score(&mut participants, id, 2, None));
        assert_eq!(participants[0].total_score, Decimal::ZERO);
    }

    #[test]
    fn test_huge_scores_average_without_overflow() {
        let mut participants = vec![ScheduledPlayer::new(Uuid::new_v4())];
        let id = participants[0].player_id;

        assert!(update_score(&mut participants, id, 1, Some(Decimal::MAX)));
        assert!(update_score(&mut participants, id, 2, Some(Decimal::MAX)));
        assert!(participants[0].total_score > Decimal::ZERO);
        assert!(participants[0].total_score <= Decimal::MAX);

        let rounds = [Some(Decimal::MAX), Some(Decimal::ONE), None, None, None];
        let mean = average_score(&rounds);
        assert!(mean > Decimal::ONE);
    }

    #[test]
    fn test_repeating_mean_is_rounded_and_survives_json() {
        let mut participants = vec![ScheduledPlayer::new(Uuid::new_v4())];
        let id = participants[0].player_id;

        update_score(&mut participants, id, 1, Some(Decimal::from(10)));
        update_score(&mut participants, id, 2, Some(Decimal::from(10)));
        update_score(&mut participants, id, 3, Some(Decimal::from(11)));
        assert_eq!(participants[0].total_score, Decimal::new(103333, 4));

        let json = serde_json::to_string(&participants[0]).unwrap();
        let echoed: ScheduledPlayer = serde_json::from_str(&json).unwrap();
        assert_eq!(echoed.total_score, participants[0].total_score);
        assert_eq!(echoed.total_score, average_score(&echoed.rounds));
    }

    #[test]
    fn test_average_of_no_scores_is_zero() {
        assert_eq!(average_score(&[None; ROUND_COUNT]), Decimal::ZERO);
    }

    #[test]
    fn test_update_score_ignores_bad_round_and_unknown_player() {
        let mut participants = vec![ScheduledPlayer::new(Uuid::new_v4())];
        let id = participants[0].player_id;

        assert!(!update_score(&mut participants, id, 0, Some(Decimal::ONE)));
        assert!(!update_score(&mut participants, id, 6, Some(Decimal::ONE)));
        assert!(!update_score(&mut participants, Uuid::new_v4(), 1, Some(Decimal::ONE)));
        assert_eq!(participants[0].rounds, [None; ROUND_COUNT]);
    }

    #[test]
    fn test_score_edit_leaves_rank_stale_until_recalculated() {
        let mut participants = sample();
        calculate_ranks(&mut participants, "Artistic Performance");
        let loser = participants[1].player_id;

        update_score(&mut participants, loser, 1, Some(Decimal::from(20)));
        assert_eq!(participants[1].rank, 3);

        calculate_ranks(&mut participants, "Artistic Performance");
        assert_eq!(participants[1].rank, 1);
    }

    #[test]
    fn test_update_status_keeps_scores() {
        let mut participants = sample();
        let id = participants[0].player_id;

        assert!(update_status(&mut participants, id, ParticipantStatus::Dq));
        assert_eq!(participants[0].status, ParticipantStatus::Dq);
        assert_eq!(participants[0].total_score, Decimal::new(125, 1));
        assert!(!update_status(&mut participants, Uuid::new_v4(), ParticipantStatus::Dnf));
    }
}
