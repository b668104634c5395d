use std::sync::Arc;

use chrono::NaiveDate;
use registry::RegistryError;
use registry::dto::race::{UpdateMaxRacesRequest, UpdateRowMaxRacesRequest};
use registry::dto::results::{ScoreEntryRequest, StatusUpdateRequest};
use registry::models::{
    AgeGroup, Club, Event, MatrixKey, Player, PlayerId, Race, Schedule, SkateCategory,
};
use registry::services::scheduling::{build_heats, check_race_cap};
use registry::services::{
    ClubMedalTally, EligibilityCriteria, RaceMatrix, eligible_players, medal_tally, race_matrix,
    results,
};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::traits::RegistryBackend;
use crate::{ConsoleError, Result};

/// The event official's working copy of one event.
///
/// `load` always starts from a fresh snapshot of the backend; edits are
/// applied locally and only reach the backend through the explicit
/// `save_*`, `remove_*` and `schedule_heats` calls. A failed save leaves
/// local edits in place.
pub struct EventDesk {
    backend: Arc<dyn RegistryBackend>,
    event: Event,
    players: Vec<Player>,
    clubs: Vec<Club>,
    age_groups: Vec<AgeGroup>,
    races: Vec<Race>,
    matrix: RaceMatrix,
    schedules: Vec<Schedule>,
}

impl EventDesk {
    pub async fn load(backend: Arc<dyn RegistryBackend>, event_id: Uuid) -> Result<Self> {
        info!("Loading event {} from {}", event_id, backend.name());

        let event = backend.get_event(event_id).await?;
        let players = backend.list_players().await?;
        let clubs = backend.list_clubs().await?;
        let age_groups = backend.list_age_groups().await?;
        let races = backend.list_races().await?;
        let mut matrix = backend.get_race_matrix(event_id).await?;
        let schedules = backend.list_schedules(event_id).await?;

        matrix.prune_orphans(&races, &age_groups);

        info!(
            "Loaded '{}': {} players, {} races, {} age groups, {} matrix cells, {} heats",
            event.name,
            players.len(),
            races.len(),
            age_groups.len(),
            matrix.len(),
            schedules.len()
        );

        Ok(Self {
            backend,
            event,
            players,
            clubs,
            age_groups,
            races,
            matrix,
            schedules,
        })
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn clubs(&self) -> &[Club] {
        &self.clubs
    }

    pub fn age_groups(&self) -> &[AgeGroup] {
        &self.age_groups
    }

    pub fn races(&self) -> &[Race] {
        &self.races
    }

    pub fn matrix(&self) -> &RaceMatrix {
        &self.matrix
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    /// Reference date for every age computed at this desk.
    pub fn as_of(&self) -> NaiveDate {
        self.event.age_reference_date()
    }

    pub fn race(&self, race_id: Uuid) -> Result<&Race> {
        self.races
            .iter()
            .find(|r| r.id == race_id)
            .ok_or_else(|| ConsoleError::NotFound(format!("race {}", race_id)))
    }

    pub fn age_group(&self, age_group_id: Uuid) -> Result<&AgeGroup> {
        self.age_groups
            .iter()
            .find(|g| g.id == age_group_id)
            .ok_or_else(|| ConsoleError::NotFound(format!("age group {}", age_group_id)))
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn schedule(&self, schedule_id: Uuid) -> Result<&Schedule> {
        let idx = self.schedule_index(schedule_id)?;
        Ok(&self.schedules[idx])
    }

    fn schedule_index(&self, schedule_id: Uuid) -> Result<usize> {
        self.schedules
            .iter()
            .position(|s| s.id == schedule_id)
            .ok_or_else(|| ConsoleError::NotFound(format!("schedule {}", schedule_id)))
    }

    /// Toggles one matrix cell. Both the race and the age group must exist,
    /// so the matrix never gains a dangling reference.
    pub fn toggle_race(
        &mut self,
        race_id: Uuid,
        age_group_id: Uuid,
        category: SkateCategory,
    ) -> Result<bool> {
        self.race(race_id)?;
        self.age_group(age_group_id)?;

        let present = self.matrix.toggle(race_id, age_group_id, category);
        debug!(
            "Race {} / age group {} / {} is now {}",
            race_id,
            age_group_id,
            category,
            if present { "open" } else { "closed" }
        );
        Ok(present)
    }

    pub fn set_max_races(&mut self, request: &UpdateMaxRacesRequest) -> Result<bool> {
        request.validate()?;

        Ok(self.matrix.update_max_races(
            request.race_id,
            request.age_group_id,
            request.category,
            request.max_races_per_player,
        ))
    }

    /// Applies one cap to every race of an age group/category row.
    pub fn set_row_max_races(&mut self, request: &UpdateRowMaxRacesRequest) -> Result<usize> {
        request.validate()?;

        let race_ids: Vec<Uuid> = self.races.iter().map(|r| r.id).collect();
        Ok(self.matrix.update_row_max_races(
            &race_ids,
            request.age_group_id,
            request.category,
            request.max_races_per_player,
        ))
    }

    pub fn set_race_enabled(
        &mut self,
        race_id: Uuid,
        age_group_id: Uuid,
        category: SkateCategory,
        enabled: bool,
    ) -> bool {
        self.matrix
            .set_enabled(race_id, age_group_id, category, enabled)
    }

    pub async fn save_matrix(&self) -> Result<()> {
        self.backend
            .save_race_matrix(self.event.id, &self.matrix)
            .await?;
        info!("Saved race matrix ({} cells)", self.matrix.len());
        Ok(())
    }

    /// Deletes a race on the backend, which cascades to every event's matrix
    /// and heats, then mirrors that locally and saves this event's matrix.
    /// Returns how many local cells were dropped.
    pub async fn remove_race(&mut self, race_id: Uuid) -> Result<usize> {
        self.race(race_id)?;
        self.backend.delete_race(race_id).await?;

        let dropped = race_matrix::remove_race(&mut self.races, &mut self.matrix, race_id);
        self.schedules.retain(|s| s.race_id != race_id);
        info!("Removed race {} and {} matrix cells", race_id, dropped);

        self.save_matrix().await?;
        Ok(dropped)
    }

    /// Deletes an age group on the backend, which cascades like
    /// [`Self::remove_race`]. Returns how many local cells were dropped.
    pub async fn remove_age_group(&mut self, age_group_id: Uuid) -> Result<usize> {
        self.age_group(age_group_id)?;
        self.backend.delete_age_group(age_group_id).await?;

        let dropped =
            race_matrix::remove_age_group(&mut self.age_groups, &mut self.matrix, age_group_id);
        self.schedules.retain(|s| s.age_group_id != age_group_id);
        info!("Removed age group {} and {} matrix cells", age_group_id, dropped);

        self.save_matrix().await?;
        Ok(dropped)
    }

    /// Players who may race in the given matrix cell, in registry order.
    pub fn eligible_players(&self, key: &MatrixKey, search: Option<&str>) -> Result<Vec<&Player>> {
        let race = self.race(key.race_id)?;
        let age_group = self.age_group(key.age_group_id)?;

        let mut criteria = EligibilityCriteria::new(age_group, key.category, self.as_of())
            .with_gender(race.gender_eligibility);
        if let Some(search) = search {
            criteria = criteria.with_search(search);
        }

        Ok(eligible_players(&self.players, &self.clubs, &criteria))
    }

    pub fn eligible_for_schedule(
        &self,
        schedule_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<&Player>> {
        let schedule = self.schedule(schedule_id)?;
        let key = MatrixKey::new(schedule.race_id, schedule.age_group_id, schedule.category);
        self.eligible_players(&key, search)
    }

    /// Creates heats for every eligible player who is not yet in this race
    /// and still has room under the row's race cap.
    pub async fn schedule_heats(&mut self, key: MatrixKey, heat_size: usize) -> Result<Vec<Schedule>> {
        if !self.matrix.is_enabled(&key) {
            return Err(RegistryError::RaceDisabled {
                race_id: key.race_id,
                age_group_id: key.age_group_id,
                category: key.category,
            }
            .into());
        }

        let candidates: Vec<PlayerId> = self
            .eligible_players(&key, None)?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let accepted: Vec<PlayerId> = candidates
            .into_iter()
            .filter(|player_id| {
                match check_race_cap(&self.matrix, &self.schedules, *player_id, &key) {
                    Ok(()) => true,
                    Err(e) => {
                        debug!("Skipping player {}: {}", player_id, e);
                        false
                    }
                }
            })
            .collect();

        if accepted.is_empty() {
            warn!("No players left to schedule for race {}", key.race_id);
            return Ok(Vec::new());
        }

        let first_heat = self
            .schedules
            .iter()
            .filter(|s| {
                s.race_id == key.race_id
                    && s.age_group_id == key.age_group_id
                    && s.category == key.category
            })
            .map(|s| s.heat)
            .max()
            .unwrap_or(0)
            + 1;

        let planned = build_heats(self.event.id, key, &accepted, heat_size, first_heat);
        let mut created = Vec::with_capacity(planned.len());

        for schedule in &planned {
            let saved = self.backend.create_schedule(schedule).await?;
            self.schedules.push(saved.clone());
            created.push(saved);
        }

        info!(
            "Scheduled {} players into {} heats",
            accepted.len(),
            created.len()
        );
        Ok(created)
    }

    /// Enters one round score. Scores of participants marked DNF or DQ are
    /// locked.
    pub fn enter_score(&mut self, schedule_id: Uuid, request: &ScoreEntryRequest) -> Result<bool> {
        request.validate()?;

        let idx = self.schedule_index(schedule_id)?;
        let schedule = &mut self.schedules[idx];

        let participant = schedule.participant(request.player_id).ok_or_else(|| {
            ConsoleError::NotFound(format!(
                "player {} in schedule {}",
                request.player_id, schedule_id
            ))
        })?;
        if participant.status.locks_scores() {
            return Err(ConsoleError::Rejected(format!(
                "scores are locked for a participant marked {}",
                participant.status
            )));
        }

        Ok(results::update_score(
            &mut schedule.players,
            request.player_id,
            request.round,
            request.score,
        ))
    }

    pub fn set_status(&mut self, schedule_id: Uuid, request: &StatusUpdateRequest) -> Result<bool> {
        let idx = self.schedule_index(schedule_id)?;
        let updated = results::update_status(
            &mut self.schedules[idx].players,
            request.player_id,
            request.status,
        );

        if !updated {
            return Err(ConsoleError::NotFound(format!(
                "player {} in schedule {}",
                request.player_id, schedule_id
            )));
        }
        Ok(true)
    }

    pub fn calculate_ranks(&mut self, schedule_id: Uuid) -> Result<&Schedule> {
        let idx = self.schedule_index(schedule_id)?;
        let race_name = self.race(self.schedules[idx].race_id)?.name.clone();

        results::calculate_ranks(&mut self.schedules[idx].players, &race_name);
        Ok(&self.schedules[idx])
    }

    /// Flushes a heat's current scores and statuses without finalising it.
    pub async fn save_schedule(&mut self, schedule_id: Uuid) -> Result<&Schedule> {
        let idx = self.schedule_index(schedule_id)?;

        let saved = self.backend.save_schedule(&self.schedules[idx]).await?;
        self.schedules[idx] = saved;
        Ok(&self.schedules[idx])
    }

    /// Marks the heat's results as entered and flushes it to the backend.
    pub async fn save_results(&mut self, schedule_id: Uuid) -> Result<&Schedule> {
        let idx = self.schedule_index(schedule_id)?;
        self.schedules[idx].mark_results_entered();

        let saved = self.backend.save_schedule(&self.schedules[idx]).await?;
        self.schedules[idx] = saved;

        info!("Saved results for schedule {}", schedule_id);
        Ok(&self.schedules[idx])
    }

    pub fn medal_tally(&self) -> Vec<ClubMedalTally> {
        medal_tally(&self.schedules, &self.players, &self.clubs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{FixtureBackend, Snapshot};
    use registry::models::{
        Gender, GenderEligibility, Medal, ParticipantStatus, RaceMatrixEntry,
    };
    use rust_decimal::Decimal;

    struct Fixture {
        snapshot: Snapshot,
        event_id: Uuid,
        group_id: Uuid,
        sprint_id: Uuid,
        artistic_id: Uuid,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn player(
        first: &str,
        gender: Gender,
        dob: NaiveDate,
        category: SkateCategory,
        approved: bool,
        club_id: Option<Uuid>,
    ) -> Player {
        Player {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            date_of_birth: Some(dob),
            gender,
            club_id,
            category,
            approved,
            email: None,
            phone: None,
        }
    }

    fn fixture() -> Fixture {
        let event = Event {
            id: Uuid::new_v4(),
            name: "District Open".to_string(),
            venue: Some("City Rink".to_string()),
            start_date: date(2025, 3, 8),
            end_date: date(2025, 3, 9),
            age_as_on_date: Some(date(2025, 1, 1)),
        };
        let club = Club {
            id: Uuid::new_v4(),
            name: "Rolling Thunder".to_string(),
            district_id: None,
            contact_email: None,
        };
        let group = AgeGroup {
            id: Uuid::new_v4(),
            name: "10-12".to_string(),
            start_age: 10,
            end_age: 12,
        };
        let sprint = Race {
            id: Uuid::new_v4(),
            name: "200m Sprint".to_string(),
            description: None,
            gender_eligibility: GenderEligibility::Mixed,
        };
        let artistic = Race {
            id: Uuid::new_v4(),
            name: "Artistic Freestyle".to_string(),
            description: None,
            gender_eligibility: GenderEligibility::Female,
        };

        let quad = SkateCategory::Quad;
        let players = vec![
            player("Asha", Gender::Female, date(2014, 5, 1), quad, true, Some(club.id)),
            player("Ben", Gender::Male, date(2013, 2, 1), quad, true, None),
            player("Cara", Gender::Female, date(2012, 12, 31), quad, true, Some(club.id)),
            player("Dev", Gender::Male, date(2014, 5, 1), quad, false, None),
            player("Eli", Gender::Male, date(2013, 1, 1), SkateCategory::Inline, true, None),
            player("Fay", Gender::Female, date(2015, 6, 1), quad, true, None),
        ];

        let mut matrix = RaceMatrix::default();
        matrix.toggle(sprint.id, group.id, quad);
        matrix.toggle(artistic.id, group.id, quad);

        let mut snapshot = Snapshot {
            clubs: vec![club],
            players,
            events: vec![event.clone()],
            age_groups: vec![group.clone()],
            races: vec![sprint.clone(), artistic.clone()],
            ..Snapshot::default()
        };
        snapshot.race_matrices.insert(event.id, matrix);

        Fixture {
            snapshot,
            event_id: event.id,
            group_id: group.id,
            sprint_id: sprint.id,
            artistic_id: artistic.id,
        }
    }

    async fn open(fixture: &Fixture) -> (Arc<FixtureBackend>, EventDesk) {
        let backend = Arc::new(FixtureBackend::new(fixture.snapshot.clone()));
        let desk = EventDesk::load(backend.clone(), fixture.event_id).await.unwrap();
        (backend, desk)
    }

    fn first_names(players: &[&Player]) -> Vec<String> {
        players.iter().map(|p| p.first_name.clone()).collect()
    }

    #[tokio::test]
    async fn test_load_prunes_dangling_matrix_cells() {
        let mut fixture = fixture();
        let matrix = fixture.snapshot.race_matrices.get_mut(&fixture.event_id).unwrap();
        *matrix = RaceMatrix::new(
            matrix
                .entries()
                .iter()
                .cloned()
                .chain(std::iter::once(RaceMatrixEntry::new(MatrixKey::new(
                    Uuid::new_v4(),
                    fixture.group_id,
                    SkateCategory::Quad,
                ))))
                .collect(),
        );

        let (_, desk) = open(&fixture).await;

        assert_eq!(desk.matrix().len(), 2);
        assert_eq!(desk.as_of(), date(2025, 1, 1));
    }

    #[tokio::test]
    async fn test_eligibility_uses_event_reference_date_and_gender_rule() {
        let fixture = fixture();
        let (_, desk) = open(&fixture).await;

        let sprint = MatrixKey::new(fixture.sprint_id, fixture.group_id, SkateCategory::Quad);
        let artistic = MatrixKey::new(fixture.artistic_id, fixture.group_id, SkateCategory::Quad);

        assert_eq!(
            first_names(&desk.eligible_players(&sprint, None).unwrap()),
            vec!["Asha", "Ben", "Cara"]
        );
        assert_eq!(
            first_names(&desk.eligible_players(&artistic, None).unwrap()),
            vec!["Asha", "Cara"]
        );
        assert_eq!(
            first_names(&desk.eligible_players(&sprint, Some("thunder")).unwrap()),
            vec!["Asha", "Cara"]
        );
    }

    #[tokio::test]
    async fn test_schedule_heats_respects_race_cap() {
        let fixture = fixture();
        let (backend, mut desk) = open(&fixture).await;
        let sprint = MatrixKey::new(fixture.sprint_id, fixture.group_id, SkateCategory::Quad);
        let artistic = MatrixKey::new(fixture.artistic_id, fixture.group_id, SkateCategory::Quad);

        let heats = desk.schedule_heats(sprint, 2).await.unwrap();
        assert_eq!(heats.iter().map(|s| s.heat).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(heats[0].players.len(), 2);

        // Everybody is already in the sprint.
        assert!(desk.schedule_heats(sprint, 2).await.unwrap().is_empty());

        // Default cap of one race per row keeps the sprinters out.
        assert!(desk.schedule_heats(artistic, 8).await.unwrap().is_empty());

        let raised = desk
            .set_row_max_races(&UpdateRowMaxRacesRequest {
                age_group_id: fixture.group_id,
                category: SkateCategory::Quad,
                max_races_per_player: 2,
            })
            .unwrap();
        assert_eq!(raised, 2);

        let heats = desk.schedule_heats(artistic, 8).await.unwrap();
        assert_eq!(heats.len(), 1);
        assert_eq!(heats[0].players.len(), 2);

        let stored = backend.list_schedules(fixture.event_id).await.unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_schedule_heats_rejects_closed_cell() {
        let fixture = fixture();
        let (_, mut desk) = open(&fixture).await;

        desk.toggle_race(fixture.sprint_id, fixture.group_id, SkateCategory::Quad)
            .unwrap();
        let key = MatrixKey::new(fixture.sprint_id, fixture.group_id, SkateCategory::Quad);

        let err = desk.schedule_heats(key, 4).await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::RegistryError(RegistryError::RaceDisabled { .. })
        ));
    }

    #[tokio::test]
    async fn test_results_entry_ranking_and_save() {
        let fixture = fixture();
        let (backend, mut desk) = open(&fixture).await;
        let sprint = MatrixKey::new(fixture.sprint_id, fixture.group_id, SkateCategory::Quad);

        let heat = desk.schedule_heats(sprint, 8).await.unwrap().remove(0);
        let ids: Vec<PlayerId> = heat.players.iter().map(|p| p.player_id).collect();

        let times = [Decimal::new(125, 1), Decimal::new(102, 1), Decimal::new(150, 1)];
        for (player_id, time) in ids.iter().zip(times) {
            let entry = ScoreEntryRequest {
                player_id: *player_id,
                round: 1,
                score: Some(time),
            };
            assert!(desk.enter_score(heat.id, &entry).unwrap());
            desk.set_status(
                heat.id,
                &StatusUpdateRequest {
                    player_id: *player_id,
                    status: ParticipantStatus::Completed,
                },
            )
            .unwrap();
        }

        let ranked = desk.calculate_ranks(heat.id).unwrap();
        let medals: Vec<(u32, Option<Medal>)> =
            ranked.players.iter().map(|p| (p.rank, p.medal)).collect();
        assert_eq!(
            medals,
            vec![
                (2, Some(Medal::Silver)),
                (1, Some(Medal::Gold)),
                (3, Some(Medal::Bronze)),
            ]
        );

        desk.save_results(heat.id).await.unwrap();

        let stored = backend.list_schedules(fixture.event_id).await.unwrap();
        let stored = stored.iter().find(|s| s.id == heat.id).unwrap();
        assert!(stored.results_entered);
        assert_eq!(stored.players[1].medal, Some(Medal::Gold));

        // Ben has no club, so the unattached gold outranks the club's two medals.
        let tally = desk.medal_tally();
        assert_eq!(tally.len(), 2);
        assert_eq!(tally[0].club_id, None);
        assert_eq!(tally[1].club_name, "Rolling Thunder");
        assert_eq!((tally[1].gold, tally[1].silver, tally[1].bronze), (0, 1, 1));
    }

    #[tokio::test]
    async fn test_scores_locked_for_disqualified() {
        let fixture = fixture();
        let (_, mut desk) = open(&fixture).await;
        let sprint = MatrixKey::new(fixture.sprint_id, fixture.group_id, SkateCategory::Quad);
        let heat = desk.schedule_heats(sprint, 8).await.unwrap().remove(0);
        let player_id = heat.players[0].player_id;

        desk.set_status(
            heat.id,
            &StatusUpdateRequest {
                player_id,
                status: ParticipantStatus::Dq,
            },
        )
        .unwrap();

        let entry = ScoreEntryRequest {
            player_id,
            round: 1,
            score: Some(Decimal::ONE),
        };
        assert!(matches!(
            desk.enter_score(heat.id, &entry),
            Err(ConsoleError::Rejected(_))
        ));

        let bad_round = ScoreEntryRequest {
            player_id: heat.players[1].player_id,
            round: 9,
            score: Some(Decimal::ONE),
        };
        assert!(matches!(
            desk.enter_score(heat.id, &bad_round),
            Err(ConsoleError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_race_cascades_and_persists_matrix() {
        let fixture = fixture();
        let (backend, mut desk) = open(&fixture).await;

        let dropped = desk.remove_race(fixture.sprint_id).await.unwrap();

        assert_eq!(dropped, 1);
        assert!(desk.race(fixture.sprint_id).is_err());
        let stored = backend.get_race_matrix(fixture.event_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored.entries().iter().all(|e| e.race_id != fixture.sprint_id));
        assert!(backend.list_races().await.unwrap().iter().all(|r| r.id != fixture.sprint_id));
    }

    #[tokio::test]
    async fn test_remove_age_group_cascades() {
        let fixture = fixture();
        let (backend, mut desk) = open(&fixture).await;

        assert_eq!(desk.remove_age_group(fixture.group_id).await.unwrap(), 2);
        assert!(backend.get_race_matrix(fixture.event_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_unknown_race_is_rejected() {
        let fixture = fixture();
        let (_, mut desk) = open(&fixture).await;

        let err = desk
            .toggle_race(Uuid::new_v4(), fixture.group_id, SkateCategory::Quad)
            .unwrap_err();
        assert!(matches!(err, ConsoleError::NotFound(_)));
        assert_eq!(desk.matrix().len(), 2);
    }

    #[tokio::test]
    async fn test_set_max_races_validates_bounds() {
        let fixture = fixture();
        let (_, mut desk) = open(&fixture).await;
        let mut request = UpdateMaxRacesRequest {
            race_id: fixture.sprint_id,
            age_group_id: fixture.group_id,
            category: SkateCategory::Quad,
            max_races_per_player: 3,
        };

        assert!(desk.set_max_races(&request).unwrap());
        let key = MatrixKey::new(fixture.sprint_id, fixture.group_id, SkateCategory::Quad);
        assert_eq!(desk.matrix().cap_for(&key), Some(3));

        request.max_races_per_player = 11;
        assert!(desk.set_max_races(&request).is_err());
        assert_eq!(desk.matrix().cap_for(&key), Some(3));
    }
}
