mod snapshot;

pub use snapshot::Snapshot;

use std::path::{Path, PathBuf};

use registry::dto::club::{
    CreateClubRequest, CreateDistrictRequest, CreateStateRequest, UpdateClubRequest,
};
use registry::dto::event::CreateEventRequest;
use registry::dto::player::{CreatePlayerRequest, UpdatePlayerRequest};
use registry::dto::race::{CreateAgeGroupRequest, CreateRaceRequest};
use registry::models::{AgeGroup, Club, District, Event, Player, Race, Schedule, State};
use registry::services::RaceMatrix;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::traits::RegistryBackend;
use crate::{ConsoleError, Result};

/// In-memory backend seeded from a static snapshot.
///
/// Edits stay in memory until [`RegistryBackend::flush`], which writes the
/// snapshot back to the file it was loaded from (if any).
pub struct FixtureBackend {
    snapshot: Mutex<Snapshot>,
    path: Option<PathBuf>,
}

impl FixtureBackend {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            path: None,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading fixture snapshot from: {}", path.display());

        let json_content = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&json_content)?;

        Ok(Self {
            snapshot: Mutex::new(snapshot),
            path: Some(path.to_path_buf()),
        })
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().await.clone()
    }
}

fn not_found(kind: &str, id: Uuid) -> ConsoleError {
    ConsoleError::NotFound(format!("{} {}", kind, id))
}

fn remove_by<T>(items: &mut Vec<T>, kind: &str, id: Uuid, key: impl Fn(&T) -> Uuid) -> Result<()> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        return Err(not_found(kind, id));
    }
    Ok(())
}

/// Deleting a race or age group takes every event's heats for it along.
fn drop_schedules(schedules: &mut Vec<Schedule>, matches: impl Fn(&Schedule) -> bool) -> usize {
    let before = schedules.len();
    schedules.retain(|s| !matches(s));
    before - schedules.len()
}

#[async_trait::async_trait]
impl RegistryBackend for FixtureBackend {
    async fn list_players(&self) -> Result<Vec<Player>> {
        Ok(self.snapshot.lock().await.players.clone())
    }

    async fn create_player(&self, request: &CreatePlayerRequest) -> Result<Player> {
        let player = request.clone().into_player(Uuid::new_v4());
        self.snapshot.lock().await.players.push(player.clone());
        Ok(player)
    }

    async fn update_player(&self, id: Uuid, request: &UpdatePlayerRequest) -> Result<Player> {
        let mut snapshot = self.snapshot.lock().await;
        let player = snapshot
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("player", id))?;

        request.apply_to(player);
        Ok(player.clone())
    }

    async fn delete_player(&self, id: Uuid) -> Result<()> {
        remove_by(&mut self.snapshot.lock().await.players, "player", id, |p| p.id)
    }

    async fn list_states(&self) -> Result<Vec<State>> {
        Ok(self.snapshot.lock().await.states.clone())
    }

    async fn create_state(&self, request: &CreateStateRequest) -> Result<State> {
        let state = request.clone().into_state(Uuid::new_v4());
        self.snapshot.lock().await.states.push(state.clone());
        Ok(state)
    }

    async fn list_districts(&self) -> Result<Vec<District>> {
        Ok(self.snapshot.lock().await.districts.clone())
    }

    async fn create_district(&self, request: &CreateDistrictRequest) -> Result<District> {
        let mut snapshot = self.snapshot.lock().await;
        if !snapshot.states.iter().any(|s| s.id == request.state_id) {
            return Err(not_found("state", request.state_id));
        }

        let district = request.clone().into_district(Uuid::new_v4());
        snapshot.districts.push(district.clone());
        Ok(district)
    }

    async fn list_clubs(&self) -> Result<Vec<Club>> {
        Ok(self.snapshot.lock().await.clubs.clone())
    }

    async fn create_club(&self, request: &CreateClubRequest) -> Result<Club> {
        let club = request.clone().into_club(Uuid::new_v4());
        self.snapshot.lock().await.clubs.push(club.clone());
        Ok(club)
    }

    async fn update_club(&self, id: Uuid, request: &UpdateClubRequest) -> Result<Club> {
        let mut snapshot = self.snapshot.lock().await;
        let club = snapshot
            .clubs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("club", id))?;

        request.apply_to(club);
        Ok(club.clone())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(self.snapshot.lock().await.events.clone())
    }

    async fn get_event(&self, id: Uuid) -> Result<Event> {
        self.snapshot
            .lock()
            .await
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| not_found("event", id))
    }

    async fn create_event(&self, request: &CreateEventRequest) -> Result<Event> {
        let event = request.clone().into_event(Uuid::new_v4());
        self.snapshot.lock().await.events.push(event.clone());
        Ok(event)
    }

    async fn list_age_groups(&self) -> Result<Vec<AgeGroup>> {
        Ok(self.snapshot.lock().await.age_groups.clone())
    }

    async fn create_age_group(&self, request: &CreateAgeGroupRequest) -> Result<AgeGroup> {
        let age_group = request.clone().into_age_group(Uuid::new_v4());
        self.snapshot.lock().await.age_groups.push(age_group.clone());
        Ok(age_group)
    }

    async fn delete_age_group(&self, id: Uuid) -> Result<()> {
        let mut snapshot = self.snapshot.lock().await;
        remove_by(&mut snapshot.age_groups, "age group", id, |g| g.id)?;

        let cells: usize = snapshot
            .race_matrices
            .values_mut()
            .map(|matrix| matrix.remove_age_group(id))
            .sum();
        let heats = drop_schedules(&mut snapshot.schedules, |s| s.age_group_id == id);
        debug!(
            "Age group {} removed with {} matrix cells and {} heats",
            id, cells, heats
        );
        Ok(())
    }

    async fn list_races(&self) -> Result<Vec<Race>> {
        Ok(self.snapshot.lock().await.races.clone())
    }

    async fn create_race(&self, request: &CreateRaceRequest) -> Result<Race> {
        let race = request.clone().into_race(Uuid::new_v4());
        self.snapshot.lock().await.races.push(race.clone());
        Ok(race)
    }

    async fn delete_race(&self, id: Uuid) -> Result<()> {
        let mut snapshot = self.snapshot.lock().await;
        remove_by(&mut snapshot.races, "race", id, |r| r.id)?;

        let cells: usize = snapshot
            .race_matrices
            .values_mut()
            .map(|matrix| matrix.remove_race(id))
            .sum();
        let heats = drop_schedules(&mut snapshot.schedules, |s| s.race_id == id);
        debug!("Race {} removed with {} matrix cells and {} heats", id, cells, heats);
        Ok(())
    }

    async fn get_race_matrix(&self, event_id: Uuid) -> Result<RaceMatrix> {
        let snapshot = self.snapshot.lock().await;
        if !snapshot.events.iter().any(|e| e.id == event_id) {
            return Err(not_found("event", event_id));
        }

        Ok(snapshot
            .race_matrices
            .get(&event_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_race_matrix(&self, event_id: Uuid, matrix: &RaceMatrix) -> Result<()> {
        let mut snapshot = self.snapshot.lock().await;
        if !snapshot.events.iter().any(|e| e.id == event_id) {
            return Err(not_found("event", event_id));
        }

        snapshot.race_matrices.insert(event_id, matrix.clone());
        Ok(())
    }

    async fn list_schedules(&self, event_id: Uuid) -> Result<Vec<Schedule>> {
        Ok(self
            .snapshot
            .lock()
            .await
            .schedules
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_schedule(&self, schedule: &Schedule) -> Result<Schedule> {
        let mut snapshot = self.snapshot.lock().await;
        if !snapshot.events.iter().any(|e| e.id == schedule.event_id) {
            return Err(not_found("event", schedule.event_id));
        }

        snapshot.schedules.push(schedule.clone());
        Ok(schedule.clone())
    }

    async fn save_schedule(&self, schedule: &Schedule) -> Result<Schedule> {
        let mut snapshot = self.snapshot.lock().await;
        let existing = snapshot
            .schedules
            .iter_mut()
            .find(|s| s.id == schedule.id)
            .ok_or_else(|| not_found("schedule", schedule.id))?;

        *existing = schedule.clone();
        Ok(schedule.clone())
    }

    async fn flush(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&*self.snapshot.lock().await)?;
        tokio::fs::write(path, json).await?;
        info!("Fixture snapshot written to: {}", path.display());

        Ok(())
    }

    fn name(&self) -> &'static str {
        "fixtures"
    }
}
