use registry::dto::club::{CreateClubRequest, CreateDistrictRequest, CreateStateRequest, UpdateClubRequest};
use registry::dto::event::CreateEventRequest;
use registry::dto::player::{CreatePlayerRequest, UpdatePlayerRequest};
use registry::dto::race::{CreateAgeGroupRequest, CreateRaceRequest};
use registry::models::{AgeGroup, Club, District, Event, Player, Race, Schedule, State};
use registry::services::RaceMatrix;
use uuid::Uuid;

use crate::Result;

/// Where the console reads entities from and flushes edits to.
#[async_trait::async_trait]
pub trait RegistryBackend: Send + Sync {
    async fn list_players(&self) -> Result<Vec<Player>>;
    async fn create_player(&self, request: &CreatePlayerRequest) -> Result<Player>;
    async fn update_player(&self, id: Uuid, request: &UpdatePlayerRequest) -> Result<Player>;
    async fn delete_player(&self, id: Uuid) -> Result<()>;

    async fn list_states(&self) -> Result<Vec<State>>;
    async fn create_state(&self, request: &CreateStateRequest) -> Result<State>;
    async fn list_districts(&self) -> Result<Vec<District>>;
    async fn create_district(&self, request: &CreateDistrictRequest) -> Result<District>;
    async fn list_clubs(&self) -> Result<Vec<Club>>;
    async fn create_club(&self, request: &CreateClubRequest) -> Result<Club>;
    async fn update_club(&self, id: Uuid, request: &UpdateClubRequest) -> Result<Club>;

    async fn list_events(&self) -> Result<Vec<Event>>;
    async fn get_event(&self, id: Uuid) -> Result<Event>;
    async fn create_event(&self, request: &CreateEventRequest) -> Result<Event>;

    async fn list_age_groups(&self) -> Result<Vec<AgeGroup>>;
    async fn create_age_group(&self, request: &CreateAgeGroupRequest) -> Result<AgeGroup>;
    async fn delete_age_group(&self, id: Uuid) -> Result<()>;

    async fn list_races(&self) -> Result<Vec<Race>>;
    async fn create_race(&self, request: &CreateRaceRequest) -> Result<Race>;
    async fn delete_race(&self, id: Uuid) -> Result<()>;

    async fn get_race_matrix(&self, event_id: Uuid) -> Result<RaceMatrix>;
    async fn save_race_matrix(&self, event_id: Uuid, matrix: &RaceMatrix) -> Result<()>;

    async fn list_schedules(&self, event_id: Uuid) -> Result<Vec<Schedule>>;
    async fn create_schedule(&self, schedule: &Schedule) -> Result<Schedule>;
    async fn save_schedule(&self, schedule: &Schedule) -> Result<Schedule>;

    /// Makes buffered edits durable. Backends that write through do nothing.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
