use registry::dto::club::{
    CreateClubRequest, CreateDistrictRequest, CreateStateRequest, UpdateClubRequest,
};
use registry::dto::common::{ListParams, PaginatedResponse};
use registry::dto::event::CreateEventRequest;
use registry::dto::player::{CreatePlayerRequest, UpdatePlayerRequest};
use registry::dto::race::{CreateAgeGroupRequest, CreateRaceRequest};
use registry::models::{AgeGroup, Club, District, Event, Player, Race, Schedule, State};
use registry::services::RaceMatrix;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::routes;
use crate::config::ConsoleConfig;
use crate::traits::RegistryBackend;
use crate::{ConsoleError, Result};

/// JSON client for the registry REST API.
///
/// Every call is a single request/response exchange: no retries, and the
/// last write wins on the server.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("club-console/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            token: config.api_token.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(path: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ConsoleError::NotFound(path.to_string()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read error body from {}: {}", path, e);
                String::new()
            }
        };
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);
        let message = if message.trim().is_empty() {
            status.canonical_reason().unwrap_or("no response body").to_string()
        } else {
            message
        };

        Err(ConsoleError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = Self::check(path, response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path).json(body).send().await?;
        let response = Self::check(path, response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_without_reply<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        Self::check(path, response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send_without_reply::<()>(Method::DELETE, path, None).await
    }

    /// Fetches one page of the player list.
    pub async fn list_players_page(&self, params: &ListParams) -> Result<PaginatedResponse<Player>> {
        params.validate().map_err(ConsoleError::Rejected)?;

        let response = self
            .request(Method::GET, routes::PLAYERS)
            .query(params)
            .send()
            .await?;
        let response = Self::check(routes::PLAYERS, response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl RegistryBackend for ApiClient {
    async fn list_players(&self) -> Result<Vec<Player>> {
        let mut params = ListParams {
            page_size: 100,
            ..ListParams::default()
        };
        let mut players = Vec::new();

        loop {
            let page = self.list_players_page(&params).await?;
            players.extend(page.data);
            if !page.pagination.has_next() {
                break;
            }
            params = params.next_page();
        }

        debug!("Fetched {} players", players.len());
        Ok(players)
    }

    async fn create_player(&self, request: &CreatePlayerRequest) -> Result<Player> {
        self.send_json(Method::POST, routes::PLAYERS, request).await
    }

    async fn update_player(&self, id: Uuid, request: &UpdatePlayerRequest) -> Result<Player> {
        self.send_json(Method::PUT, &routes::item(routes::PLAYERS, id), request)
            .await
    }

    async fn delete_player(&self, id: Uuid) -> Result<()> {
        self.delete(&routes::item(routes::PLAYERS, id)).await
    }

    async fn list_states(&self) -> Result<Vec<State>> {
        self.get_json(routes::STATES).await
    }

    async fn create_state(&self, request: &CreateStateRequest) -> Result<State> {
        self.send_json(Method::POST, routes::STATES, request).await
    }

    async fn list_districts(&self) -> Result<Vec<District>> {
        self.get_json(routes::DISTRICTS).await
    }

    async fn create_district(&self, request: &CreateDistrictRequest) -> Result<District> {
        self.send_json(Method::POST, routes::DISTRICTS, request).await
    }

    async fn list_clubs(&self) -> Result<Vec<Club>> {
        self.get_json(routes::CLUBS).await
    }

    async fn create_club(&self, request: &CreateClubRequest) -> Result<Club> {
        self.send_json(Method::POST, routes::CLUBS, request).await
    }

    async fn update_club(&self, id: Uuid, request: &UpdateClubRequest) -> Result<Club> {
        self.send_json(Method::PUT, &routes::item(routes::CLUBS, id), request)
            .await
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        self.get_json(routes::EVENTS).await
    }

    async fn get_event(&self, id: Uuid) -> Result<Event> {
        self.get_json(&routes::item(routes::EVENTS, id)).await
    }

    async fn create_event(&self, request: &CreateEventRequest) -> Result<Event> {
        self.send_json(Method::POST, routes::EVENTS, request).await
    }

    async fn list_age_groups(&self) -> Result<Vec<AgeGroup>> {
        self.get_json(routes::AGE_GROUPS).await
    }

    async fn create_age_group(&self, request: &CreateAgeGroupRequest) -> Result<AgeGroup> {
        self.send_json(Method::POST, routes::AGE_GROUPS, request).await
    }

    async fn delete_age_group(&self, id: Uuid) -> Result<()> {
        self.delete(&routes::item(routes::AGE_GROUPS, id)).await
    }

    async fn list_races(&self) -> Result<Vec<Race>> {
        self.get_json(routes::RACES).await
    }

    async fn create_race(&self, request: &CreateRaceRequest) -> Result<Race> {
        self.send_json(Method::POST, routes::RACES, request).await
    }

    async fn delete_race(&self, id: Uuid) -> Result<()> {
        self.delete(&routes::item(routes::RACES, id)).await
    }

    async fn get_race_matrix(&self, event_id: Uuid) -> Result<RaceMatrix> {
        self.get_json(&routes::race_matrix(event_id)).await
    }

    async fn save_race_matrix(&self, event_id: Uuid, matrix: &RaceMatrix) -> Result<()> {
        self.send_without_reply(Method::PUT, &routes::race_matrix(event_id), Some(matrix))
            .await
    }

    async fn list_schedules(&self, event_id: Uuid) -> Result<Vec<Schedule>> {
        self.get_json(&routes::event_schedules(event_id)).await
    }

    async fn create_schedule(&self, schedule: &Schedule) -> Result<Schedule> {
        self.send_json(
            Method::POST,
            &routes::event_schedules(schedule.event_id),
            schedule,
        )
        .await
    }

    async fn save_schedule(&self, schedule: &Schedule) -> Result<Schedule> {
        self.send_json(
            Method::PUT,
            &routes::item(routes::SCHEDULES, schedule.id),
            schedule,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "REST API"
    }
}
