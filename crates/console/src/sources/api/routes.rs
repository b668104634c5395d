use uuid::Uuid;

pub const PLAYERS: &str = "/players";
pub const STATES: &str = "/states";
pub const DISTRICTS: &str = "/districts";
pub const CLUBS: &str = "/clubs";
pub const EVENTS: &str = "/events";
pub const AGE_GROUPS: &str = "/age-groups";
pub const RACES: &str = "/races";
pub const SCHEDULES: &str = "/schedules";

pub fn item(collection: &str, id: Uuid) -> String {
    format!("{}/{}", collection, id)
}

pub fn race_matrix(event_id: Uuid) -> String {
    format!("{}/{}/race-matrix", EVENTS, event_id)
}

pub fn event_schedules(event_id: Uuid) -> String {
    format!("{}/{}/schedules", EVENTS, event_id)
}
