pub mod api;
pub mod fixtures;

pub use api::ApiClient;
pub use fixtures::{FixtureBackend, Snapshot};
