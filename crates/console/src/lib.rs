pub mod config;
pub mod desk;
pub mod error;
pub mod sources;
pub mod traits;

pub use config::ConsoleConfig;
pub use desk::EventDesk;
pub use error::{ConsoleError, Result};
pub use sources::{ApiClient, FixtureBackend, Snapshot};
pub use traits::RegistryBackend;
