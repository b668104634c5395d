mod client;
mod routes;

pub use client::ApiClient;
pub use routes::*;
