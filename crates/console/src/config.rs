use std::time::Duration;

use crate::{ConsoleError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl ConsoleConfig {
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        let api_base_url = api_base_url.into().trim().trim_end_matches('/').to_string();

        let url = reqwest::Url::parse(&api_base_url).map_err(|e| {
            ConsoleError::ConfigError(format!("Invalid API base URL '{}': {}", api_base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConsoleError::ConfigError(format!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(Self {
            api_base_url,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `API_BASE_URL`, `API_TOKEN` and `API_TIMEOUT_SECS` from the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("API_BASE_URL")
            .ok_or_else(|| ConsoleError::ConfigError("Cannot load API_BASE_URL env variable".to_string()))?;

        let timeout = match lookup("API_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConsoleError::ConfigError("API_TIMEOUT_SECS must be a number".to_string())
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self::new(base_url)?
            .with_token(lookup("API_TOKEN"))
            .with_timeout(timeout))
    }
}
