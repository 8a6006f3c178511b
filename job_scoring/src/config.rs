use std::{env, str::FromStr, time::Duration};

use thiserror::Error;
use url::Url;

use crate::editor::DEFAULT_UPLOAD_CONCURRENCY;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Where the Jobs and Candidates APIs live and how to talk to them.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub token: Option<String>,
    pub timeout: Duration,
    /// How long idempotent reads keep retrying transient failures.
    pub retry_for: Duration,
    pub upload_concurrency: usize,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url(api_url)?,
            token: None,
            timeout: Duration::from_secs(30),
            retry_for: Duration::from_secs(10),
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Read `JOBS_API_URL`, `JOBS_API_TOKEN`, `JOBS_API_TIMEOUT_SECS`,
    /// `JOBS_API_RETRY_SECS` and `UPLOAD_CONCURRENCY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("JOBS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut cfg = Self::new(&api_url)?.with_token(env::var("JOBS_API_TOKEN").ok());

        if let Some(secs) = env_number::<u64>("JOBS_API_TIMEOUT_SECS")? {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number::<u64>("JOBS_API_RETRY_SECS")? {
            cfg.retry_for = Duration::from_secs(secs);
        }
        if let Some(limit) = env_number::<usize>("UPLOAD_CONCURRENCY")? {
            cfg.upload_concurrency = limit.max(1);
        }
        Ok(cfg)
    }
}

/// Load `.env` (if present) and build the client configuration from the
/// environment.
pub fn load() -> Result<ClientConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    ClientConfig::from_env()
}

// Url::join drops the last path segment unless the base ends with '/'.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}

fn env_number<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        _ => Ok(None),
    }
}
