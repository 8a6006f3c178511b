use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;
use job_scoring::config::ClientConfig;

pub const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Browser origin allowed by CORS.
    pub client_url: String,
    pub bind_addr: SocketAddr,
    /// Editor sessions untouched for this long are closed.
    pub session_idle: Duration,
    pub client: ClientConfig,
}

impl ServerConfig {
    /// Reads `CLIENT_URL`, `BIND_ADDR` and `SESSION_IDLE_SECS` plus everything the API client needs.
    pub fn from_env() -> anyhow::Result<Self> {
        let client = job_scoring::config::load().context("invalid API client configuration")?;
        let client_url = env::var("CLIENT_URL").unwrap_or_else(|_| DEFAULT_CLIENT_URL.to_string());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must look like 127.0.0.1:3000")?;
        let idle_secs = match env::var("SESSION_IDLE_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SESSION_IDLE_SECS must be a number, got {value:?}"))?,
            Err(_) => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            client_url,
            bind_addr,
            session_idle: Duration::from_secs(idle_secs.max(1)),
            client,
        })
    }

    /// How often idle sessions are swept: a tenth of the idle limit, at most
    /// once a minute.
    pub fn sweep_interval(&self) -> Duration {
        (self.session_idle / 10).clamp(Duration::from_secs(1), Duration::from_secs(60))
    }
}
