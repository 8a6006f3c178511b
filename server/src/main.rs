use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use job_scoring::api::ApiClient;
use job_scoring_server::{app, config::ServerConfig, state::AppState};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ServerConfig::from_env()?;
    let api = Arc::new(ApiClient::new(&cfg.client).context("failed to build API client")?);
    let state = AppState::new(api.clone(), api.clone(), api)
        .with_upload_concurrency(cfg.client.upload_concurrency);

    let origin = cfg
        .client_url
        .parse::<HeaderValue>()
        .context("CLIENT_URL is not a valid origin")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let _sweeper = state.spawn_sweeper(cfg.session_idle, cfg.sweep_interval());
    let app = app(state).layer(cors);

    let listener = TcpListener::bind(cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, api = %cfg.client.api_url, "job scoring server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
