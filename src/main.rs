mod config;
mod error;
mod image;
mod llm;
mod providers;
mod rate_limit;
mod routes;
mod services;
mod state;
mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env();
    let transport = upstream::HttpTransport::new(&config.upstream).expect("http client init failed");

    let bind = format!("{}:{}", config.bind_addr, config.port);
    let sweep_interval = config.rate_limit.sweep_interval;
    tracing::info!(
        mode = config.mode.as_str(),
        deadline_secs = config.pipeline_deadline.map(|d| d.as_secs()),
        max_attempts = config.upstream.max_attempts,
        "configuration loaded"
    );

    let state = state::AppState::new(config, Arc::new(transport), Arc::new(providers::EnvCredentials));
    tracing::info!(
        limit = state.rate_limiter.limit(),
        window_ms = state.rate_limiter.window().as_millis(),
        "rate limiter initialized"
    );

    // Spawn background idle-identity sweep.
    let _sweep = rate_limit::spawn_sweep_task(state.rate_limiter.clone(), sweep_interval);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .expect("failed to bind");

    tracing::info!(%bind, "wish machine listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
