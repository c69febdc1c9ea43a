use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use farelane_api::{app, backend::HttpFlightSearchClient, spawn_ticker, AppState};
use farelane_search::{ResultsConfig, ResultsController, SystemClock};
use farelane_shared::Airline;
use farelane_store::app_config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farelane_api=debug,farelane_search=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Farelane API on port {}", config.server.port);

    let store = Arc::new(
        farelane_store::open_session_store(&config.session, &config.session.id)
            .await
            .context("Failed to open session store")?,
    );
    tracing::info!("Session store: {:?} (session {})", config.session.backend, config.session.id);

    let client = HttpFlightSearchClient::new(&config.backend).context("Failed to build backend client")?;
    let airlines = load_airlines(config.search.airlines_path.as_deref())?;

    let mut controller = ResultsController::new(
        Arc::new(client),
        store.clone(),
        Arc::new(SystemClock),
        ResultsConfig::from(&config.search),
    )
    .with_airlines(airlines);
    controller.restore().await.context("Failed to restore session")?;

    let state = AppState::new(controller, store);
    spawn_ticker(state.clone(), Duration::from_millis(config.search.reveal_interval_ms.max(50)));

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn load_airlines(path: Option<&str>) -> anyhow::Result<Vec<Airline>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read airline list {}", path))?;
    let airlines: Vec<Airline> = serde_json::from_str(&raw).with_context(|| format!("Invalid airline list {}", path))?;
    tracing::info!("Loaded {} airlines from {}", airlines.len(), path);
    Ok(airlines)
}
