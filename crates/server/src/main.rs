use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;

use carbot_core::config::{AppConfig, LoadOptions, LogFormat};
use carbot_core::{SlotStore, TicketGenerator};

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let start = Local::now().date_naive();
    let store = SlotStore::seed(carbot_server::seed::demo_slots(start))
        .context("demo slot seed contains duplicate (date, time) keys")?;

    let state = carbot_server::routes::AppState {
        store: Arc::new(store),
        tickets: Arc::new(TicketGenerator::new()),
    };

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind booking backend to {address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        seed_start = %start,
        "booking backend listening"
    );

    axum::serve(listener, carbot_server::routes::router(state))
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("booking backend server terminated unexpectedly")?;

    tracing::info!(event_name = "system.server.stopping", "booking backend stopping");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}
