//! # farmhubd — farmhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Spawn the stop scheduler that honors timed irrigation runs
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod scheduler;

use std::sync::Arc;

use farmhub_adapter_http_axum::state::AppState;
use farmhub_adapter_storage_sqlite_sqlx::{
    SqliteAlertRepository, SqliteDeviceStateStore, SqliteRuleRepository, SqliteTelemetryStore,
};
use farmhub_app::event_bus::InProcessEventBus;
use farmhub_app::services::alert_service::AlertService;
use farmhub_app::services::device_service::DeviceService;
use farmhub_app::services::rule_service::RuleService;
use farmhub_app::services::telemetry_service::TelemetryService;
use farmhub_domain::id::DeviceId;

use crate::config::Config;
use crate::scheduler::TokioStopScheduler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = farmhub_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories, shared between services and the rule engine
    let rule_repo = Arc::new(SqliteRuleRepository::new(pool.clone()));
    let device_store = Arc::new(SqliteDeviceStateStore::new(pool.clone()));
    let alert_repo = Arc::new(SqliteAlertRepository::new(pool.clone()));
    let telemetry_store = Arc::new(SqliteTelemetryStore::new(pool));

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Services
    let rule_service = Arc::new(RuleService::new(Arc::clone(&rule_repo)));
    let device_service = Arc::new(DeviceService::new(
        Arc::clone(&device_store),
        Arc::clone(&event_bus),
    ));
    let telemetry_service = Arc::new(TelemetryService::new(
        Arc::clone(&telemetry_store),
        Arc::clone(&rule_repo),
        Arc::clone(&device_store),
        Arc::clone(&alert_repo),
        Arc::clone(&event_bus),
    ));
    let alert_service = Arc::new(AlertService::new(Arc::clone(&alert_repo)));

    // Stop scheduler for timed irrigation runs
    let stop_scheduler = Arc::new(TokioStopScheduler::new(
        Arc::clone(&device_service),
        config.device.flow_rate_l_per_min,
    ));

    // Make sure the default device exists before the first node polls.
    let default_device_id = DeviceId::new(config.device.default_id.clone());
    device_service.get_or_create(&default_device_id).await?;

    // HTTP
    let state = AppState::from_arcs(
        rule_service,
        device_service,
        telemetry_service,
        alert_service,
        stop_scheduler,
        default_device_id,
    );
    let app = farmhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!("farmhubd listening on http://{bind_addr}");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
