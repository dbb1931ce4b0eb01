//! fuel-pipeline server entry point.
//!
//! Loads configuration, restores pipeline state from storage, and serves
//! the ingest and subscription endpoints until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use fuel_pipeline::api;
use fuel_pipeline::app_state::AppState;
use fuel_pipeline::config::{LogFormat, PipelineConfig};
use fuel_pipeline::domain::EventBus;
use fuel_pipeline::persistence::{
    AuditLog, MemoryPersistence, PersistenceLayer, PostgresPersistence, postgres,
};
use fuel_pipeline::service::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PipelineConfig::from_env().context("invalid LISTEN_ADDR")?;

    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting fuel-pipeline");

    let persistence = build_persistence(&config).await?;

    let audit = if config.audit_log_enabled {
        let log = AuditLog::open(&config.audit_log_path)
            .await
            .with_context(|| format!("opening audit log {}", config.audit_log_path.display()))?;
        tracing::info!(path = %log.path().display(), "audit log enabled");
        Some(log)
    } else {
        None
    };

    let event_bus = EventBus::new(config.event_bus_capacity);
    let pipeline = Arc::new(Pipeline::new(persistence, audit, event_bus));
    pipeline.start().await.context("loading pipeline state")?;

    let app = api::build_app(AppState::new(Arc::clone(&pipeline)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pipeline.drain().await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn build_persistence(config: &PipelineConfig) -> anyhow::Result<Arc<dyn PersistenceLayer>> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled, using in-memory storage");
        return Ok(Arc::new(MemoryPersistence::new()));
    }

    let pool = postgres::connect(config)
        .await
        .context("connecting to postgres")?;
    let store = PostgresPersistence::new(pool);
    if config.run_migrations {
        store.migrate().await.context("running migrations")?;
        tracing::info!("database migrations applied");
    }
    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
