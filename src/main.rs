//! Bookstore storefront server

use anyhow::{Context, Result};
use bookstore::{
    http,
    store::{MemoryStore, PgStore},
    AppState, Config, EventPublisher, Settings,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings {
        pricing: config.pricing()?,
        currency: config.currency.clone(),
        admin_token: config.admin_token.clone(),
    };
    let events = connect_events(config.nats_url.as_deref()).await;

    let state = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .context("failed to connect to Postgres")?;
            let store = PgStore::new(db);
            store.migrate().await.context("failed to run migrations")?;
            AppState::new(Arc::new(store), events, settings)
        }
        None => {
            warn!("DATABASE_URL not set, keeping data in memory");
            AppState::new(Arc::new(MemoryStore::new()), events, settings)
        }
    };

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "bookstore listening");
    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn connect_events(url: Option<&str>) -> EventPublisher {
    let Some(url) = url else {
        return EventPublisher::disabled();
    };
    match async_nats::connect(url).await {
        Ok(client) => {
            info!(url, "publishing events to NATS");
            EventPublisher::nats(client)
        }
        Err(e) => {
            warn!(url, error = %e, "NATS unavailable, events disabled");
            EventPublisher::disabled()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl_c signal received"),
        _ = terminate => info!("terminate signal received"),
    }
}
