mod config;
mod db;
mod frame;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::config::{RelayConfig, StoreConfig};
use crate::services::board::{BoardStore, PgBoardStore};
use crate::services::memory::MemoryBoardStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = RelayConfig::from_env().expect("invalid configuration");

    let store: Arc<dyn BoardStore> = match &config.store {
        StoreConfig::Postgres { url, max_connections } => {
            let pool = db::init_pool(url, *max_connections)
                .await
                .expect("database init failed");
            tracing::info!(max_connections, "postgres board store ready");
            Arc::new(PgBoardStore::new(pool))
        }
        StoreConfig::Memory => {
            tracing::warn!("DATABASE_URL not set; boards are kept in memory only");
            Arc::new(MemoryBoardStore::new())
        }
    };

    let (writer, writer_shutdown) = services::persistence::spawn_history_writer(store.clone(), config.persist);
    let state = state::AppState::new(store, writer);
    let rooms = state.rooms.clone();

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "whiteboard relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    tracing::info!(rooms = rooms.room_count().await, "closing live rooms");
    rooms.clear().await;
    writer_shutdown.shutdown().await;
    tracing::info!("whiteboard relay stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
