//! Colonia multiplayer game server.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod registry;
mod server;
mod store;

use registry::GameRegistry;
use server::ServerState;
use store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse address from env or use default
    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;

    info!("Starting Colonia server...");

    // The store is the source of truth; the registry caches engines over it
    let store = Arc::new(MemoryStore::new());
    let game_registry = Arc::new(GameRegistry::new(store));
    let state = Arc::new(ServerState::new(game_registry));

    server::run_server(addr, state).await
}
