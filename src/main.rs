//! Soccer Party Relay - routes controller input to room hosts
//!
//! The relay is the rendezvous point of the party: a host connection
//! registers a room, two phone controllers claim its slots, and from then on
//! the relay forwards input upstream and feedback cues downstream. It holds
//! no game state beyond the room bindings and score tallies; the host owns
//! the simulation.

use tokio::net::TcpListener;
use tracing::info;

use soccer_party_server::app::AppState;
use soccer_party_server::config::Config;
use soccer_party_server::http::build_router;
use soccer_party_server::util::time::init_server_time;
use soccer_party_server::util::trace::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);
    init_server_time();

    info!("starting soccer party relay");

    let state = AppState::new(config);
    let addr = state.config.server_addr;
    let router = build_router(state);

    let listener = TcpListener::bind(addr).await?;

    info!("relay listening on {}", addr);
    info!("websocket endpoint: ws://{}/ws", addr);
    info!(
        "controller entry: http://{}/controller.html?room=<code>&player=<1|2>",
        addr
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("relay shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("received terminate signal, starting graceful shutdown");
        }
    }
}
