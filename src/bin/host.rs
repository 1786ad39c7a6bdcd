//! Soccer Party Host - the authoritative simulation for one room
//!
//! Connects to the relay, announces a room code, and runs the fixed-step
//! match simulation, feeding haptic/audio cues back through the relay.
//! Rendering is left to the display client; this process logs goals and
//! scores instead.

use soccer_party_server::config::Config;
use soccer_party_server::host::client::run_host;
use soccer_party_server::util::trace::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    run_host(&config).await
}
