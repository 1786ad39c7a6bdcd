//! Tick-rate constants and server uptime

use std::sync::OnceLock;
use std::time::Instant;

/// Simulation and display tick rate. Physics constants are per-tick units,
/// so one tick corresponds to one frame of the 60 Hz presentation.
pub const TICK_RATE: u32 = 60;
pub const TICK_DURATION_MICROS: u64 = 1_000_000 / TICK_RATE as u64;

/// Server start time for uptime tracking
static SERVER_START: OnceLock<Instant> = OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}
