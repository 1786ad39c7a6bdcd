//! Application-level wiring

mod state;

pub use state::AppState;
