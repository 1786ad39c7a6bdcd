//! Host-side game simulation modules

pub mod physics;
pub mod sim;

pub use sim::{SimEvent, Simulation};

use crate::ws::protocol::{ActionKind, PlayerSlot};

/// Input event delivered from the relay to the host loop.
///
/// Movement is level-triggered and latched; actions are edge-triggered and
/// consumed once. The two are kept distinct because their consumption
/// semantics differ.
#[derive(Debug, Clone)]
pub enum HostInput {
    /// A controller bound itself to a slot.
    Joined { slot: PlayerSlot },
    /// Mirrors move-start/move-stop.
    Move {
        slot: PlayerSlot,
        direction: f32,
        active: bool,
    },
    /// Mirrors the action-* events.
    Action { slot: PlayerSlot, kind: ActionKind },
}

/// Latched movement direction for one slot: -1, 0, or 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub dir: f32,
}
