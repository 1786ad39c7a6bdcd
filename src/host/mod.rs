//! Loop driver coupling the simulation to the relay
//!
//! Input arrives asynchronously from the relay but is drained into latched
//! state before each tick, so a tick always reads a consistent snapshot of
//! controller intent regardless of network jitter.

pub mod client;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::game::{HostInput, SimEvent, Simulation};
use crate::util::time::TICK_DURATION_MICROS;
use crate::ws::protocol::ClientMsg;

/// Drives one room's simulation at the fixed tick rate and exchanges
/// messages with the relay: input events in, feedback/game-over out.
pub struct HostGame {
    room_id: String,
    sim: Simulation,
    joined: [bool; 2],
    started: bool,
    input_rx: mpsc::Receiver<HostInput>,
    relay_tx: mpsc::UnboundedSender<ClientMsg>,
}

impl HostGame {
    pub fn new(
        room_id: String,
        input_rx: mpsc::Receiver<HostInput>,
        relay_tx: mpsc::UnboundedSender<ClientMsg>,
    ) -> Self {
        Self {
            room_id,
            sim: Simulation::new(),
            joined: [false, false],
            started: false,
            input_rx,
            relay_tx,
        }
    }

    /// Run ticks until the relay connection goes away.
    pub async fn run(mut self) {
        info!(room_id = %self.room_id, "host simulation started");

        let mut ticker = interval(Duration::from_micros(TICK_DURATION_MICROS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if !self.drain_inputs() {
                break;
            }

            let events = self.sim.tick();
            if !self.forward_events(events) {
                break;
            }
        }

        info!(room_id = %self.room_id, "host simulation stopped");
    }

    /// Apply every buffered input event. Movement latches, actions fire
    /// immediately. Returns false once the relay side is gone.
    fn drain_inputs(&mut self) -> bool {
        loop {
            match self.input_rx.try_recv() {
                Ok(HostInput::Joined { slot }) => {
                    self.joined[slot.index()] = true;
                    info!(room_id = %self.room_id, slot = %slot, "controller ready");
                    if !self.started && self.joined.iter().all(|&ready| ready) {
                        self.started = true;
                        self.sim.start();
                        info!(room_id = %self.room_id, "both controllers ready, kickoff");
                    }
                }
                Ok(HostInput::Move {
                    slot,
                    direction,
                    active,
                }) => {
                    self.sim.set_direction(slot, direction, active);
                }
                Ok(HostInput::Action { slot, kind }) => {
                    let events = self.sim.apply_action(slot, kind);
                    if !self.forward_events(events) {
                        return false;
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn forward_events(&self, events: Vec<SimEvent>) -> bool {
        for event in events {
            let msg = match event {
                SimEvent::Feedback { target, kind, data } => ClientMsg::FeedbackEvent {
                    room_id: self.room_id.clone(),
                    target,
                    kind: kind.to_string(),
                    data,
                },
                SimEvent::GameOver { winner } => {
                    info!(
                        room_id = %self.room_id,
                        winner = %winner,
                        score_p1 = self.sim.scores[0],
                        score_p2 = self.sim.scores[1],
                        "goal"
                    );
                    ClientMsg::GameOver {
                        room_id: self.room_id.clone(),
                        winner,
                    }
                }
            };

            if self.relay_tx.send(msg).is_err() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::{ActionKind, FeedbackTarget, PlayerSlot};

    fn game() -> (
        HostGame,
        mpsc::Sender<HostInput>,
        mpsc::UnboundedReceiver<ClientMsg>,
    ) {
        let (input_tx, input_rx) = mpsc::channel(64);
        let (relay_tx, relay_rx) = mpsc::unbounded_channel();
        (
            HostGame::new("ROOM42".to_string(), input_rx, relay_tx),
            input_tx,
            relay_rx,
        )
    }

    #[test]
    fn kickoff_waits_for_both_controllers() {
        let (mut host, input_tx, _relay_rx) = game();

        input_tx
            .try_send(HostInput::Joined {
                slot: PlayerSlot::One,
            })
            .unwrap();
        assert!(host.drain_inputs());
        assert!(!host.sim.active);

        input_tx
            .try_send(HostInput::Joined {
                slot: PlayerSlot::Two,
            })
            .unwrap();
        assert!(host.drain_inputs());
        assert!(host.sim.active);
    }

    #[test]
    fn rejoin_does_not_restart_a_running_match() {
        let (mut host, input_tx, _relay_rx) = game();

        for slot in [PlayerSlot::One, PlayerSlot::Two] {
            input_tx.try_send(HostInput::Joined { slot }).unwrap();
        }
        assert!(host.drain_inputs());

        host.sim.scores = [2, 1];
        input_tx
            .try_send(HostInput::Joined {
                slot: PlayerSlot::Two,
            })
            .unwrap();
        assert!(host.drain_inputs());
        assert_eq!(host.sim.scores, [2, 1]);
    }

    #[test]
    fn action_feedback_is_forwarded_with_the_room_id() {
        let (mut host, input_tx, mut relay_rx) = game();

        for slot in [PlayerSlot::One, PlayerSlot::Two] {
            input_tx.try_send(HostInput::Joined { slot }).unwrap();
        }
        assert!(host.drain_inputs());

        // Put the ball in reach and kick.
        host.sim.ball.x = host.sim.players[0].x + 60.0;
        host.sim.ball.y = host.sim.players[0].y - 30.0;
        input_tx
            .try_send(HostInput::Action {
                slot: PlayerSlot::One,
                kind: ActionKind::Kick,
            })
            .unwrap();
        assert!(host.drain_inputs());

        match relay_rx.try_recv().unwrap() {
            ClientMsg::FeedbackEvent {
                room_id,
                target,
                kind,
                ..
            } => {
                assert_eq!(room_id, "ROOM42");
                assert_eq!(target, FeedbackTarget::All);
                assert_eq!(kind, "ball-hit");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn relay_gone_stops_the_drain() {
        let (mut host, input_tx, _relay_rx) = game();
        drop(input_tx);
        assert!(!host.drain_inputs());
    }
}
