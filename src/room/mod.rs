//! Room registry - binds a host and up to two controller connections per room
//!
//! Rooms live for the process lifetime; there is no teardown path. A dead
//! connection simply stops accepting sends, and routing to it is dropped.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ws::protocol::{FeedbackTarget, PlayerSlot, ServerMsg};

/// Identity of one websocket connection.
pub type ConnId = Uuid;

/// Outbound handle for a connection, cheap to clone into the registry.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnId,
    tx: mpsc::UnboundedSender<ServerMsg>,
}

impl ConnectionHandle {
    pub fn new(id: ConnId, tx: mpsc::UnboundedSender<ServerMsg>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Best-effort send; a closed peer just loses the message.
    pub fn send(&self, msg: ServerMsg) -> bool {
        self.tx.send(msg).is_ok()
    }
}

/// One live match session: a host plus up to two controller slots.
struct Room {
    host: ConnectionHandle,
    players: [Option<ConnectionHandle>; 2],
    scores: [u32; 2],
}

impl Room {
    fn new(host: ConnectionHandle) -> Self {
        Self {
            host,
            players: [None, None],
            scores: [0, 0],
        }
    }

    /// Send to every member of the room's multicast group except `sender`.
    fn multicast_except(&self, sender: ConnId, msg: &ServerMsg) {
        for conn in std::iter::once(&self.host).chain(self.players.iter().flatten()) {
            if conn.id() != sender {
                conn.send(msg.clone());
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("room not found: {0}")]
    RoomNotFound(String),
}

/// Registry of live rooms, keyed by room code.
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Register `room_id` with `host` as its authority.
    ///
    /// An existing entry is replaced outright; the last writer wins. Two
    /// hosts racing on the same code is left observable rather than rejected.
    pub fn create_room(&self, room_id: &str, host: ConnectionHandle) {
        if self.rooms.insert(room_id.to_string(), Room::new(host)).is_some() {
            debug!(room_id, "existing room replaced");
        }
        info!(room_id, "room created");
    }

    /// Bind `slot` to `conn`, overwriting any prior occupant so a controller
    /// can reconnect by re-joining. The host is notified of the join.
    pub fn join_room(
        &self,
        room_id: &str,
        slot: PlayerSlot,
        conn: ConnectionHandle,
    ) -> Result<(), RegistryError> {
        let mut room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))?;

        room.players[slot.index()] = Some(conn);
        room.host.send(ServerMsg::PlayerJoined { player: slot });

        info!(room_id, slot = %slot, "controller joined");
        Ok(())
    }

    /// Forward `msg` to the room's host. Input is best-effort telemetry:
    /// a missing room or dead host drops the message without a reply.
    pub fn route_to_host(&self, room_id: &str, msg: ServerMsg) {
        if let Some(room) = self.rooms.get(room_id) {
            room.host.send(msg);
        }
    }

    /// Deliver a feedback cue: multicast to the room group (minus `sender`)
    /// for [`FeedbackTarget::All`], unicast for a slot target, drop if the
    /// slot has not joined.
    pub fn route_feedback(
        &self,
        room_id: &str,
        sender: ConnId,
        target: FeedbackTarget,
        msg: ServerMsg,
    ) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        match target {
            FeedbackTarget::All => room.multicast_except(sender, &msg),
            FeedbackTarget::Slot(slot) => {
                if let Some(conn) = &room.players[slot.index()] {
                    conn.send(msg);
                }
            }
        }
    }

    /// Broadcast the end of a round and record the winner in the room tally.
    pub fn route_game_over(&self, room_id: &str, sender: ConnId, winner: PlayerSlot) {
        let Some(mut room) = self.rooms.get_mut(room_id) else {
            return;
        };

        room.scores[winner.index()] += 1;
        room.multicast_except(sender, &ServerMsg::GameOver { winner });
    }

    /// Current score tally for a room, if it exists.
    pub fn room_scores(&self, room_id: &str) -> Option<[u32; 2]> {
        self.rooms.get(room_id).map(|room| room.scores)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn controller_count(&self) -> usize {
        self.rooms
            .iter()
            .map(|room| room.players.iter().flatten().count())
            .sum()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> (ConnectionHandle, mpsc::UnboundedReceiver<ServerMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(Uuid::new_v4(), tx), rx)
    }

    fn feedback(kind: &str) -> ServerMsg {
        ServerMsg::Feedback {
            kind: kind.to_string(),
            data: serde_json::json!({}),
        }
    }

    #[test]
    fn join_unknown_room_is_an_error() {
        let registry = RoomRegistry::new();
        let (handle, _rx) = conn();

        let err = registry
            .join_room("NOPE", PlayerSlot::One, handle)
            .unwrap_err();
        assert!(matches!(err, RegistryError::RoomNotFound(_)));
    }

    #[test]
    fn join_notifies_host_with_slot() {
        let registry = RoomRegistry::new();
        let (host, mut host_rx) = conn();
        let (player, _player_rx) = conn();

        registry.create_room("R1", host);
        registry.join_room("R1", PlayerSlot::Two, player).unwrap();

        match host_rx.try_recv().unwrap() {
            ServerMsg::PlayerJoined { player } => assert_eq!(player, PlayerSlot::Two),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn broadcast_feedback_skips_the_sender() {
        let registry = RoomRegistry::new();
        let (host, mut host_rx) = conn();
        let (p1, mut p1_rx) = conn();
        let (p2, mut p2_rx) = conn();
        let host_id = host.id();

        registry.create_room("R1", host);
        registry.join_room("R1", PlayerSlot::One, p1).unwrap();
        registry.join_room("R1", PlayerSlot::Two, p2).unwrap();

        registry.route_feedback("R1", host_id, FeedbackTarget::All, feedback("goal"));

        assert!(matches!(
            p1_rx.try_recv().unwrap(),
            ServerMsg::Feedback { .. }
        ));
        assert!(matches!(
            p2_rx.try_recv().unwrap(),
            ServerMsg::Feedback { .. }
        ));
        // Only the join notifications, not the host's own feedback.
        assert!(matches!(
            host_rx.try_recv().unwrap(),
            ServerMsg::PlayerJoined { .. }
        ));
        assert!(matches!(
            host_rx.try_recv().unwrap(),
            ServerMsg::PlayerJoined { .. }
        ));
        assert!(host_rx.try_recv().is_err());
    }

    #[test]
    fn slot_feedback_reaches_only_that_slot() {
        let registry = RoomRegistry::new();
        let (host, _host_rx) = conn();
        let (p1, mut p1_rx) = conn();
        let (p2, mut p2_rx) = conn();
        let host_id = host.id();

        registry.create_room("R1", host);
        registry.join_room("R1", PlayerSlot::One, p1).unwrap();
        registry.join_room("R1", PlayerSlot::Two, p2).unwrap();

        registry.route_feedback(
            "R1",
            host_id,
            FeedbackTarget::Slot(PlayerSlot::Two),
            feedback("ball-hit"),
        );

        assert!(p1_rx.try_recv().is_err());
        assert!(matches!(
            p2_rx.try_recv().unwrap(),
            ServerMsg::Feedback { .. }
        ));
    }

    #[test]
    fn feedback_to_vacant_slot_is_dropped() {
        let registry = RoomRegistry::new();
        let (host, _host_rx) = conn();
        let (p1, mut p1_rx) = conn();
        let host_id = host.id();

        registry.create_room("R1", host);
        registry.join_room("R1", PlayerSlot::One, p1).unwrap();

        registry.route_feedback(
            "R1",
            host_id,
            FeedbackTarget::Slot(PlayerSlot::Two),
            feedback("ball-hit"),
        );

        assert!(p1_rx.try_recv().is_err());
    }

    #[test]
    fn create_room_overwrites_existing_host() {
        let registry = RoomRegistry::new();
        let (first_host, mut first_rx) = conn();
        let (second_host, mut second_rx) = conn();
        let (player, _player_rx) = conn();

        registry.create_room("R1", first_host);
        registry.create_room("R1", second_host);
        registry.join_room("R1", PlayerSlot::One, player).unwrap();

        assert!(first_rx.try_recv().is_err());
        assert!(matches!(
            second_rx.try_recv().unwrap(),
            ServerMsg::PlayerJoined { .. }
        ));
    }

    #[test]
    fn routing_to_missing_room_is_silent() {
        let registry = RoomRegistry::new();

        registry.route_to_host(
            "GHOST",
            ServerMsg::PlayerMove {
                player: PlayerSlot::One,
                direction: Some(1),
                active: true,
            },
        );
        registry.route_feedback(
            "GHOST",
            Uuid::new_v4(),
            FeedbackTarget::All,
            feedback("goal"),
        );
    }

    #[test]
    fn game_over_updates_tally_and_broadcasts() {
        let registry = RoomRegistry::new();
        let (host, _host_rx) = conn();
        let (p1, mut p1_rx) = conn();
        let host_id = host.id();

        registry.create_room("R1", host);
        registry.join_room("R1", PlayerSlot::One, p1).unwrap();

        registry.route_game_over("R1", host_id, PlayerSlot::Two);
        registry.route_game_over("R1", host_id, PlayerSlot::Two);

        assert_eq!(registry.room_scores("R1"), Some([0, 2]));
        assert!(matches!(
            p1_rx.try_recv().unwrap(),
            ServerMsg::GameOver {
                winner: PlayerSlot::Two
            }
        ));
    }
}
