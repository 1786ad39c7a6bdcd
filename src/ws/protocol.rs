//! Relay protocol message definitions
//! These are the wire types coupling controllers, the relay, and the host.
//!
//! Every message is an `event`-tagged JSON object whose tag is the event
//! name. Delivery is at-most-once with no acknowledgement or sequencing;
//! each message is idempotent or state-replacing (latest direction wins).

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Player identity within a room, slot 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerSlot {
    One = 1,
    Two = 2,
}

impl PlayerSlot {
    /// Zero-based index for slot-keyed arrays.
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Sign of the horizontal direction toward the opponent's goal.
    pub fn goal_direction(self) -> f32 {
        match self {
            Self::One => 1.0,
            Self::Two => -1.0,
        }
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid player slot: {other}")),
        }
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> Self {
        slot as u8
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One-shot controller actions, edge-triggered and consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Jump,
    Kick,
    AirHit,
}

/// Addressee of a feedback event: the whole room group or one slot.
///
/// Encoded as the string `"all"` or the bare slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTarget {
    All,
    Slot(PlayerSlot),
}

impl Serialize for FeedbackTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Slot(slot) => serializer.serialize_u8(slot.number()),
        }
    }
}

impl<'de> Deserialize<'de> for FeedbackTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => PlayerSlot::try_from(n)
                .map(FeedbackTarget::Slot)
                .map_err(de::Error::custom),
            Raw::Text(s) if s == "all" => Ok(FeedbackTarget::All),
            Raw::Text(s) => Err(de::Error::custom(format!(
                "invalid feedback target: {s:?}"
            ))),
        }
    }
}

/// Messages sent to the relay (upstream from controllers and the host)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMsg {
    /// Host announces a new room.
    CreateRoom { room_id: String },

    /// Controller claims a slot in a room.
    JoinRoom { room_id: String, player: PlayerSlot },

    /// Begin continuous movement in `direction` (-1 or 1).
    MoveStart {
        room_id: String,
        player: PlayerSlot,
        direction: i8,
    },

    /// End continuous movement.
    MoveStop { room_id: String, player: PlayerSlot },

    ActionJump { room_id: String, player: PlayerSlot },

    ActionKick { room_id: String, player: PlayerSlot },

    ActionAirHit { room_id: String, player: PlayerSlot },

    /// Host requests client-side feedback (haptic/audio cue).
    FeedbackEvent {
        room_id: String,
        target: FeedbackTarget,
        #[serde(rename = "type")]
        kind: String,
        data: serde_json::Value,
    },

    /// Host announces the end of a round.
    GameOver { room_id: String, winner: PlayerSlot },
}

/// Messages sent from the relay (downstream to the host or controllers)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerMsg {
    /// To host: a controller bound itself to `player`.
    PlayerJoined { player: PlayerSlot },

    /// To host: mirrors move-start/move-stop. `direction` is absent on stop.
    PlayerMove {
        player: PlayerSlot,
        direction: Option<i8>,
        active: bool,
    },

    /// To host: mirrors the action-* events.
    PlayerAction {
        player: PlayerSlot,
        #[serde(rename = "type")]
        kind: ActionKind,
    },

    /// To controllers: haptic/audio trigger.
    Feedback {
        #[serde(rename = "type")]
        kind: String,
        data: serde_json::Value,
    },

    /// To controllers: round ended, cue win/lose feedback.
    GameOver { winner: PlayerSlot },

    /// Distinguishable error signal, e.g. joining an unknown room.
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_original_wire_names() {
        let msg = ClientMsg::MoveStart {
            room_id: "AB12CD".to_string(),
            player: PlayerSlot::One,
            direction: 1,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""event":"move-start""#), "{json}");
        assert!(json.contains(r#""player":1"#), "{json}");

        let msg = ClientMsg::ActionAirHit {
            room_id: "AB12CD".to_string(),
            player: PlayerSlot::Two,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""event":"action-air-hit""#), "{json}");
    }

    #[test]
    fn feedback_target_round_trips_both_forms() {
        let broadcast: ClientMsg = serde_json::from_str(
            r#"{"event":"feedback-event","room_id":"R","target":"all","type":"goal","data":{"winner":2}}"#,
        )
        .unwrap();
        match broadcast {
            ClientMsg::FeedbackEvent { target, kind, .. } => {
                assert_eq!(target, FeedbackTarget::All);
                assert_eq!(kind, "goal");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let unicast: ClientMsg = serde_json::from_str(
            r#"{"event":"feedback-event","room_id":"R","target":2,"type":"ball-hit","data":{"speed":10}}"#,
        )
        .unwrap();
        match unicast {
            ClientMsg::FeedbackEvent { target, .. } => {
                assert_eq!(target, FeedbackTarget::Slot(PlayerSlot::Two));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn action_kind_uses_kebab_case() {
        let json = serde_json::to_string(&ServerMsg::PlayerAction {
            player: PlayerSlot::One,
            kind: ActionKind::AirHit,
        })
        .unwrap();
        assert!(json.contains(r#""type":"air-hit""#), "{json}");
    }

    #[test]
    fn invalid_slot_is_rejected() {
        let result: Result<ClientMsg, _> =
            serde_json::from_str(r#"{"event":"join-room","room_id":"R","player":3}"#);
        assert!(result.is_err());
    }
}
