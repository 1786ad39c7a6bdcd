//! WebSocket upgrade handler and per-connection relay session
//!
//! Each connection is bound to a role exactly once: create-room makes it the
//! host of that room, join-room makes it the controller for one slot. All
//! later routing uses the bound identity; room and slot claims in message
//! payloads are ignored after binding.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::room::ConnectionHandle;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ActionKind, ClientMsg, PlayerSlot, ServerMsg};

/// Role a connection has been bound to.
enum Session {
    Unbound,
    Host { room_id: String },
    Controller { room_id: String, slot: PlayerSlot },
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    debug!(conn_id = %conn_id, "connection opened");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMsg>();
    let handle = ConnectionHandle::new(conn_id, out_tx);

    // Writer task: registry-routed messages -> WebSocket.
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "failed to encode message");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let rate_limiter = ConnectionRateLimiter::new();
    let mut session = Session::Unbound;

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check() {
                    warn!(conn_id = %conn_id, "rate limited message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => dispatch(&state, &handle, &mut session, msg),
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "failed to parse message");
                    }
                }
            }
            Ok(Message::Close(_)) => {
                debug!(conn_id = %conn_id, "client initiated close");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "websocket error");
                break;
            }
        }
    }

    // A vanished controller keeps its last latched input on the host; a
    // vanished host leaves the room orphaned. Neither is cleaned up here.
    match &session {
        Session::Host { room_id } => {
            info!(conn_id = %conn_id, room_id = %room_id, "host disconnected");
        }
        Session::Controller { room_id, slot } => {
            info!(conn_id = %conn_id, room_id = %room_id, slot = %slot, "controller disconnected");
        }
        Session::Unbound => {
            debug!(conn_id = %conn_id, "connection closed");
        }
    }

    writer.abort();
}

/// Route one inbound message. Misdirected traffic (input before a join,
/// feedback from a non-host) is dropped, matching the fire-and-forget
/// treatment of the input stream.
fn dispatch(state: &AppState, handle: &ConnectionHandle, session: &mut Session, msg: ClientMsg) {
    match msg {
        ClientMsg::CreateRoom { room_id } => {
            state.rooms.create_room(&room_id, handle.clone());
            *session = Session::Host { room_id };
        }

        ClientMsg::JoinRoom { room_id, player } => {
            match state.rooms.join_room(&room_id, player, handle.clone()) {
                Ok(()) => {
                    *session = Session::Controller {
                        room_id,
                        slot: player,
                    };
                }
                Err(e) => {
                    handle.send(ServerMsg::Error {
                        code: "room-not-found".to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        ClientMsg::MoveStart { direction, .. } => {
            if let Session::Controller { room_id, slot } = session {
                state.rooms.route_to_host(
                    room_id,
                    ServerMsg::PlayerMove {
                        player: *slot,
                        direction: Some(direction),
                        active: true,
                    },
                );
            }
        }

        ClientMsg::MoveStop { .. } => {
            if let Session::Controller { room_id, slot } = session {
                state.rooms.route_to_host(
                    room_id,
                    ServerMsg::PlayerMove {
                        player: *slot,
                        direction: None,
                        active: false,
                    },
                );
            }
        }

        ClientMsg::ActionJump { .. } => route_action(state, session, ActionKind::Jump),
        ClientMsg::ActionKick { .. } => route_action(state, session, ActionKind::Kick),
        ClientMsg::ActionAirHit { .. } => route_action(state, session, ActionKind::AirHit),

        ClientMsg::FeedbackEvent {
            target, kind, data, ..
        } => {
            if let Session::Host { room_id } = session {
                state.rooms.route_feedback(
                    room_id,
                    handle.id(),
                    target,
                    ServerMsg::Feedback { kind, data },
                );
            }
        }

        ClientMsg::GameOver { winner, .. } => {
            if let Session::Host { room_id } = session {
                state.rooms.route_game_over(room_id, handle.id(), winner);
            }
        }
    }
}

fn route_action(state: &AppState, session: &Session, kind: ActionKind) {
    if let Session::Controller { room_id, slot } = session {
        state.rooms.route_to_host(
            room_id,
            ServerMsg::PlayerAction {
                player: *slot,
                kind,
            },
        );
    }
}
