//! Websocket client binding the host loop to a relay

use futures::{SinkExt, StreamExt};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::game::HostInput;
use crate::host::HostGame;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const ROOM_CODE_LEN: usize = 6;

/// Short uppercase code controllers type or scan to find the room.
pub fn generate_room_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_CODE_LEN)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect()
}

/// Connect to the relay, create a room, and run the simulation until the
/// connection drops.
pub async fn run_host(config: &Config) -> anyhow::Result<()> {
    let room_id = generate_room_code();

    info!(relay_url = %config.relay_url, "connecting to relay");
    let (socket, _) = connect_async(config.relay_url.as_str()).await?;
    let (mut ws_sink, mut ws_stream) = socket.split();

    let (input_tx, input_rx) = mpsc::channel::<HostInput>(256);
    let (relay_tx, mut relay_rx) = mpsc::unbounded_channel::<ClientMsg>();

    relay_tx.send(ClientMsg::CreateRoom {
        room_id: room_id.clone(),
    })?;

    info!(room_id = %room_id, "room created");
    info!(
        "controllers join via /controller.html?room={}&player=1 and ?room={}&player=2",
        room_id, room_id
    );

    let sim_task = tokio::spawn(HostGame::new(room_id.clone(), input_rx, relay_tx.clone()).run());

    // Writer task: simulation events -> relay.
    let writer = tokio::spawn(async move {
        while let Some(msg) = relay_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "failed to encode relay message");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: relayed controller events -> simulation input buffer.
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerMsg>(&text) {
                Ok(msg) => {
                    if let Some(input) = host_input_from(msg) {
                        if input_tx.send(input).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to parse relay message");
                }
            },
            Ok(Message::Close(_)) => {
                info!("relay closed the connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "websocket error");
                break;
            }
        }
    }

    writer.abort();
    sim_task.abort();

    info!(room_id = %room_id, "host session ended");
    Ok(())
}

/// Map relayed messages onto simulation input; anything else is noise here.
fn host_input_from(msg: ServerMsg) -> Option<HostInput> {
    match msg {
        ServerMsg::PlayerJoined { player } => Some(HostInput::Joined { slot: player }),
        ServerMsg::PlayerMove {
            player,
            direction,
            active,
        } => Some(HostInput::Move {
            slot: player,
            direction: direction.unwrap_or(0) as f32,
            active,
        }),
        ServerMsg::PlayerAction { player, kind } => Some(HostInput::Action { slot: player, kind }),
        ServerMsg::Error { code, message } => {
            warn!(code = %code, message = %message, "relay error");
            None
        }
        other => {
            debug!(?other, "ignoring relay message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::{ActionKind, PlayerSlot};

    #[test]
    fn room_codes_are_short_and_uppercase() {
        for _ in 0..50 {
            let code = generate_room_code();
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn relayed_messages_map_onto_host_input() {
        match host_input_from(ServerMsg::PlayerMove {
            player: PlayerSlot::Two,
            direction: Some(-1),
            active: true,
        }) {
            Some(HostInput::Move {
                slot,
                direction,
                active,
            }) => {
                assert_eq!(slot, PlayerSlot::Two);
                assert_eq!(direction, -1.0);
                assert!(active);
            }
            other => panic!("unexpected input: {other:?}"),
        }

        let input = host_input_from(ServerMsg::PlayerAction {
            player: PlayerSlot::One,
            kind: ActionKind::AirHit,
        });
        assert!(matches!(
            input,
            Some(HostInput::Action {
                slot: PlayerSlot::One,
                kind: ActionKind::AirHit,
            })
        ));

        // Feedback echoes are not input.
        assert!(host_input_from(ServerMsg::GameOver {
            winner: PlayerSlot::One
        })
        .is_none());
    }
}
