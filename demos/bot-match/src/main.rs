//! Plays one room to the end: an idle human host plus three bots.
//!
//! The host never acts, so their turns time out until the AFK policy
//! kicks in. Everything the room broadcasts is logged as it happens.
//!
//! ```text
//! cargo run -p bot-match                    # built-in fast config
//! cargo run -p bot-match -- room.json       # RoomConfig from a file
//! RUST_LOG=ludo_room=debug cargo run -p bot-match
//! ```

use std::time::Duration;

use ludo::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

fn demo_config() -> RoomConfig {
    RoomConfig {
        turn_timeout: Duration::from_secs(1),
        bot_think_delay: Duration::from_millis(20),
        bot_move_delay: Duration::from_millis(30),
        roll_debounce: Duration::ZERO,
        afk_threshold: 2,
        afk_policy: AfkPolicy::BotTakeover,
        ..RoomConfig::default()
    }
}

fn load_config() -> Result<RoomConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let config = serde_json::from_str(&raw)?;
            info!(%path, "loaded room config");
            Ok(config)
        }
        None => Ok(demo_config()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ludo::init_tracing();
    let config = load_config()?;

    let room = spawn_room(RoomId::new("DEMO"), config);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let host = ConnectionId(1);

    room.attach(host, tx).await?;
    room.send_intent(
        host,
        ClientIntent::Join {
            name: "idle host".into(),
            create: true,
            player_id: None,
            player_count: Some(4),
            bot_count: Some(3),
        },
    )
    .await?;
    room.send_intent(host, ClientIntent::Start).await?;

    let mut turns = 0u32;
    while let Some(event) = rx.recv().await {
        match event {
            ServerEvent::DiceRolled { color, value, weighted, .. } => {
                turns += 1;
                info!(%color, value, weighted, "rolled");
            }
            ServerEvent::MoveExecuted { color, pawn_id, from, to, captured, .. } => {
                info!(%color, %pawn_id, from, to, captures = captured.len(), "moved");
            }
            ServerEvent::TurnSkipped { color, reason, .. } => info!(%color, %reason, "skipped"),
            ServerEvent::PlayerKicked { color, replaced_by_bot, .. } => {
                info!(%color, replaced_by_bot, "host kicked for inactivity");
            }
            ServerEvent::Error { code, message } => info!(?code, %message, "rejected"),
            ServerEvent::State { state } if state.phase == Phase::Finished => {
                print_result(&state, turns);
                break;
            }
            _ => {}
        }
    }

    room.shutdown().await?;
    Ok(())
}

fn print_result(state: &GameState, turns: u32) {
    let mut players: Vec<&Player> = state.players.iter().collect();
    players.sort_by_key(|p| p.rank.unwrap_or(u8::MAX));

    println!("game over after {turns} rolls");
    for player in players {
        let rank = player.rank.map_or("-".to_string(), |r| r.to_string());
        let kind = if player.is_bot { "bot" } else { "human" };
        println!("  {rank}. {} ({}, {kind})", player.name, player.color);
    }
}
