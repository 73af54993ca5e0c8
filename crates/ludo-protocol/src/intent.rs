//! Inbound intents and their schema checks.

use serde::{Deserialize, Serialize};

use ludo_engine::board::PAWNS_PER_COLOR;
use ludo_engine::turn::{MAX_PLAYERS, MIN_PLAYERS};
use ludo_engine::{PawnId, PlayerId};

use crate::{Codec, ProtocolError};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 24;
/// Largest accepted inbound payload.
pub const MAX_MESSAGE_BYTES: usize = 4 * 1024;

/// Something a client asks a room to do.
///
/// Internally tagged, so on the wire a roll is `{"type":"roll"}` and a
/// move is `{"type":"move","pawn_id":{"color":"red","index":2}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientIntent {
    /// Take a seat, or reclaim one with a persisted `player_id`.
    ///
    /// `player_count` and `bot_count` only matter to the joiner who creates
    /// the room.
    Join {
        name: String,
        #[serde(default)]
        create: bool,
        #[serde(default)]
        player_id: Option<PlayerId>,
        #[serde(default)]
        player_count: Option<u8>,
        #[serde(default)]
        bot_count: Option<u8>,
    },
    Roll,
    Move {
        pawn_id: PawnId,
    },
    /// Host only.
    Start,
    /// Host only.
    AddBot,
}

impl ClientIntent {
    /// Schema checks that need no room state.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] describing the first violation.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientIntent::Join {
                name,
                player_count,
                bot_count,
                ..
            } => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(invalid("name must not be empty"));
                }
                if trimmed.chars().count() > MAX_NAME_LEN {
                    return Err(invalid(format!("name longer than {MAX_NAME_LEN} characters")));
                }
                if trimmed.chars().any(char::is_control) {
                    return Err(invalid("name contains control characters"));
                }
                let players = player_count.unwrap_or(MAX_PLAYERS);
                if !(MIN_PLAYERS as u8..=MAX_PLAYERS).contains(&players) {
                    return Err(invalid(format!(
                        "player_count must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
                    )));
                }
                // The joiner always takes one seat.
                if bot_count.is_some_and(|bots| bots >= players) {
                    return Err(invalid("bot_count must leave a seat for the host"));
                }
                Ok(())
            }
            ClientIntent::Move { pawn_id } if pawn_id.index >= PAWNS_PER_COLOR => {
                Err(invalid(format!("pawn index {} out of range", pawn_id.index)))
            }
            _ => Ok(()),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientIntent::Join { .. } => "join",
            ClientIntent::Roll => "roll",
            ClientIntent::Move { .. } => "move",
            ClientIntent::Start => "start",
            ClientIntent::AddBot => "add_bot",
        }
    }
}

fn invalid(reason: impl Into<String>) -> ProtocolError {
    ProtocolError::InvalidMessage(reason.into())
}

/// Decodes and validates one inbound payload. Anything that comes back
/// `Ok` is safe to hand to a room.
///
/// # Errors
/// Oversized input, decode failures and schema violations.
pub fn decode_intent<C: Codec>(codec: &C, data: &[u8]) -> Result<ClientIntent, ProtocolError> {
    if data.len() > MAX_MESSAGE_BYTES {
        return Err(invalid(format!(
            "message of {} bytes exceeds {MAX_MESSAGE_BYTES}",
            data.len()
        )));
    }
    let intent: ClientIntent = codec.decode(data)?;
    intent.validate()?;
    Ok(intent)
}
