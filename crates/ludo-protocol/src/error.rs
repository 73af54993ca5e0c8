//! Error types for the protocol layer.
//!
//! [`ProtocolError`] is what goes wrong at the boundary: bytes that don't
//! decode, or decode into something that breaks the schema. Such input is
//! rejected before any room sees it.
//!
//! [`ErrorCode`] is the typed reason sent back to a client when a room
//! refuses an intent.

use serde::{Deserialize, Serialize};

use ludo_engine::RuleError;

/// Errors raised while encoding, decoding or validating messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Malformed JSON, missing fields, wrong types, or truncated input.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// Decoded fine but violates the schema, e.g. an empty name or a
    /// player count outside 2..=4.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Machine-readable reason attached to an error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Rule violations, reported to the requester only --
    NotYourTurn,
    WrongPhase,
    RollTooSoon,
    DiceNotRolled,
    UnknownPawn,
    IllegalMove,
    UnknownPlayer,
    NotEnoughPlayers,

    // -- Capacity, at join time --
    AlreadyJoined,
    RoomFull,
    NoColorAvailable,
    GameInProgress,
    RoomNotFound,

    // -- Orchestration --
    /// A turn step is already being processed.
    Busy,
    /// Only the room host may do this.
    NotHost,
    /// The connection has not joined the room.
    NotJoined,

    /// The message failed to decode or validate.
    InvalidMessage,
    Internal,
}

impl From<&RuleError> for ErrorCode {
    fn from(err: &RuleError) -> Self {
        match err {
            RuleError::NotYourTurn(_) => ErrorCode::NotYourTurn,
            RuleError::WrongPhase { .. } => ErrorCode::WrongPhase,
            RuleError::RollTooSoon { .. } => ErrorCode::RollTooSoon,
            RuleError::DiceNotRolled => ErrorCode::DiceNotRolled,
            RuleError::UnknownPawn(_) => ErrorCode::UnknownPawn,
            RuleError::IllegalMove(_) => ErrorCode::IllegalMove,
            RuleError::UnknownPlayer(_) => ErrorCode::UnknownPlayer,
            RuleError::AlreadyJoined(_) => ErrorCode::AlreadyJoined,
            RuleError::RoomFull(_) => ErrorCode::RoomFull,
            RuleError::NoColorAvailable => ErrorCode::NoColorAvailable,
            RuleError::GameInProgress => ErrorCode::GameInProgress,
            RuleError::NotEnoughPlayers(_) => ErrorCode::NotEnoughPlayers,
            RuleError::NoPlayerForColor(_) => ErrorCode::Internal,
        }
    }
}

impl From<&ProtocolError> for ErrorCode {
    fn from(_: &ProtocolError) -> Self {
        ErrorCode::InvalidMessage
    }
}
