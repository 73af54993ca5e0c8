//! Outbound events and their addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

use ludo_engine::{Color, GameState, PawnId, PlayerId, RoomId};

use crate::ErrorCode;

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// A transport connection. Transient: a reconnecting player arrives on a
/// new one and is matched back to their seat by [`PlayerId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Who a [`ServerEvent`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every attached connection.
    All,
    /// One connection, typically the requester of a rejected intent.
    Connection(ConnectionId),
}

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

/// Why a turn ended without a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The roll left no legal move.
    NoValidMoves,
    /// Third six in a row.
    ThreeSixes,
    /// The turn alarm fired before the player acted.
    Timeout,
    /// The player on turn dropped their connection.
    Disconnected,
    /// A turn step failed internally and the room forced progress.
    Recovered,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoValidMoves => "no valid moves",
            SkipReason::ThreeSixes => "three sixes",
            SkipReason::Timeout => "timeout",
            SkipReason::Disconnected => "disconnected",
            SkipReason::Recovered => "recovered",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickReason {
    /// Too many turn timeouts in a row.
    Inactive,
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Everything a room reports to its observers.
///
/// Every accepted change is followed by exactly one [`ServerEvent::State`]
/// carrying the full snapshot; the other events describe what happened so
/// clients can animate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent to a joiner: where they sit and whether they host.
    RoomInfo {
        room_id: RoomId,
        player_id: PlayerId,
        color: Color,
        host: bool,
        max_players: u8,
    },

    State {
        state: GameState,
    },

    /// `movable` lists the pawns with a legal move for this value.
    DiceRolled {
        color: Color,
        value: u8,
        weighted: bool,
        movable: Vec<PawnId>,
    },

    MoveExecuted {
        color: Color,
        pawn_id: PawnId,
        from: u8,
        to: u8,
        captured: Vec<PawnId>,
        extra_turn: bool,
    },

    TurnSkipped {
        color: Color,
        reason: SkipReason,
        next: Option<Color>,
    },

    PlayerJoined {
        player_id: PlayerId,
        name: String,
        color: Color,
        is_bot: bool,
    },

    /// `replaced_by_bot` is set when the seat stays in play under bot
    /// control instead of leaving the roster.
    PlayerKicked {
        player_id: PlayerId,
        color: Color,
        reason: KickReason,
        replaced_by_bot: bool,
    },

    /// A human's turn alarm was armed. `deadline_ms` is on the room clock.
    TurnTimerStarted {
        color: Color,
        deadline_ms: u64,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code,
            message: message.into(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::RoomInfo { .. } => "room_info",
            ServerEvent::State { .. } => "state",
            ServerEvent::DiceRolled { .. } => "dice_rolled",
            ServerEvent::MoveExecuted { .. } => "move_executed",
            ServerEvent::TurnSkipped { .. } => "turn_skipped",
            ServerEvent::PlayerJoined { .. } => "player_joined",
            ServerEvent::PlayerKicked { .. } => "player_kicked",
            ServerEvent::TurnTimerStarted { .. } => "turn_timer_started",
            ServerEvent::Error { .. } => "error",
        }
    }
}
