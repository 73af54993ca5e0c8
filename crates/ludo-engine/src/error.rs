//! Error types for the rules engine.
//!
//! Every expected rule violation is a `RuleError` value, never a panic.
//! The state that produced the error is left untouched, so callers can
//! report the reason to the requester and carry on.

use crate::{Color, PawnId, Phase, PlayerId};

/// Why the engine refused an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The requester does not hold the current turn.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The action is not allowed in the current phase. `dice` is the
    /// value still waiting to be played, if any.
    #[error("action not allowed in phase {phase} (pending dice: {dice:?})")]
    WrongPhase { phase: Phase, dice: Option<u8> },

    /// A roll arrived inside the debounce window of the previous roll.
    #[error("rolled too soon, wait {wait_ms} ms")]
    RollTooSoon { wait_ms: u64 },

    /// Moving requires a pending dice value.
    #[error("no dice value to move with")]
    DiceNotRolled,

    /// No pawn with this id exists in the session.
    #[error("unknown pawn {0}")]
    UnknownPawn(PawnId),

    /// The pawn exists but is not among the legal moves for this roll.
    #[error("pawn {0} has no legal move")]
    IllegalMove(PawnId),

    /// No player with this id is seated in the session.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The player id is already seated.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// Every seat up to `max_players` is taken.
    #[error("room is full ({0} players)")]
    RoomFull(u8),

    /// All four colours are in use.
    #[error("no colour available")]
    NoColorAvailable,

    /// New players cannot join once the game has started.
    #[error("game already in progress")]
    GameInProgress,

    /// The game needs at least this many players to start.
    #[error("need at least {0} players to start")]
    NotEnoughPlayers(usize),

    /// A colour has no seated player (corrupt or stale state).
    #[error("no player holds colour {0}")]
    NoPlayerForColor(Color),
}
