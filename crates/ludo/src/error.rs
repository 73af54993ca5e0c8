//! Unified error type for the ludo crates.

use ludo_bot::BotError;
use ludo_engine::RuleError;
use ludo_protocol::ProtocolError;
use ludo_room::RoomError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LudoError {
    /// A rule violation reported by the engine.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// A bot could not produce an action.
    #[error(transparent)]
    Bot(#[from] BotError),

    /// A payload failed to encode, decode or validate.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The room could not be reached.
    #[error(transparent)]
    Room(#[from] RoomError),
}
