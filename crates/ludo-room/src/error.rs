//! Error types for the room layer.

use ludo_engine::{RoomId, RuleError};
use ludo_protocol::{ErrorCode, ProtocolError};

/// Errors returned to callers of [`RoomHandle`](crate::RoomHandle).
///
/// Rejected intents are not errors at this level: the room answers them
/// with an error event on the requester's connection.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The payload never reached the room.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Why the actor refused an intent. Sent back as an error event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub code: ErrorCode,
    pub message: String,
}

impl Rejection {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<RuleError> for Rejection {
    fn from(err: RuleError) -> Self {
        Self::new(ErrorCode::from(&err), err.to_string())
    }
}
