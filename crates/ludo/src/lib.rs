//! # Ludo
//!
//! Server-authoritative engine for a four-colour dice race.
//!
//! The rules live in a pure engine that turns one immutable snapshot into
//! the next. A room actor drives that engine under real time: turn
//! deadlines, bot pacing, AFK escalation. Transports talk to a room through
//! a small intent/event vocabulary and never touch the state directly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ludo::prelude::*;
//!
//! # async fn run() -> Result<(), LudoError> {
//! ludo::init_tracing();
//! let room = spawn_room(RoomId::new("ABCD"), RoomConfig::default());
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let me = ConnectionId(1);
//! room.attach(me, tx).await?;
//! room.submit_raw(&JsonCodec, me, br#"{"type":"join","name":"ada","create":true,"bot_count":3}"#)
//!     .await?;
//! room.send_intent(me, ClientIntent::Start).await?;
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{}", event.kind());
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::LudoError;

pub use ludo_bot as bot;
pub use ludo_engine as engine;
pub use ludo_protocol as protocol;
pub use ludo_room as room;
pub use ludo_timer as timer;

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `info`. Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!("tracing initialised");
    }
}

/// Common imports for hosting a room.
pub mod prelude {
    pub use crate::LudoError;
    pub use ludo_bot::{BotAction, BotStrategy, ScoreWeights};
    pub use ludo_engine::{
        Color, GameState, Move, PawnId, Phase, Player, PlayerId, RandomSource, RoomId, RuleError,
        SeededSource, SequenceSource, ThreadSource,
    };
    pub use ludo_protocol::{
        ClientIntent, Codec, ConnectionId, ErrorCode, JsonCodec, ProtocolError, ServerEvent,
        SkipReason,
    };
    pub use ludo_room::{
        AfkPolicy, EventSender, RoomConfig, RoomError, RoomHandle, spawn_room,
        spawn_room_with_sources,
    };
}
