//! Session orchestration for ludo rooms.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`GameState`](ludo_engine::GameState), the connection bindings and the
//! turn alarm. The pure engine decides what is legal; this crate decides
//! when things happen: turn deadlines, bot pacing, AFK escalation and the
//! single-flight guard around each turn step.
//!
//! # Key types
//!
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: timing, AFK and bot settings for one room
//! - [`AfkPolicy`]: what happens to a player who keeps timing out
//! - [`spawn_room`]: start an actor

mod config;
mod error;
mod room;

pub use config::{AfkPolicy, RoomConfig};
pub use error::RoomError;
pub use room::{EventSender, RoomHandle, spawn_room, spawn_room_with_sources};
