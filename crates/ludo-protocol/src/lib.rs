//! Wire protocol for ludo rooms.
//!
//! This crate defines what clients and rooms say to each other:
//!
//! - **Intents** ([`ClientIntent`]): what a client asks for. Every intent
//!   is schema-checked with [`ClientIntent::validate`] before a room sees it.
//! - **Events** ([`ServerEvent`]): what a room tells its observers, and
//!   [`Recipient`] to say who gets each one.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//! - **Errors** ([`ProtocolError`] for the boundary itself, [`ErrorCode`]
//!   for typed rejections sent back to a client).
//!
//! ```text
//! transport (bytes) → decode_intent → ClientIntent → room → ServerEvent → encode
//! ```

mod codec;
mod error;
mod event;
mod intent;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ErrorCode, ProtocolError};
pub use event::{ConnectionId, KickReason, Recipient, ServerEvent, SkipReason};
pub use intent::{ClientIntent, MAX_MESSAGE_BYTES, MAX_NAME_LEN, decode_intent};
