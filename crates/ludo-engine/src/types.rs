//! Identity types shared by every layer: colours, players, rooms, pawns.
//!
//! These are the nouns that travel inside snapshots and wire messages, so
//! every one of them is `Serialize + Deserialize` and has a compact,
//! human-readable `Display` for logging.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity newtypes
// ---------------------------------------------------------------------------

/// A stable player identity.
///
/// Unlike a connection, a `PlayerId` survives reconnects: the client keeps
/// it and presents it again when it rejoins. `#[serde(transparent)]` keeps
/// the JSON form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Generates a fresh random identity for a joiner who brought none.
    pub fn random() -> Self {
        use rand::Rng;
        Self(rand::rng().random())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The identifier of one game session (a room code).
///
/// How codes are generated is the room directory's business; the engine
/// only carries the value around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One of the four seat colours.
///
/// The declaration order *is* the turn rotation order, which is why the
/// enum derives `Ord`: sorting players by colour puts them in the order in
/// which they take turns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    /// All colours in rotation order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Yellow, Color::Blue];

    /// Position of this colour in the rotation (0..4).
    pub fn index(self) -> usize {
        self as usize
    }

    /// The colour that follows this one in rotation, wrapping around.
    pub fn next(self) -> Color {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PawnId
// ---------------------------------------------------------------------------

/// Identity of a pawn: its colour plus its index (0..4) within that colour.
///
/// The id never changes, even when the pawn is captured and sent back to
/// base, so it is safe to use as a move selector in client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PawnId {
    pub color: Color,
    pub index: u8,
}

impl PawnId {
    pub fn new(color: Color, index: u8) -> Self {
        Self { color, index }
    }
}

impl fmt::Display for PawnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.color, self.index)
    }
}
