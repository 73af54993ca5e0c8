//! The session aggregate: everything needed to rebuild a game from scratch.
//!
//! [`GameState`] is the unit the orchestrator snapshots and broadcasts. The
//! engine never keeps state of its own outside it; each rule function takes
//! a `&GameState` and hands back a new one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{self, BASE, GOAL, PAWNS_PER_COLOR};
use crate::{Color, PawnId, PlayerId, RoomId};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
/// Waiting ──start──→ Rolling ──roll──→ Moving ──move/skip──→ Rolling ...
///                       │                                      │
///                       └──────────── last rank ───────────────┴──→ Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Roster is being assembled. Nobody rolls yet.
    #[default]
    Waiting,
    /// The current colour must roll.
    Rolling,
    /// The current colour rolled and must pick a pawn.
    Moving,
    /// Terminal. Every rank has been handed out.
    Finished,
}

impl Phase {
    /// `true` while turns are being played.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Rolling | Self::Moving)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Rolling => write!(f, "Rolling"),
            Self::Moving => write!(f, "Moving"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pawn / Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pawn {
    pub id: PawnId,
    pub color: Color,
    pub index: u8,
    /// Position relative to `color`. See [`crate::board`].
    pub position: u8,
}

impl Pawn {
    /// A fresh pawn sitting in base.
    pub fn new(color: Color, index: u8) -> Self {
        Self {
            id: PawnId::new(color, index),
            color,
            index,
            position: BASE,
        }
    }

    pub fn is_at_base(&self) -> bool {
        self.position == BASE
    }

    pub fn is_at_goal(&self) -> bool {
        self.position == GOAL
    }

    /// Absolute square on the shared loop, if the pawn is on it.
    pub fn absolute(&self) -> Option<u8> {
        board::absolute(self.color, self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identity, survives reconnects.
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub is_bot: bool,
    /// `false` while the player's connection is gone.
    pub active: bool,
    /// Finishing place, handed out once and never changed.
    pub rank: Option<u8>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: Color, is_bot: bool) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            is_bot,
            active: true,
            rank: None,
        }
    }

    /// Can this player still take turns?
    pub fn is_contending(&self) -> bool {
        self.active && self.rank.is_none()
    }
}

/// Record of the most recent executed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub color: Color,
    pub pawn_id: PawnId,
    pub from: u8,
    pub to: u8,
    pub captured: Vec<PawnId>,
    pub extra_turn: bool,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: RoomId,
    pub max_players: u8,
    /// Seated players, kept sorted by colour (rotation order).
    pub players: Vec<Player>,
    /// Four pawns per seated colour.
    pub pawns: Vec<Pawn>,
    pub current_turn: Option<Color>,
    pub dice_value: Option<u8>,
    pub phase: Phase,
    /// Sixes rolled in a row by the current colour.
    pub consecutive_sixes: u8,
    pub last_move: Option<LastMove>,
    /// Clock reading (ms) of the last accepted roll, for debouncing.
    pub last_roll_at: Option<u64>,
    /// The player who finished first.
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// An empty session waiting for players.
    pub fn new(room_id: RoomId, max_players: u8) -> Self {
        Self {
            room_id,
            max_players,
            players: Vec::new(),
            pawns: Vec::new(),
            current_turn: None,
            dice_value: None,
            phase: Phase::Waiting,
            consecutive_sixes: 0,
            last_move: None,
            last_roll_at: None,
            winner: None,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_color(&self, color: Color) -> Option<&Player> {
        self.players.iter().find(|p| p.color == color)
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_turn.and_then(|c| self.player_by_color(c))
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.id == id)
    }

    pub fn pawn_mut(&mut self, id: PawnId) -> Option<&mut Pawn> {
        self.pawns.iter_mut().find(|p| p.id == id)
    }

    pub fn pawns_of(&self, color: Color) -> impl Iterator<Item = &Pawn> {
        self.pawns.iter().filter(move |p| p.color == color)
    }

    pub fn pawns_at_base(&self, color: Color) -> usize {
        self.pawns_of(color).filter(|p| p.is_at_base()).count()
    }

    /// `true` once all four of a colour's pawns sit on the goal.
    pub fn all_home(&self, color: Color) -> bool {
        let mut count = 0;
        for pawn in self.pawns_of(color) {
            if !pawn.is_at_goal() {
                return false;
            }
            count += 1;
        }
        count == PAWNS_PER_COLOR as usize
    }

    /// Colours not yet taken, in rotation order.
    pub fn free_colors(&self) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|c| self.player_by_color(*c).is_none())
            .collect()
    }

    pub fn unranked_count(&self) -> usize {
        self.players.iter().filter(|p| p.rank.is_none()).count()
    }

    /// The rank the next finisher will receive.
    pub fn next_rank(&self) -> u8 {
        self.players.iter().filter_map(|p| p.rank).max().unwrap_or(0) + 1
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}
