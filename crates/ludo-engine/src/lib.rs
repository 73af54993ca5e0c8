//! Rules engine for a four-colour dice race game.
//!
//! The engine is the single source of truth for what is legal. It is made
//! of small, synchronous, side-effect-free pieces:
//!
//! - [`board`]: static geometry and the relative → absolute conversion
//! - [`dice`]: die values, six-bias, and the roll gate
//! - [`rules`]: legal moves, captures, move execution
//! - [`turn`]: roster, phase transitions, rotation, ranking
//!
//! Everything operates on a [`GameState`] snapshot and returns a new one.
//! The only nondeterministic input is the [`RandomSource`] behind the dice.
//!
//! ```text
//! intent → dice / rules (validate + compute) → turn (advance) → new GameState
//! ```

pub mod board;
pub mod dice;
pub mod rules;
pub mod turn;

mod error;
mod state;
mod types;

pub use dice::{Dice, RandomSource, RollOutcome, SeededSource, SequenceSource, ThreadSource};
pub use error::RuleError;
pub use rules::{Move, MoveOutcome, execute_move, valid_moves};
pub use state::{GameState, LastMove, Pawn, Phase, Player};
pub use types::{Color, PawnId, PlayerId, RoomId};
