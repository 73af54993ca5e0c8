//! Bot players.
//!
//! A bot is a pure function from a snapshot to an action. It never invents
//! a move: every [`BotAction::Move`] it returns comes from
//! [`ludo_engine::valid_moves`]. The strategies form a closed set,
//! selected by configuration:
//!
//! - [`BotStrategy::Random`]: uniform over the legal moves
//! - [`BotStrategy::WeightedRandom`]: goal, else capture, else random
//! - [`BotStrategy::Scored`]: highest heuristic score wins, see [`score`]

mod error;
pub mod score;
mod strategy;

pub use error::BotError;
pub use score::ScoreWeights;
pub use strategy::{BotAction, BotStrategy};
