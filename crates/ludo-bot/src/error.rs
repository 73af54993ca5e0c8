use ludo_engine::{Color, Phase};

/// A bot was asked to act when it has nothing to decide.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BotError {
    #[error("{color} asked to act, but the turn belongs to {current:?}")]
    NotOnTurn { color: Color, current: Option<Color> },

    #[error("no decision to make in phase {0}")]
    NothingToDecide(Phase),
}
