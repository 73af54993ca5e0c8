use serde::{Deserialize, Serialize};

use ludo_engine::{Color, GameState, Move, PawnId, Phase, RandomSource, valid_moves};

use crate::BotError;
use crate::score::{ScoreWeights, score_move};

/// What a bot wants to do next.
///
/// `Roll` carries no value: the room's dice gate produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Roll,
    Move(PawnId),
    /// Dice are pending but no legal move exists.
    Skip,
}

/// The closed set of bot behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStrategy {
    Random,
    WeightedRandom,
    Scored(ScoreWeights),
}

impl Default for BotStrategy {
    fn default() -> Self {
        BotStrategy::Scored(ScoreWeights::BALANCED)
    }
}

impl BotStrategy {
    /// Decides the next action for `color`.
    ///
    /// In `Rolling` the answer is always [`BotAction::Roll`]. In `Moving`
    /// the strategy picks among [`valid_moves`], or [`BotAction::Skip`]
    /// when there are none. `rng` is only consulted by the random tiers.
    pub fn decide(
        &self,
        state: &GameState,
        color: Color,
        rng: &mut dyn RandomSource,
    ) -> Result<BotAction, BotError> {
        if state.current_turn != Some(color) {
            return Err(BotError::NotOnTurn {
                color,
                current: state.current_turn,
            });
        }
        match state.phase {
            Phase::Rolling => return Ok(BotAction::Roll),
            Phase::Moving => {}
            other => return Err(BotError::NothingToDecide(other)),
        }

        let moves = valid_moves(state);
        let chosen = match self {
            BotStrategy::Random => pick_random(&moves, rng),
            BotStrategy::WeightedRandom => pick_weighted(&moves, rng),
            BotStrategy::Scored(weights) => pick_best(state, color, &moves, weights),
        };

        let action = chosen.map_or(BotAction::Skip, |mv| BotAction::Move(mv.pawn_id));
        tracing::trace!(%color, ?action, candidates = moves.len(), "bot decided");
        Ok(action)
    }
}

fn pick_random<'a>(moves: &'a [Move], rng: &mut dyn RandomSource) -> Option<&'a Move> {
    if moves.is_empty() {
        return None;
    }
    let index = (rng.next_unit() * moves.len() as f64) as usize;
    moves.get(index.min(moves.len() - 1))
}

fn pick_weighted<'a>(moves: &'a [Move], rng: &mut dyn RandomSource) -> Option<&'a Move> {
    moves
        .iter()
        .find(|m| m.reaches_goal)
        .or_else(|| moves.iter().find(|m| m.captures))
        .or_else(|| pick_random(moves, rng))
}

/// Highest score wins; the first of equal scores is kept.
fn pick_best<'a>(
    state: &GameState,
    color: Color,
    moves: &'a [Move],
    weights: &ScoreWeights,
) -> Option<&'a Move> {
    let mut best: Option<(&Move, f64)> = None;
    for mv in moves {
        let score = score_move(state, color, mv, weights);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((mv, score));
        }
    }
    best.map(|(mv, _)| mv)
}
