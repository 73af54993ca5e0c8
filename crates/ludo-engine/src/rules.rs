//! Move legality, capture resolution and move execution.
//!
//! All functions are pure: they read a snapshot and return data or a new
//! snapshot. Collisions between colours are always decided through
//! [`board::absolute`] via [`opponents_at`], shared by the legality check
//! and by capture resolution so the two can never disagree.

use serde::{Deserialize, Serialize};

use crate::board::{
    self, BASE, ENTER_VALUE, GOAL, HOME_STRETCH_START, TRACK_LENGTH,
};
use crate::{Color, GameState, LastMove, PawnId, Phase, PlayerId, RuleError, turn};

/// One legal option for the current roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub pawn_id: PawnId,
    pub from: u8,
    pub to: u8,
    /// Landing here sends an opponent back to base.
    pub captures: bool,
    /// Landing here finishes the pawn.
    pub reaches_goal: bool,
}

/// Where a pawn of `color` at `position` lands with `dice`, ignoring other
/// pawns. `None` if the roll cannot move it.
pub fn destination(color: Color, position: u8, dice: u8) -> Option<u8> {
    match position {
        BASE => (dice == ENTER_VALUE).then(|| board::start_square(color)),
        GOAL => None,
        p if board::is_in_home_stretch(p) => {
            let to = p + dice;
            (to <= GOAL).then_some(to)
        }
        p if board::is_on_track(p) => {
            let entry = board::home_entry_square(color);
            let remaining = (entry + TRACK_LENGTH - p) % TRACK_LENGTH;
            if dice > remaining {
                let to = HOME_STRETCH_START - 1 + (dice - remaining);
                (to <= GOAL).then_some(to)
            } else {
                Some((p - 1 + dice) % TRACK_LENGTH + 1)
            }
        }
        _ => None,
    }
}

/// Opponent pawns standing on the same physical square as `color`'s
/// relative `position`. Empty off the shared track.
pub fn opponents_at(state: &GameState, color: Color, position: u8) -> Vec<PawnId> {
    let Some(target) = board::absolute(color, position) else {
        return Vec::new();
    };
    state
        .pawns
        .iter()
        .filter(|p| p.color != color && p.absolute() == Some(target))
        .map(|p| p.id)
        .collect()
}

/// Every legal move for the colour on turn with the pending dice value.
///
/// At most one move per pawn, in pawn order. Empty when no dice are
/// pending.
pub fn valid_moves(state: &GameState) -> Vec<Move> {
    let (Some(color), Some(dice)) = (state.current_turn, state.dice_value) else {
        return Vec::new();
    };

    let mut moves = Vec::new();
    for pawn in state.pawns_of(color) {
        let Some(to) = destination(color, pawn.position, dice) else {
            continue;
        };
        let safe = board::is_on_track(to) && board::is_safe(to);

        // Own pawns block everywhere except safe squares and the goal.
        let blocked = to != GOAL
            && !safe
            && state
                .pawns_of(color)
                .any(|other| other.id != pawn.id && other.position == to);
        if blocked {
            continue;
        }

        let captures = !safe && !opponents_at(state, color, to).is_empty();
        moves.push(Move {
            pawn_id: pawn.id,
            from: pawn.position,
            to,
            captures,
            reaches_goal: to == GOAL,
        });
    }
    moves
}

/// The result of an executed move.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// The snapshot after the move.
    pub state: GameState,
    pub color: Color,
    pub mv: Move,
    /// Opponent pawns sent back to base.
    pub captured: Vec<PawnId>,
    /// The mover keeps the turn.
    pub extra_turn: bool,
    /// Players who received a rank as a result of this move.
    pub newly_ranked: Vec<PlayerId>,
}

/// Applies the move for `pawn_id`, which must appear in `valid`.
///
/// `valid` is the move set handed out with the roll; a pawn that is not in
/// it, or whose position changed since, is rejected. Captures, extra turns,
/// ranking and the turn hand-off all happen here.
pub fn execute_move(
    state: &GameState,
    pawn_id: PawnId,
    valid: &[Move],
) -> Result<MoveOutcome, RuleError> {
    if state.phase != Phase::Moving {
        return Err(RuleError::WrongPhase {
            phase: state.phase,
            dice: state.dice_value,
        });
    }
    let dice = state.dice_value.ok_or(RuleError::DiceNotRolled)?;
    let color = state.current_turn.ok_or(RuleError::WrongPhase {
        phase: state.phase,
        dice: state.dice_value,
    })?;
    let pawn = state.pawn(pawn_id).ok_or(RuleError::UnknownPawn(pawn_id))?;
    let mv = *valid
        .iter()
        .find(|m| m.pawn_id == pawn_id)
        .ok_or(RuleError::IllegalMove(pawn_id))?;
    if pawn.color != color || pawn.position != mv.from {
        return Err(RuleError::IllegalMove(pawn_id));
    }

    let mut next = state.clone();

    let captured = if mv.captures {
        opponents_at(&next, color, mv.to)
    } else {
        Vec::new()
    };
    for id in &captured {
        if let Some(victim) = next.pawn_mut(*id) {
            victim.position = BASE;
        }
    }
    if let Some(mover) = next.pawn_mut(pawn_id) {
        mover.position = mv.to;
    }

    let newly_ranked = turn::evaluate_ranks(&mut next);
    let mover_ranked = next
        .player_by_color(color)
        .is_some_and(|p| p.rank.is_some());
    let earned = dice == ENTER_VALUE || !captured.is_empty() || mv.reaches_goal;
    let extra_turn = earned && !mover_ranked && !next.is_finished();

    if !next.is_finished() {
        if extra_turn {
            next.dice_value = None;
            next.phase = Phase::Rolling;
        } else {
            turn::pass_turn(&mut next, color);
        }
    }

    next.last_move = Some(LastMove {
        color,
        pawn_id,
        from: mv.from,
        to: mv.to,
        captured: captured.clone(),
        extra_turn,
    });

    tracing::trace!(
        pawn = %pawn_id,
        from = mv.from,
        to = mv.to,
        captured = captured.len(),
        extra_turn,
        "move executed"
    );

    Ok(MoveOutcome {
        state: next,
        color,
        mv,
        captured,
        extra_turn,
        newly_ranked,
    })
}
