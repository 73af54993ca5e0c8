//! Heuristic move scoring for [`BotStrategy::Scored`](crate::BotStrategy).
//!
//! A move's score is a weighted sum:
//!
//! ```text
//! score = capture      · [captures]
//!       + reach_goal   · [reaches goal]
//!       + leave_base   · [from base]
//!       + safe_square  · [lands on a safe track square]
//!       + enter_home_stretch · [leaves the shared track for the stretch]
//!       + progress     · steps advanced  (× home_stretch_boost off the track)
//!       − risk         · opponents 1..=6 squares behind an unsafe landing
//! ```
//!
//! Profiles only change the coefficients; the formula is shared.

use serde::{Deserialize, Serialize};

use ludo_engine::board::{self, BASE, TRACK_LENGTH};
use ludo_engine::{Color, GameState, Move};

/// How far behind a square an opponent can still hit it in one roll.
pub const THREAT_RANGE: u8 = 6;

/// Coefficients for the scoring formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub capture: f64,
    pub reach_goal: f64,
    pub leave_base: f64,
    pub safe_square: f64,
    pub enter_home_stretch: f64,
    pub progress: f64,
    pub risk: f64,
    /// Multiplier on `progress` for moves that end off the shared track.
    pub home_stretch_boost: f64,
}

impl ScoreWeights {
    pub const BALANCED: Self = Self {
        capture: 50.0,
        reach_goal: 40.0,
        leave_base: 30.0,
        safe_square: 15.0,
        enter_home_stretch: 20.0,
        progress: 1.0,
        risk: 12.0,
        home_stretch_boost: 2.0,
    };

    /// Hunts pawns and shrugs off exposure.
    pub const AGGRESSIVE: Self = Self {
        capture: 90.0,
        reach_goal: 30.0,
        leave_base: 35.0,
        safe_square: 5.0,
        enter_home_stretch: 15.0,
        progress: 1.5,
        risk: 4.0,
        home_stretch_boost: 1.5,
    };

    /// Keeps pawns covered and banks progress.
    pub const CAUTIOUS: Self = Self {
        capture: 30.0,
        reach_goal: 50.0,
        leave_base: 20.0,
        safe_square: 30.0,
        enter_home_stretch: 35.0,
        progress: 1.0,
        risk: 25.0,
        home_stretch_boost: 3.0,
    };

    /// Looks a profile up by name.
    pub fn profile(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::BALANCED),
            "aggressive" => Some(Self::AGGRESSIVE),
            "cautious" => Some(Self::CAUTIOUS),
            _ => None,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::BALANCED
    }
}

/// Scores one legal move for `color`.
pub fn score_move(state: &GameState, color: Color, mv: &Move, weights: &ScoreWeights) -> f64 {
    let mut score = 0.0;

    if mv.captures {
        score += weights.capture;
    }
    if mv.reaches_goal {
        score += weights.reach_goal;
    }
    if mv.from == BASE {
        score += weights.leave_base;
    }

    let lands_on_track = board::is_on_track(mv.to);
    if lands_on_track && board::is_safe(mv.to) {
        score += weights.safe_square;
    }
    let leaves_track = mv.from == BASE || board::is_on_track(mv.from);
    if leaves_track && board::is_in_home_stretch(mv.to) {
        score += weights.enter_home_stretch;
    }

    let advanced = f64::from(board::journey(mv.to).saturating_sub(board::journey(mv.from)));
    if lands_on_track {
        score += weights.progress * advanced;
        if !board::is_safe(mv.to) {
            score -= weights.risk * threats(state, color, mv) as f64;
        }
    } else {
        // Nothing can reach the stretch, so no risk term.
        score += weights.progress * weights.home_stretch_boost * advanced;
    }

    score
}

/// Opponent pawns on the shared track that sit 1..=6 squares behind the
/// move's landing square.
///
/// Pawns on the landing square itself are the ones this move captures, so
/// they are left out.
pub fn threats(state: &GameState, color: Color, mv: &Move) -> usize {
    let Some(target) = board::absolute(color, mv.to) else {
        return 0;
    };
    state
        .pawns
        .iter()
        .filter(|p| p.color != color)
        .filter_map(|p| p.absolute())
        .filter(|abs| *abs != target)
        .filter(|abs| {
            let behind = (target + TRACK_LENGTH - abs) % TRACK_LENGTH;
            (1..=THREAT_RANGE).contains(&behind)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludo_engine::board::GOAL;
    use ludo_engine::turn::{add_player, start_game};
    use ludo_engine::{PawnId, Phase, PlayerId, RoomId};

    fn two_player_state() -> GameState {
        let mut state = GameState::new(RoomId::new("S"), 4);
        state = add_player(&state, PlayerId(1), "a", false).unwrap().0;
        state = add_player(&state, PlayerId(2), "b", false).unwrap().0;
        start_game(&state, 2).unwrap()
    }

    fn mv(color: Color, from: u8, to: u8) -> Move {
        Move {
            pawn_id: PawnId::new(color, 0),
            from,
            to,
            captures: false,
            reaches_goal: to == GOAL,
        }
    }

    #[test]
    fn test_profile_lookup_known_names() {
        assert_eq!(ScoreWeights::profile("cautious"), Some(ScoreWeights::CAUTIOUS));
        assert_eq!(ScoreWeights::profile("nope"), None);
    }

    #[test]
    fn test_threats_counts_opponents_within_six_behind() {
        let mut state = two_player_state();
        // Green relative 1 is absolute 14. Red landing on 18 has it 4 behind.
        state.pawn_mut(PawnId::new(Color::Green, 0)).unwrap().position = 1;
        assert_eq!(threats(&state, Color::Red, &mv(Color::Red, 15, 18)), 1);
        // Landing on 21 puts it 7 behind: out of reach.
        assert_eq!(threats(&state, Color::Red, &mv(Color::Red, 15, 21)), 0);
        // Pawns ahead are no threat.
        assert_eq!(threats(&state, Color::Red, &mv(Color::Red, 8, 12)), 0);
    }

    #[test]
    fn test_threats_skips_pawn_being_captured() {
        let mut state = two_player_state();
        // Green relative 5 is absolute 18, exactly where Red lands.
        state.pawn_mut(PawnId::new(Color::Green, 0)).unwrap().position = 5;
        // Green relative 1 is absolute 14, four behind.
        state.pawn_mut(PawnId::new(Color::Green, 1)).unwrap().position = 1;
        let capture = Move {
            captures: true,
            ..mv(Color::Red, 15, 18)
        };
        assert_eq!(threats(&state, Color::Red, &capture), 1);
    }

    #[test]
    fn test_threats_wraps_around_the_loop() {
        let mut state = two_player_state();
        // Green relative 37 is absolute 50; Red landing on 2 has it 4 behind.
        state.pawn_mut(PawnId::new(Color::Green, 0)).unwrap().position = 37;
        assert_eq!(threats(&state, Color::Red, &mv(Color::Red, 1, 2)), 1);
    }

    #[test]
    fn test_score_move_home_stretch_ignores_risk() {
        let mut state = two_player_state();
        state.phase = Phase::Moving;
        let weights = ScoreWeights::BALANCED;
        let stretch = score_move(&state, Color::Red, &mv(Color::Red, 54, 56), &weights);
        assert_eq!(stretch, weights.progress * weights.home_stretch_boost * 2.0);
    }

    #[test]
    fn test_score_move_penalises_exposed_landing() {
        let mut state = two_player_state();
        state.pawn_mut(PawnId::new(Color::Green, 0)).unwrap().position = 1;
        let weights = ScoreWeights::BALANCED;
        let exposed = score_move(&state, Color::Red, &mv(Color::Red, 15, 18), &weights);
        let clear = score_move(&state, Color::Red, &mv(Color::Red, 18, 21), &weights);
        assert!(exposed < clear);
    }

    #[test]
    fn test_score_move_rewards_entering_stretch() {
        let state = two_player_state();
        let weights = ScoreWeights::BALANCED;
        let score = score_move(&state, Color::Red, &mv(Color::Red, 50, 54), &weights);
        // 50 → 54 is three steps along the journey.
        let expected = weights.enter_home_stretch + weights.progress * weights.home_stretch_boost * 3.0;
        assert_eq!(score, expected);
    }

    #[test]
    fn test_score_move_track_to_goal_has_no_stretch_bonus() {
        let state = two_player_state();
        let weights = ScoreWeights::BALANCED;
        let score = score_move(&state, Color::Red, &mv(Color::Red, 50, GOAL), &weights);
        // 50 → goal is eight steps along the journey.
        let expected = weights.reach_goal + weights.progress * weights.home_stretch_boost * 8.0;
        assert_eq!(score, expected);
    }
}
