//! Scenario tests for the rules engine: legal moves, captures, extra turns,
//! the six-streak forfeit and ranking, driven through the public API.

use ludo_engine::board::{self, BASE, GOAL, SAFE_SQUARES, TRACK_LENGTH};
use ludo_engine::turn::{self, add_player, start_game};
use ludo_engine::{
    Color, Dice, GameState, PawnId, Phase, PlayerId, RoomId, RuleError, SequenceSource,
    execute_move, valid_moves,
};

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

/// Red (P-1) and Blue (P-2), with Green and Yellow seats skipped.
fn red_vs_blue() -> GameState {
    let mut state = GameState::new(RoomId::new("SCEN"), 4);
    state = add_player(&state, pid(1), "red", false).unwrap().0;
    state = add_player(&state, pid(2), "green", false).unwrap().0;
    state = add_player(&state, pid(3), "yellow", false).unwrap().0;
    state = add_player(&state, pid(4), "blue", false).unwrap().0;
    state = turn::remove_player(&state, pid(2)).unwrap();
    state = turn::remove_player(&state, pid(3)).unwrap();
    start_game(&state, 2).unwrap()
}

fn four_players() -> GameState {
    let mut state = GameState::new(RoomId::new("FOUR"), 4);
    for i in 1..=4 {
        state = add_player(&state, pid(i), &format!("p{i}"), false).unwrap().0;
    }
    start_game(&state, 2).unwrap()
}

fn place(state: &mut GameState, color: Color, index: u8, position: u8) {
    state.pawn_mut(PawnId::new(color, index)).unwrap().position = position;
}

fn with_roll(mut state: GameState, value: u8) -> GameState {
    state.phase = Phase::Moving;
    state.dice_value = Some(value);
    state
}

fn pawn(color: Color, index: u8) -> PawnId {
    PawnId::new(color, index)
}

// =========================================================================
// Legal moves
// =========================================================================

#[test]
fn test_valid_moves_from_base_only_on_six() {
    for dice in 1..=6 {
        let state = with_roll(red_vs_blue(), dice);
        let moves = valid_moves(&state);
        if dice == 6 {
            assert_eq!(moves.len(), 4);
            assert!(moves.iter().all(|m| m.from == BASE && m.to == 1));
        } else {
            assert!(moves.is_empty(), "dice {dice}");
        }
    }
}

#[test]
fn test_valid_moves_never_overshoot_goal() {
    for from in 53..=58 {
        for dice in 1..=6 {
            let mut state = red_vs_blue();
            place(&mut state, Color::Red, 0, from);
            let state = with_roll(state, dice);
            let moves = valid_moves(&state);
            let mv = moves.iter().find(|m| m.pawn_id == pawn(Color::Red, 0));
            if from + dice > GOAL {
                assert!(mv.is_none(), "{from}+{dice}");
            } else {
                assert_eq!(mv.unwrap().to, from + dice);
            }
        }
    }
}

#[test]
fn test_home_stretch_58_roll_one_reaches_goal() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 58);
    let moves = valid_moves(&with_roll(state.clone(), 1));
    let mv = moves.iter().find(|m| m.pawn_id == pawn(Color::Red, 0)).unwrap();
    assert_eq!(mv.to, GOAL);
    assert!(mv.reaches_goal);

    let moves = valid_moves(&with_roll(state, 3));
    assert!(moves.iter().all(|m| m.pawn_id != pawn(Color::Red, 0)));
}

#[test]
fn test_own_pawn_blocks_unsafe_square() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 10);
    place(&mut state, Color::Red, 1, 12);
    let moves = valid_moves(&with_roll(state, 2));
    assert!(moves.iter().all(|m| m.pawn_id != pawn(Color::Red, 0)));
    assert!(moves.iter().any(|m| m.pawn_id == pawn(Color::Red, 1)));
}

#[test]
fn test_own_pawns_stack_on_safe_square() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 7);
    place(&mut state, Color::Red, 1, 9);
    let moves = valid_moves(&with_roll(state, 2));
    let mv = moves.iter().find(|m| m.pawn_id == pawn(Color::Red, 0)).unwrap();
    assert_eq!(mv.to, 9);
}

#[test]
fn test_goal_accepts_several_pawns() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, GOAL);
    place(&mut state, Color::Red, 1, 57);
    let moves = valid_moves(&with_roll(state, 2));
    assert!(moves.iter().any(|m| m.pawn_id == pawn(Color::Red, 1) && m.reaches_goal));
}

#[test]
fn test_own_pawn_blocks_in_home_stretch() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 54);
    place(&mut state, Color::Red, 1, 56);
    let moves = valid_moves(&with_roll(state, 2));
    assert!(moves.iter().all(|m| m.pawn_id != pawn(Color::Red, 0)));
}

// =========================================================================
// Captures
// =========================================================================

#[test]
fn test_capture_scenario_red_44_takes_blue_on_45() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 44);
    // Blue's relative 6 is absolute 45, same as Red's 45.
    place(&mut state, Color::Blue, 0, 6);
    assert_eq!(board::absolute(Color::Blue, 6), board::absolute(Color::Red, 45));

    let state = with_roll(state, 1);
    let moves = valid_moves(&state);
    let mv = moves.iter().find(|m| m.pawn_id == pawn(Color::Red, 0)).unwrap();
    assert_eq!(mv.to, 45);
    assert!(mv.captures);

    let outcome = execute_move(&state, pawn(Color::Red, 0), &moves).unwrap();
    assert_eq!(outcome.state.pawn(pawn(Color::Blue, 0)).unwrap().position, BASE);
    assert_eq!(outcome.state.pawn(pawn(Color::Red, 0)).unwrap().position, 45);
    assert_eq!(outcome.captured, vec![pawn(Color::Blue, 0)]);
    assert!(outcome.extra_turn);
    assert_eq!(outcome.state.current_turn, Some(Color::Red));
    assert_eq!(outcome.state.phase, Phase::Rolling);
    assert_eq!(outcome.state.dice_value, None);
}

#[test]
fn test_no_capture_on_any_safe_square() {
    for safe in SAFE_SQUARES {
        for color in [Color::Green, Color::Yellow, Color::Blue] {
            let mut state = four_players();
            // The start square is only reached from base.
            let (from, dice) = if safe == 1 { (BASE, 6) } else { (safe - 1, 1) };
            place(&mut state, Color::Red, 0, from);
            // Put an opponent on the same physical square.
            let abs = board::absolute(Color::Red, safe).unwrap();
            let rel = (1..=TRACK_LENGTH)
                .find(|p| board::absolute(color, *p) == Some(abs))
                .unwrap();
            place(&mut state, color, 0, rel);

            let moves = valid_moves(&with_roll(state, dice));
            let mv = moves.iter().find(|m| m.pawn_id == pawn(Color::Red, 0)).unwrap();
            assert_eq!(mv.to, safe);
            assert!(!mv.captures, "safe {safe} vs {color}");
        }
    }
}

#[test]
fn test_capture_resolution_sends_back_every_match() {
    // Not reachable by legal play, but resolution handles it.
    let mut state = four_players();
    place(&mut state, Color::Red, 0, 20);
    place(&mut state, Color::Green, 0, 10); // abs 23
    place(&mut state, Color::Yellow, 0, 49); // abs 23
    let state = with_roll(state, 3);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 0), &moves).unwrap();
    assert_eq!(outcome.captured.len(), 2);
    for id in outcome.captured {
        assert_eq!(outcome.state.pawn(id).unwrap().position, BASE);
    }
}

#[test]
fn test_home_stretch_pawns_are_never_captured() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 20);
    place(&mut state, Color::Blue, 0, 55);
    let state = with_roll(state, 3);
    let moves = valid_moves(&state);
    assert!(moves.iter().all(|m| !m.captures));
}

// =========================================================================
// Execution, extra turns, rotation
// =========================================================================

#[test]
fn test_execute_rejects_pawn_outside_valid_set() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 10);
    let state = with_roll(state, 3);
    let moves = valid_moves(&state);
    let err = execute_move(&state, pawn(Color::Red, 1), &moves).unwrap_err();
    assert_eq!(err, RuleError::IllegalMove(pawn(Color::Red, 1)));
    let err = execute_move(&state, pawn(Color::Blue, 0), &moves).unwrap_err();
    assert_eq!(err, RuleError::IllegalMove(pawn(Color::Blue, 0)));
}

#[test]
fn test_execute_rejects_stale_move_set() {
    let mut state = red_vs_blue();
    place(&mut state, Color::Red, 0, 10);
    let stale = valid_moves(&with_roll(state.clone(), 3));
    place(&mut state, Color::Red, 0, 11);
    let err = execute_move(&with_roll(state, 3), pawn(Color::Red, 0), &stale).unwrap_err();
    assert_eq!(err, RuleError::IllegalMove(pawn(Color::Red, 0)));
}

#[test]
fn test_execute_requires_moving_phase() {
    let state = red_vs_blue();
    let err = execute_move(&state, pawn(Color::Red, 0), &[]).unwrap_err();
    assert!(matches!(err, RuleError::WrongPhase { phase: Phase::Rolling, .. }));
}

#[test]
fn test_plain_move_rotates_turn() {
    let mut state = four_players();
    place(&mut state, Color::Red, 0, 10);
    let state = with_roll(state, 3);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 0), &moves).unwrap();
    assert!(!outcome.extra_turn);
    assert_eq!(outcome.state.current_turn, Some(Color::Green));
    assert_eq!(outcome.state.phase, Phase::Rolling);
    let last = outcome.state.last_move.unwrap();
    assert_eq!((last.from, last.to, last.extra_turn), (10, 13, false));
}

#[test]
fn test_six_grants_extra_turn() {
    let state = with_roll(four_players(), 6);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 2), &moves).unwrap();
    assert!(outcome.extra_turn);
    assert_eq!(outcome.state.current_turn, Some(Color::Red));
    assert_eq!(outcome.state.pawn(pawn(Color::Red, 2)).unwrap().position, 1);
}

#[test]
fn test_reaching_goal_grants_extra_turn() {
    let mut state = four_players();
    place(&mut state, Color::Red, 0, 56);
    let state = with_roll(state, 3);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 0), &moves).unwrap();
    assert!(outcome.extra_turn);
    assert_eq!(outcome.state.current_turn, Some(Color::Red));
}

#[test]
fn test_rotation_skips_inactive_and_ranked() {
    let mut state = four_players();
    state.player_mut(pid(2)).unwrap().active = false;
    state.player_mut(pid(3)).unwrap().rank = Some(1);
    place(&mut state, Color::Red, 0, 10);
    let state = with_roll(state, 2);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 0), &moves).unwrap();
    assert_eq!(outcome.state.current_turn, Some(Color::Blue));
}

#[test]
fn test_finishing_last_pawn_ranks_and_passes_turn() {
    let mut state = four_players();
    for i in 0..3 {
        place(&mut state, Color::Red, i, GOAL);
    }
    place(&mut state, Color::Red, 3, 57);
    let state = with_roll(state, 2);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 3), &moves).unwrap();

    assert_eq!(outcome.newly_ranked, vec![pid(1)]);
    assert_eq!(outcome.state.winner, Some(pid(1)));
    assert!(!outcome.extra_turn, "ranked players never keep the turn");
    assert_eq!(outcome.state.current_turn, Some(Color::Green));
}

#[test]
fn test_two_player_game_finishes_when_first_player_done() {
    let mut state = red_vs_blue();
    for i in 0..3 {
        place(&mut state, Color::Red, i, GOAL);
    }
    place(&mut state, Color::Red, 3, 58);
    let state = with_roll(state, 1);
    let moves = valid_moves(&state);
    let outcome = execute_move(&state, pawn(Color::Red, 3), &moves).unwrap();

    assert_eq!(outcome.state.phase, Phase::Finished);
    assert_eq!(outcome.state.player(pid(1)).unwrap().rank, Some(1));
    assert_eq!(outcome.state.player(pid(4)).unwrap().rank, Some(2));
    assert_eq!(outcome.newly_ranked, vec![pid(1), pid(4)]);
    assert_eq!(outcome.state.current_turn, None);
}

// =========================================================================
// Roll gate
// =========================================================================

#[test]
fn test_roll_gate_rejects_wrong_player() {
    let state = four_players();
    let mut dice = Dice::new(SequenceSource::faces(&[3], true), 0);
    let err = dice.handle_roll_request(&state, pid(2), 0).unwrap_err();
    assert_eq!(err, RuleError::NotYourTurn(pid(2)));
}

#[test]
fn test_roll_gate_rejects_second_roll_and_reports_dice() {
    let state = four_players();
    let mut dice = Dice::new(SequenceSource::faces(&[3], true), 0);
    let rolled = dice.handle_roll_request(&state, pid(1), 0).unwrap();
    assert_eq!(rolled.state.phase, Phase::Moving);
    assert_eq!(rolled.state.dice_value, Some(3));

    let err = dice.handle_roll_request(&rolled.state, pid(1), 10_000).unwrap_err();
    assert_eq!(
        err,
        RuleError::WrongPhase {
            phase: Phase::Moving,
            dice: Some(3)
        }
    );
}

#[test]
fn test_roll_gate_debounces() {
    let mut state = four_players();
    state.last_roll_at = Some(1_000);
    let mut dice = Dice::new(SequenceSource::faces(&[2], true), 500);
    let err = dice.handle_roll_request(&state, pid(1), 1_200).unwrap_err();
    assert_eq!(err, RuleError::RollTooSoon { wait_ms: 300 });
    assert!(dice.handle_roll_request(&state, pid(1), 1_500).is_ok());
}

#[test]
fn test_roll_gate_rejects_before_start() {
    let mut state = GameState::new(RoomId::new("W"), 4);
    state = add_player(&state, pid(1), "a", false).unwrap().0;
    let mut dice = Dice::new(SequenceSource::faces(&[2], true), 0);
    let err = dice.handle_roll_request(&state, pid(1), 0).unwrap_err();
    assert!(matches!(err, RuleError::WrongPhase { phase: Phase::Waiting, .. }));
}

#[test]
fn test_three_sixes_forfeit_turn() {
    let mut state = four_players();
    place(&mut state, Color::Red, 0, 10);
    place(&mut state, Color::Red, 1, 20);
    // Two pawns out: unweighted dice.
    let mut dice = Dice::new(SequenceSource::faces(&[6], false), 0);

    for expected in 1..=2u8 {
        let rolled = dice.handle_roll_request(&state, pid(1), 0).unwrap();
        assert!(!rolled.forfeited);
        assert_eq!(rolled.state.consecutive_sixes, expected);
        let moves = valid_moves(&rolled.state);
        let outcome = execute_move(&rolled.state, pawn(Color::Red, 0), &moves).unwrap();
        assert_eq!(outcome.state.current_turn, Some(Color::Red));
        state = outcome.state;
    }

    let rolled = dice.handle_roll_request(&state, pid(1), 0).unwrap();
    assert!(rolled.forfeited);
    assert_eq!(rolled.value, 6);
    assert_eq!(rolled.state.dice_value, None);
    assert_eq!(rolled.state.consecutive_sixes, 0);
    assert_eq!(rolled.state.phase, Phase::Rolling);
    assert_eq!(rolled.state.current_turn, Some(Color::Green));
}

#[test]
fn test_non_six_resets_streak() {
    let mut state = four_players();
    state.consecutive_sixes = 2;
    place(&mut state, Color::Red, 0, 10);
    place(&mut state, Color::Red, 1, 20);
    let mut dice = Dice::new(SequenceSource::faces(&[4], false), 0);
    let rolled = dice.handle_roll_request(&state, pid(1), 0).unwrap();
    assert_eq!(rolled.state.consecutive_sixes, 0);
    assert!(!rolled.forfeited);
}

#[test]
fn test_weighting_follows_pawns_in_base() {
    let mut state = four_players();
    // Four in base, then three: weighted.
    assert!(ludo_engine::dice::should_weight(&state, Color::Red));
    place(&mut state, Color::Red, 0, 10);
    assert!(ludo_engine::dice::should_weight(&state, Color::Red));
    // Two in base: uniform.
    place(&mut state, Color::Red, 1, 12);
    assert!(!ludo_engine::dice::should_weight(&state, Color::Red));

    // The gate uses the same rule: a draw of 0.2 is a six only when weighted.
    let mut dice = Dice::new(SequenceSource::new(vec![0.2]), 0);
    let rolled = dice.handle_roll_request(&state, pid(1), 0).unwrap();
    assert!(!rolled.weighted);
    assert_eq!(rolled.value, 2);

    place(&mut state, Color::Red, 1, BASE);
    let rolled = dice.handle_roll_request(&state, pid(1), 0).unwrap();
    assert!(rolled.weighted);
    assert_eq!(rolled.value, 6);
}
