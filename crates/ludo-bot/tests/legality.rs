//! Bots only ever pick from the engine's legal-move set, across whole
//! seeded games.

use ludo_bot::{BotAction, BotStrategy, ScoreWeights};
use ludo_engine::turn::{self, add_player, start_game};
use ludo_engine::{
    Dice, GameState, Phase, PlayerId, RandomSource, RoomId, SeededSource, execute_move,
    valid_moves,
};

fn bots_only(count: u64) -> GameState {
    let mut state = GameState::new(RoomId::new("SIM"), 4);
    for i in 1..=count {
        state = add_player(&state, PlayerId(i), &format!("bot{i}"), true).unwrap().0;
    }
    start_game(&state, 2).unwrap()
}

/// Plays a full game with every seat on `strategy`. Returns the final state
/// and the number of decisions taken.
fn play_out(strategy: BotStrategy, players: u64, seed: u64) -> (GameState, usize) {
    let mut state = bots_only(players);
    let mut dice = Dice::new(SeededSource::new(seed), 0);
    let mut rng = SeededSource::new(seed.wrapping_add(1));
    let mut steps = 0;

    while state.phase != Phase::Finished {
        steps += 1;
        assert!(steps < 20_000, "game did not finish");

        let color = state.current_turn.unwrap();
        let player = state.player_by_color(color).unwrap().id;
        match strategy.decide(&state, color, &mut rng as &mut dyn RandomSource).unwrap() {
            BotAction::Roll => {
                assert_eq!(state.phase, Phase::Rolling);
                state = dice.handle_roll_request(&state, player, 0).unwrap().state;
            }
            BotAction::Move(pawn_id) => {
                let moves = valid_moves(&state);
                assert!(moves.iter().any(|m| m.pawn_id == pawn_id), "bot invented {pawn_id}");
                state = execute_move(&state, pawn_id, &moves).unwrap().state;
            }
            BotAction::Skip => {
                assert!(valid_moves(&state).is_empty());
                state = turn::skip_turn(&state);
            }
        }
    }
    (state, steps)
}

fn assert_ranks_contiguous(state: &GameState) {
    let mut ranks: Vec<u8> = state.players.iter().filter_map(|p| p.rank).collect();
    ranks.sort_unstable();
    let expected: Vec<u8> = (1..=state.players.len() as u8).collect();
    assert_eq!(ranks, expected);
    let winner = state.players.iter().find(|p| p.rank == Some(1)).unwrap();
    assert_eq!(state.winner, Some(winner.id));
}

#[test]
fn test_random_bots_finish_with_contiguous_ranks() {
    for seed in 0..3 {
        let (state, _) = play_out(BotStrategy::Random, 4, seed);
        assert_ranks_contiguous(&state);
    }
}

#[test]
fn test_weighted_bots_finish_with_contiguous_ranks() {
    let (state, _) = play_out(BotStrategy::WeightedRandom, 3, 42);
    assert_ranks_contiguous(&state);
}

#[test]
fn test_scored_profiles_finish_with_contiguous_ranks() {
    for weights in [ScoreWeights::BALANCED, ScoreWeights::AGGRESSIVE, ScoreWeights::CAUTIOUS] {
        let (state, _) = play_out(BotStrategy::Scored(weights), 2, 7);
        assert_ranks_contiguous(&state);
    }
}

#[test]
fn test_seeded_games_replay_identically() {
    let a = play_out(BotStrategy::default(), 4, 1234);
    let b = play_out(BotStrategy::default(), 4, 1234);
    assert_eq!(a.0, b.0);
    assert_eq!(a.1, b.1);
}
