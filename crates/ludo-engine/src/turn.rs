//! Turn state machine: roster changes, starting, rotation, skipping, and
//! ranking.
//!
//! Public functions take a snapshot and return a new one; the `&mut`
//! helpers are shared with the dice and move modules so a single step can
//! be composed without cloning more than once.

use crate::board::PAWNS_PER_COLOR;
use crate::{Color, GameState, Pawn, Phase, Player, PlayerId, RuleError};

/// Minimum roster size for `start_game`.
pub const MIN_PLAYERS: usize = 2;
/// Hard roster ceiling: one player per colour.
pub const MAX_PLAYERS: u8 = 4;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Seats a new player on the first free colour and gives them four pawns
/// in base. Only allowed before the game starts.
pub fn add_player(
    state: &GameState,
    id: PlayerId,
    name: &str,
    is_bot: bool,
) -> Result<(GameState, Color), RuleError> {
    if state.phase != Phase::Waiting {
        return Err(RuleError::GameInProgress);
    }
    if state.player(id).is_some() {
        return Err(RuleError::AlreadyJoined(id));
    }
    let capacity = state.max_players.min(MAX_PLAYERS);
    if state.players.len() >= capacity as usize {
        return Err(RuleError::RoomFull(capacity));
    }
    let color = *state
        .free_colors()
        .first()
        .ok_or(RuleError::NoColorAvailable)?;

    let mut next = state.clone();
    next.players.push(Player::new(id, name, color, is_bot));
    next.players.sort_by_key(|p| p.color);
    next.pawns
        .extend((0..PAWNS_PER_COLOR).map(|i| Pawn::new(color, i)));
    Ok((next, color))
}

/// Marks a known player as connected again. Works in any phase.
///
/// If play stalled because nobody was left to take the turn, the returning
/// player picks it up with a fresh roll.
pub fn rejoin(state: &GameState, id: PlayerId) -> Result<GameState, RuleError> {
    let mut next = set_active(state, id, true)?;
    if next.phase.is_playing() && next.current_turn.is_none() {
        if let Some(color) = next.player(id).filter(|p| p.rank.is_none()).map(|p| p.color) {
            next.current_turn = Some(color);
            next.phase = Phase::Rolling;
            next.dice_value = None;
            next.consecutive_sixes = 0;
        }
    }
    Ok(next)
}

/// Flips a player's connection flag.
///
/// Turn skipping for a player who drops mid-turn is the orchestrator's
/// call; this only records the flag.
pub fn set_active(state: &GameState, id: PlayerId, active: bool) -> Result<GameState, RuleError> {
    let mut next = state.clone();
    next.player_mut(id)
        .ok_or(RuleError::UnknownPlayer(id))?
        .active = active;
    Ok(next)
}

/// Hands a seat to the bot strategy, keeping its pawns on the board.
pub fn convert_to_bot(state: &GameState, id: PlayerId) -> Result<GameState, RuleError> {
    let mut next = state.clone();
    let player = next.player_mut(id).ok_or(RuleError::UnknownPlayer(id))?;
    player.is_bot = true;
    player.active = true;
    Ok(next)
}

/// Gives a bot-controlled seat back to its human owner.
pub fn reclaim_seat(state: &GameState, id: PlayerId) -> Result<GameState, RuleError> {
    let mut next = state.clone();
    let player = next.player_mut(id).ok_or(RuleError::UnknownPlayer(id))?;
    player.is_bot = false;
    player.active = true;
    Ok(next)
}

/// Takes a player and their pawns off the roster.
///
/// If they held the turn, it passes. If play is under way and at most one
/// unranked player is left, that player takes the last rank and the game
/// ends.
pub fn remove_player(state: &GameState, id: PlayerId) -> Result<GameState, RuleError> {
    let color = state.player(id).ok_or(RuleError::UnknownPlayer(id))?.color;

    let mut next = state.clone();
    next.players.retain(|p| p.id != id);
    next.pawns.retain(|p| p.color != color);
    if next.winner == Some(id) {
        next.winner = None;
    }

    if !next.phase.is_playing() {
        return Ok(next);
    }
    if next.unranked_count() <= 1 {
        let rank = next.next_rank();
        if let Some(last) = next.players.iter_mut().find(|p| p.rank.is_none()) {
            last.rank = Some(rank);
            if rank == 1 {
                next.winner = Some(last.id);
            }
        }
        finish(&mut next);
    } else if next.current_turn == Some(color) {
        pass_turn(&mut next, color);
    }
    Ok(next)
}

// ---------------------------------------------------------------------------
// Phase transitions
// ---------------------------------------------------------------------------

/// `Waiting → Rolling`. The first active player in rotation order opens.
pub fn start_game(state: &GameState, min_players: usize) -> Result<GameState, RuleError> {
    if state.phase != Phase::Waiting {
        return Err(RuleError::WrongPhase {
            phase: state.phase,
            dice: state.dice_value,
        });
    }
    let min_players = min_players.max(MIN_PLAYERS);
    if state.players.len() < min_players {
        return Err(RuleError::NotEnoughPlayers(min_players));
    }
    let opener = state
        .players
        .iter()
        .filter(|p| p.active)
        .map(|p| p.color)
        .min()
        .ok_or(RuleError::NotEnoughPlayers(min_players))?;

    let mut next = state.clone();
    next.phase = Phase::Rolling;
    next.current_turn = Some(opener);
    next.dice_value = None;
    next.consecutive_sixes = 0;
    Ok(next)
}

/// Drops the rest of the current turn (no legal move, timeout, recovery).
pub fn skip_turn(state: &GameState) -> GameState {
    let mut next = state.clone();
    if let Some(color) = next.current_turn {
        if next.phase.is_playing() {
            pass_turn(&mut next, color);
        }
    }
    next
}

/// The colour that plays after `from`.
///
/// Candidates are active, unranked players other than `from`, walked in
/// rotation order. When none are left the pool widens: first to `from`
/// itself if it still contends, then to every active player.
pub fn next_turn(state: &GameState, from: Color) -> Option<Color> {
    let others: Vec<Color> = state
        .players
        .iter()
        .filter(|p| p.is_contending() && p.color != from)
        .map(|p| p.color)
        .collect();
    let pool = if !others.is_empty() {
        others
    } else if state.player_by_color(from).is_some_and(Player::is_contending) {
        vec![from]
    } else {
        state.players.iter().filter(|p| p.active).map(|p| p.color).collect()
    };

    let mut color = from;
    for _ in 0..Color::ALL.len() {
        color = color.next();
        if pool.contains(&color) {
            return Some(color);
        }
    }
    None
}

/// Clears the dice, resets the streak and moves the turn on from `from`.
pub(crate) fn pass_turn(state: &mut GameState, from: Color) {
    state.dice_value = None;
    state.consecutive_sixes = 0;
    state.phase = Phase::Rolling;
    state.current_turn = next_turn(state, from);
}

/// Hands out ranks to every player whose pawns are all home.
///
/// Returns the ids ranked by this call, in rank order. If only one unranked
/// player remains among two or more, they get the final rank and the
/// session finishes; a lone player who has finished also ends the session.
pub fn evaluate_ranks(state: &mut GameState) -> Vec<PlayerId> {
    let mut ranked = Vec::new();

    let finishers: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| p.rank.is_none() && state.all_home(p.color))
        .map(|p| p.id)
        .collect();
    for id in finishers {
        assign_rank(state, id);
        ranked.push(id);
    }

    let total = state.players.len();
    let unranked = state.unranked_count();
    if total >= 2 && unranked == 1 {
        if let Some(id) = state.players.iter().find(|p| p.rank.is_none()).map(|p| p.id) {
            assign_rank(state, id);
            ranked.push(id);
        }
        finish(state);
    } else if total >= 1 && unranked == 0 {
        finish(state);
    }

    ranked
}

fn assign_rank(state: &mut GameState, id: PlayerId) {
    let rank = state.next_rank();
    if let Some(player) = state.player_mut(id) {
        player.rank = Some(rank);
        tracing::debug!(player_id = %id, rank, "player ranked");
    }
    if rank == 1 {
        state.winner = Some(id);
    }
}

fn finish(state: &mut GameState) {
    state.phase = Phase::Finished;
    state.dice_value = None;
    state.consecutive_sixes = 0;
    state.current_turn = None;
}
