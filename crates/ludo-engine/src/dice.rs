//! Dice: value generation, the six-bias for stuck colours, and the roll gate.
//!
//! Randomness comes in through the [`RandomSource`] trait so the whole
//! engine is reproducible: production rooms use [`ThreadSource`] or a
//! [`SeededSource`], tests feed a [`SequenceSource`] of fixed draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Color, GameState, Phase, PlayerId, RuleError, turn};

/// Probability of a six in weighted mode.
pub const WEIGHTED_SIX_PROBABILITY: f64 = 0.4;
/// A colour with at least this many pawns in base rolls weighted dice.
pub const WEIGHT_THRESHOLD: usize = 3;
/// Sixes in a row that forfeit the rest of the turn.
pub const SIX_STREAK_LIMIT: u8 = 3;

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// The thread-local generator from `rand`. Default for live rooms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSource;

impl RandomSource for ThreadSource {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// A seeded generator, for rooms that must replay identically.
#[derive(Debug, Clone)]
pub struct SeededSource(StdRng);

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Draws that make [`roll`] produce exactly these faces in the given
    /// mode. Handy for scripting a game.
    pub fn faces(faces: &[u8], weighted: bool) -> Self {
        Self::new(faces.iter().map(|f| unit_for(*f, weighted)).collect())
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

// ---------------------------------------------------------------------------
// Rolling
// ---------------------------------------------------------------------------

/// Rolls one die from a single uniform draw.
///
/// Weighted mode gives six a fixed [`WEIGHTED_SIX_PROBABILITY`] and spreads
/// the rest evenly over one to five.
pub fn roll(weighted: bool, source: &mut impl RandomSource) -> u8 {
    let u = source.next_unit();
    if !weighted {
        return ((u * 6.0).floor() as u8 + 1).min(6);
    }
    if u < WEIGHTED_SIX_PROBABILITY {
        return 6;
    }
    let rest = (u - WEIGHTED_SIX_PROBABILITY) / (1.0 - WEIGHTED_SIX_PROBABILITY);
    ((rest * 5.0).floor() as u8 + 1).min(5)
}

/// The draw in the middle of a face's bucket. Inverse of [`roll`].
pub fn unit_for(face: u8, weighted: bool) -> f64 {
    let face = face.clamp(1, 6) as f64;
    if !weighted {
        return (face - 0.5) / 6.0;
    }
    if face == 6.0 {
        return WEIGHTED_SIX_PROBABILITY / 2.0;
    }
    WEIGHTED_SIX_PROBABILITY + (face - 0.5) / 5.0 * (1.0 - WEIGHTED_SIX_PROBABILITY)
}

/// Does this colour roll weighted dice right now?
pub fn should_weight(state: &GameState, color: Color) -> bool {
    state.pawns_at_base(color) >= WEIGHT_THRESHOLD
}

/// Result of an accepted roll request.
#[derive(Debug, Clone)]
pub struct RollOutcome {
    /// The snapshot after the roll.
    pub state: GameState,
    pub color: Color,
    pub value: u8,
    pub weighted: bool,
    /// `true` when this was the third six in a row and the turn passed.
    pub forfeited: bool,
}

/// The roll gate: a random source plus the anti-spam window.
pub struct Dice<R> {
    source: R,
    debounce_ms: u64,
}

impl<R: RandomSource> Dice<R> {
    pub fn new(source: R, debounce_ms: u64) -> Self {
        Self { source, debounce_ms }
    }

    pub fn roll(&mut self, weighted: bool) -> u8 {
        roll(weighted, &mut self.source)
    }

    /// Validates and performs a roll for `requester` at clock reading
    /// `now_ms`.
    ///
    /// On success the phase becomes `Moving` with the value recorded, unless
    /// the roll completes a streak of [`SIX_STREAK_LIMIT`] sixes: then the
    /// dice are cleared, the streak resets and the turn passes on.
    pub fn handle_roll_request(
        &mut self,
        state: &GameState,
        requester: PlayerId,
        now_ms: u64,
    ) -> Result<RollOutcome, RuleError> {
        if !state.phase.is_playing() {
            return Err(RuleError::WrongPhase {
                phase: state.phase,
                dice: state.dice_value,
            });
        }
        let player = state
            .player(requester)
            .ok_or(RuleError::UnknownPlayer(requester))?;
        let color = player.color;
        if state.current_turn != Some(color) {
            return Err(RuleError::NotYourTurn(requester));
        }
        if state.phase != Phase::Rolling {
            return Err(RuleError::WrongPhase {
                phase: state.phase,
                dice: state.dice_value,
            });
        }
        if let Some(last) = state.last_roll_at {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.debounce_ms {
                return Err(RuleError::RollTooSoon {
                    wait_ms: self.debounce_ms - elapsed,
                });
            }
        }

        let weighted = should_weight(state, color);
        let value = self.roll(weighted);

        let mut next = state.clone();
        next.last_roll_at = Some(now_ms);
        if value == 6 {
            next.consecutive_sixes += 1;
        } else {
            next.consecutive_sixes = 0;
        }

        let forfeited = next.consecutive_sixes >= SIX_STREAK_LIMIT;
        if forfeited {
            tracing::debug!(%color, "third six in a row, turn forfeited");
            turn::pass_turn(&mut next, color);
        } else {
            next.dice_value = Some(value);
            next.phase = Phase::Moving;
        }

        Ok(RollOutcome {
            state: next,
            color,
            value,
            weighted,
            forfeited,
        })
    }
}
