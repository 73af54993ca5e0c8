//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use ludo_bot::BotStrategy;
use ludo_engine::turn::{MAX_PLAYERS, MIN_PLAYERS};

// ---------------------------------------------------------------------------
// AfkPolicy
// ---------------------------------------------------------------------------

/// What happens to a human who times out `afk_threshold` turns in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfkPolicy {
    /// The player and their pawns leave the roster.
    #[default]
    Remove,
    /// The seat keeps playing under the room's bot strategy. The player can
    /// reclaim it by rejoining with their id.
    BotTakeover,
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings for one room. Missing fields in a config file take their
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Players needed before the host can start.
    pub min_players: usize,

    /// Seat limit when the creator doesn't pick one.
    pub max_players: u8,

    /// How long a human has to act on their turn.
    pub turn_timeout: Duration,

    /// Pause before a bot rolls.
    pub bot_think_delay: Duration,

    /// Pause between a bot's roll and its move, so observers see the dice.
    pub bot_move_delay: Duration,

    /// Minimum gap between two accepted rolls in the room. Zero disables it.
    pub roll_debounce: Duration,

    /// Consecutive turn timeouts before `afk_policy` applies.
    pub afk_threshold: u32,

    pub afk_policy: AfkPolicy,

    /// Strategy used by every bot seat in the room.
    pub bot_strategy: BotStrategy,

    /// Seed for the dice. `None` draws from the thread generator.
    pub dice_seed: Option<u64>,

    /// Capacity of the actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            turn_timeout: Duration::from_secs(30),
            bot_think_delay: Duration::from_millis(600),
            bot_move_delay: Duration::from_millis(900),
            roll_debounce: Duration::from_millis(500),
            afk_threshold: 3,
            afk_policy: AfkPolicy::default(),
            bot_strategy: BotStrategy::default(),
            dice_seed: None,
            channel_size: 64,
        }
    }
}

impl RoomConfig {
    /// Shortest accepted turn timeout.
    pub const MIN_TURN_TIMEOUT: Duration = Duration::from_secs(1);

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// - `max_players` into `2..=4`, `min_players` into `2..=max_players`
    /// - `turn_timeout` at least [`Self::MIN_TURN_TIMEOUT`]
    /// - `afk_threshold` and `channel_size` at least 1
    pub fn validated(mut self) -> Self {
        let max = self.max_players.clamp(MIN_PLAYERS as u8, MAX_PLAYERS);
        if max != self.max_players {
            warn!(requested = self.max_players, clamped = max, "max_players out of range, clamping");
            self.max_players = max;
        }
        self.min_players = self.min_players.clamp(MIN_PLAYERS, self.max_players as usize);
        if self.turn_timeout < Self::MIN_TURN_TIMEOUT {
            warn!(
                requested_ms = self.turn_timeout.as_millis() as u64,
                "turn_timeout too short, clamping"
            );
            self.turn_timeout = Self::MIN_TURN_TIMEOUT;
        }
        self.afk_threshold = self.afk_threshold.max(1);
        self.channel_size = self.channel_size.max(1);
        self
    }
}
