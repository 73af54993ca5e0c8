//! Static board geometry.
//!
//! Every pawn position is stored *relative to its own colour*:
//!
//! ```text
//!   0        base (off the board)
//!   1..=52   shared loop, 1 = this colour's start square
//!   53..=58  this colour's private home stretch
//!   59       goal
//! ```
//!
//! The same relative number means a different physical square for each
//! colour, so collisions are always decided on the *absolute* position
//! returned by [`absolute`]. Nothing else in the workspace converts between
//! the two numberings.

use crate::Color;

/// Off-board starting area.
pub const BASE: u8 = 0;
/// Number of squares in the shared loop.
pub const TRACK_LENGTH: u8 = 52;
/// First square of a colour's private home stretch.
pub const HOME_STRETCH_START: u8 = 53;
/// Last square of a colour's private home stretch.
pub const HOME_STRETCH_END: u8 = 58;
/// Final square. A pawn here never moves again.
pub const GOAL: u8 = 59;
/// The roll that lets a pawn leave base. Also grants an extra turn.
pub const ENTER_VALUE: u8 = 6;
/// Relative square a pawn lands on when it leaves base.
pub const START_SQUARE: u8 = 1;
/// Relative square after which a further step turns into the home stretch.
pub const HOME_ENTRY_SQUARE: u8 = 51;
/// Pawns per colour.
pub const PAWNS_PER_COLOR: u8 = 4;
/// Squares between two neighbouring colours' start squares.
pub const COLOR_SPACING: u8 = TRACK_LENGTH / 4;

/// Safe squares, as relative positions.
///
/// The set repeats every [`COLOR_SPACING`] squares, so it names the same
/// physical squares whichever colour's numbering you read it in.
pub const SAFE_SQUARES: [u8; 8] = [1, 9, 14, 22, 27, 35, 40, 48];

/// Absolute offset of a colour's start square on the shared loop.
pub fn start_offset(color: Color) -> u8 {
    color.index() as u8 * COLOR_SPACING
}

/// The relative square a colour enters on when leaving base.
pub fn start_square(_color: Color) -> u8 {
    START_SQUARE
}

/// The relative square after which a colour diverts into its home stretch.
pub fn home_entry_square(_color: Color) -> u8 {
    HOME_ENTRY_SQUARE
}

pub fn is_on_track(position: u8) -> bool {
    (1..=TRACK_LENGTH).contains(&position)
}

pub fn is_in_home_stretch(position: u8) -> bool {
    (HOME_STRETCH_START..=HOME_STRETCH_END).contains(&position)
}

/// `true` for every position a pawn may legally hold.
pub fn is_valid_position(position: u8) -> bool {
    position <= GOAL
}

/// Whether a relative track position is a safe square.
///
/// Only shared-track squares can be safe; the home stretch and goal are
/// private and need no protection.
pub fn is_safe(position: u8) -> bool {
    SAFE_SQUARES.contains(&position)
}

/// Converts a colour-relative position to the shared absolute numbering
/// (1..=52). Returns `None` off the shared track (base, home stretch, goal).
pub fn absolute(color: Color, position: u8) -> Option<u8> {
    if !is_on_track(position) {
        return None;
    }
    let zero_based = (position - 1 + start_offset(color)) % TRACK_LENGTH;
    Some(zero_based + 1)
}

/// How many steps a pawn at `position` has travelled from base.
///
/// The home stretch follows square 51 directly, so relative square 52 is
/// never part of a colour's own journey.
pub fn journey(position: u8) -> u8 {
    match position {
        BASE => 0,
        p if p <= HOME_ENTRY_SQUARE => p,
        p if is_in_home_stretch(p) => p - 1,
        GOAL => GOAL - 1,
        // Relative 52 is only reachable through wrap-around.
        p => p,
    }
}
