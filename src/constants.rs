//! Constants for board geometry, scoring, and engine defaults.
//!
//! The board is 3 columns (`a`..`c`) by 4 rows (`1`..`4`). Cell `a1` is
//! `(0, 0)`; the first side starts on rows 3 and 4 and moves toward row 1.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of columns (`a`, `b`, `c`).
pub const WIDTH: i8 = 3;

/// Number of rows (`1`..`4`).
pub const HEIGHT: i8 = 4;

/// Number of grid cells.
pub const NUM_CELLS: usize = (WIDTH * HEIGHT) as usize;

/// Column letters, indexed by x.
pub const COLUMN_NAMES: &[u8; 3] = b"abc";

/// Wire token for a side's pool of captured pieces.
pub const HAND_TOKEN: &str = "hand";

// =============================================================================
// Scoring
// =============================================================================

/// Score of a decided game, positive when the first side has won.
pub const WIN_SCORE: i32 = 9999;

// =============================================================================
// Engine Defaults
// =============================================================================

/// Default look-ahead depth in plies.
pub const DEFAULT_DEPTH: u32 = 5;

/// Default ply limit for random playouts.
pub const MAX_PLAYOUT_PLIES: usize = 200;

/// Turn markers used in the move text form.
pub const FIRST_MARKER: char = '▲';
pub const SECOND_MARKER: char = '△';
