//! Fixed-depth minimax search.
//!
//! The search is exhaustive: every legal move is expanded down to the
//! requested depth, with no pruning and no transposition table. Scores are
//! from the first side's point of view; the first side maximizes and the
//! second minimizes.
//!
//! Among equally scored candidates the earlier one in generation order is
//! kept, unless a later one has a strictly longer principal variation.

use std::fmt;
use std::time::Instant;

use crate::board::{Board, Side};
use crate::constants::WIN_SCORE;
use crate::moves::{Move, apply, generate_moves};

/// How often (in nodes) the deadline is compared against the clock.
const DEADLINE_CHECK_PERIOD: u64 = 256;

/// Limits on a single search. The default is unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Abort once more than this many nodes have been visited.
    pub max_nodes: Option<u64>,
    /// Abort once this instant has passed.
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    pub fn is_unlimited(&self) -> bool {
        self.max_nodes.is_none() && self.deadline.is_none()
    }
}

/// A search stopped by its limits before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAborted {
    NodeLimit(u64),
    Timeout,
}

impl fmt::Display for SearchAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchAborted::NodeLimit(n) => write!(f, "search aborted after {n} nodes"),
            SearchAborted::Timeout => write!(f, "search aborted: time limit reached"),
        }
    }
}

impl std::error::Error for SearchAborted {}

/// Score and principal variation of the best line found.
pub type Line = (i32, Vec<Move>);

/// Search `depth` plies ahead with `side` to move and return the best score
/// and principal variation.
///
/// - A captured lion ends the game: `+WIN_SCORE` if the first side holds it,
///   `-WIN_SCORE` otherwise. This is checked before the depth.
/// - At depth 0 the score is the material balance.
/// - A side with no legal moves loses.
pub fn evaluate(board: &Board, side: Side, depth: u32) -> Line {
    match Searcher::new(SearchLimits::default()).run(board, side, depth) {
        Ok(line) => line,
        Err(e) => unreachable!("unlimited search cannot abort: {e}"),
    }
}

/// Runs [`evaluate`]-equivalent searches under [`SearchLimits`], counting
/// visited nodes.
#[derive(Debug, Clone)]
pub struct Searcher {
    limits: SearchLimits,
    nodes: u64,
}

impl Searcher {
    pub fn new(limits: SearchLimits) -> Self {
        Searcher { limits, nodes: 0 }
    }

    /// Nodes visited by the most recent [`Searcher::run`].
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn run(&mut self, board: &Board, side: Side, depth: u32) -> Result<Line, SearchAborted> {
        self.nodes = 0;
        self.minimax(board, side, depth)
    }

    fn check_limits(&mut self) -> Result<(), SearchAborted> {
        self.nodes += 1;
        if let Some(max) = self.limits.max_nodes {
            if self.nodes > max {
                return Err(SearchAborted::NodeLimit(max));
            }
        }
        if let Some(deadline) = self.limits.deadline {
            if self.nodes % DEADLINE_CHECK_PERIOD == 1 && Instant::now() >= deadline {
                return Err(SearchAborted::Timeout);
            }
        }
        Ok(())
    }

    fn minimax(&mut self, board: &Board, side: Side, depth: u32) -> Result<Line, SearchAborted> {
        self.check_limits()?;

        if let Some(winner) = board.captured_lion() {
            return Ok((winner.sign() * WIN_SCORE, Vec::new()));
        }
        if depth == 0 {
            return Ok((board.material_score(), Vec::new()));
        }

        let sign = side.sign();
        let mut best: Option<(i32, Move, Vec<Move>)> = None;
        for mv in generate_moves(board, side) {
            let next = apply(board, &mv);
            let (score, path) = self.minimax(&next, side.opponent(), depth - 1)?;
            let accept = match &best {
                None => true,
                Some((best_score, _, best_path)) => {
                    prefer(sign, *best_score, best_path.len() + 1, score, path.len() + 1)
                }
            };
            if accept {
                best = Some((score, mv, path));
            }
        }

        Ok(match best {
            Some((score, mv, path)) => {
                let mut line = Vec::with_capacity(path.len() + 1);
                line.push(mv);
                line.extend(path);
                (score, line)
            }
            // No legal moves: the side to move loses.
            None => (-sign * WIN_SCORE, Vec::new()),
        })
    }
}

/// Whether a candidate replaces the current best for the mover with `sign`.
#[inline]
fn prefer(sign: i32, best_score: i32, best_len: usize, score: i32, len: usize) -> bool {
    sign * score > sign * best_score || (score == best_score && len > best_len)
}
