//! Random playouts.
//!
//! A playout plays uniformly random legal moves until a lion is captured,
//! the side to move has no legal moves, or a ply limit is reached. Used by
//! the random opponent and for exercising the rules over many positions.

use fastrand::Rng;

use crate::board::{Board, Side};
use crate::moves::{Move, apply, generate_moves};

/// Outcome of a random playout.
#[derive(Debug, Clone)]
pub struct Playout {
    /// Moves played, in order.
    pub moves: Vec<Move>,
    /// Position after the last move.
    pub board: Board,
    /// Side to move at the end.
    pub to_move: Side,
    /// Winner, if the game was decided within the ply limit.
    pub winner: Option<Side>,
}

/// Pick a uniformly random legal move for `side`, or `None` if it has none.
pub fn random_move(board: &Board, side: Side, rng: &mut Rng) -> Option<Move> {
    let moves = generate_moves(board, side);
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}

/// Play random moves from `board` with `side` to move, for at most
/// `max_plies` plies.
pub fn playout(board: &Board, side: Side, max_plies: usize, rng: &mut Rng) -> Playout {
    let mut board = board.clone();
    let mut to_move = side;
    let mut moves = Vec::new();
    let mut winner = board.captured_lion();

    while winner.is_none() && moves.len() < max_plies {
        match random_move(&board, to_move, rng) {
            Some(mv) => {
                board = apply(&board, &mv);
                moves.push(mv);
                to_move = to_move.opponent();
                winner = board.captured_lion();
            }
            None => {
                winner = Some(to_move.opponent());
            }
        }
    }

    Playout {
        moves,
        board,
        to_move,
        winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::initial_board;
    use crate::constants::MAX_PLAYOUT_PLIES;

    #[test]
    fn test_playout_is_reproducible() {
        let board = initial_board();
        let a = playout(&board, Side::First, MAX_PLAYOUT_PLIES, &mut Rng::with_seed(7));
        let b = playout(&board, Side::First, MAX_PLAYOUT_PLIES, &mut Rng::with_seed(7));
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.board, b.board);
        assert_eq!(a.winner, b.winner);
    }

    #[test]
    fn test_playout_respects_ply_limit() {
        let result = playout(&initial_board(), Side::First, 3, &mut Rng::with_seed(1));
        assert!(result.moves.len() <= 3);
        assert_eq!(result.board.len(), 8);
    }

    #[test]
    fn test_playout_alternates_sides() {
        let result = playout(&initial_board(), Side::First, 40, &mut Rng::with_seed(99));
        let mut side = Side::First;
        for mv in &result.moves {
            assert_eq!(mv.side, side);
            side = side.opponent();
        }
        assert_eq!(side, result.to_move);
    }

    #[test]
    fn test_random_move_none_when_stuck() {
        let board = Board::new(vec!["wC@c4".parse().unwrap()]).unwrap();
        assert_eq!(random_move(&board, Side::Second, &mut Rng::with_seed(3)), None);
        let result = playout(&board, Side::Second, 10, &mut Rng::with_seed(3));
        assert_eq!(result.winner, Some(Side::First));
        assert!(result.moves.is_empty());
    }
}
