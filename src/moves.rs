//! Moves: generation, validation of external input, and board transition.
//!
//! Generation and validation are independent. The generator mirrors the
//! displacement vectors for the second side; the validator checks the raw
//! vector against the unmirrored set for both sides. The two intentionally
//! do not share code.

use std::fmt;

use crate::board::{Board, Cell, Location, PieceKind, Placement, Side};
use crate::constants::{FIRST_MARKER, SECOND_MARKER};

/// A step or capture (origin on the board) or a drop (origin in hand).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub side: Side,
    pub kind: PieceKind,
    pub origin: Location,
    pub destination: Cell,
}

impl Move {
    pub fn new(side: Side, kind: PieceKind, origin: impl Into<Location>, destination: Cell) -> Self {
        Move {
            side,
            kind,
            origin: origin.into(),
            destination,
        }
    }

    pub fn is_drop(&self) -> bool {
        self.origin.is_hand()
    }
}

impl fmt::Display for Move {
    /// `▲b3 Chick (b4)`: turn marker, destination, kind, origin.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.side {
            Side::First => FIRST_MARKER,
            Side::Second => SECOND_MARKER,
        };
        write!(f, "{marker}{} {} ({})", self.destination, self.kind, self.origin)
    }
}

/// Why an externally supplied move was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No piece of this kind and side sits at the origin.
    PieceAbsent { kind: PieceKind, origin: Location },
    /// The mover already has a piece on the destination.
    OwnPieceAtDestination(Cell),
    /// The destination is not one of the 12 grid cells.
    DestinationOutOfRange(Cell),
    /// The kind cannot make this step.
    IllegalVector {
        kind: PieceKind,
        origin: Cell,
        destination: Cell,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::PieceAbsent { kind, origin } => {
                write!(f, "no {kind} of yours at the original position [{origin}]")
            }
            ValidationError::OwnPieceAtDestination(cell) => {
                write!(f, "your piece is already at the new position [{cell}]")
            }
            ValidationError::DestinationOutOfRange(cell) => {
                write!(f, "invalid position name [{cell}]")
            }
            ValidationError::IllegalVector {
                kind,
                origin,
                destination,
            } => write!(f, "{kind} cannot move from {origin} to {destination}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every geometrically legal move for `side`, in storage order of its pieces.
///
/// Hand pieces yield one drop per empty cell (column-major). Board pieces
/// yield one move per displacement vector that stays on the grid and does not
/// land on a piece of `side`. There is no check concept: moves that expose
/// the mover's own lion are included.
pub fn generate_moves(board: &Board, side: Side) -> Vec<Move> {
    let empty = board.empty_cells();
    let own = board.cells_owned_by(side);
    let mirror = match side {
        Side::First => 1,
        Side::Second => -1,
    };

    let mut moves = Vec::new();
    for p in board.placements().iter().filter(|p| p.side == side) {
        match p.location {
            Location::Hand => {
                moves.extend(empty.iter().map(|&c| Move::new(side, p.kind, Location::Hand, c)));
            }
            Location::Board(origin) => {
                for &(dx, dy) in p.kind.vectors() {
                    let dest = origin.offset(dx * mirror, dy * mirror);
                    if !dest.is_on_board() || own.contains(&dest) {
                        continue;
                    }
                    moves.push(Move::new(side, p.kind, origin, dest));
                }
            }
        }
    }
    moves
}

/// Check a move supplied from outside the search. Never changes the board.
///
/// Checks run in a fixed order and the first failure is reported. The
/// movement check compares the raw displacement against the kind's
/// first-side vector set for either side, and is skipped for drops.
pub fn validate(board: &Board, mv: &Move) -> Result<(), ValidationError> {
    let exists = board
        .placements()
        .iter()
        .any(|p| p.side == mv.side && p.location == mv.origin && p.kind == mv.kind);
    if !exists {
        return Err(ValidationError::PieceAbsent {
            kind: mv.kind,
            origin: mv.origin,
        });
    }

    let dest = Location::Board(mv.destination);
    if board
        .placements()
        .iter()
        .any(|p| p.side == mv.side && p.location == dest)
    {
        return Err(ValidationError::OwnPieceAtDestination(mv.destination));
    }

    if !mv.destination.is_on_board() {
        return Err(ValidationError::DestinationOutOfRange(mv.destination));
    }

    if let Location::Board(origin) = mv.origin {
        let step = (mv.destination.x - origin.x, mv.destination.y - origin.y);
        if !mv.kind.vectors().contains(&step) {
            return Err(ValidationError::IllegalVector {
                kind: mv.kind,
                origin,
                destination: mv.destination,
            });
        }
    }

    Ok(())
}

/// Apply `mv` and return the next board.
///
/// A piece on the destination changes owner to the mover and goes to the
/// mover's hand. Then the first placement in storage order matching the
/// move's side, origin and kind moves to the destination. Chicks do not
/// promote.
///
/// # Panics
///
/// Panics if the destination is off the board, or if no placement matches
/// the move's origin. Moves from [`generate_moves`] or accepted by
/// [`validate`] satisfy both.
pub fn apply(board: &Board, mv: &Move) -> Board {
    assert!(
        mv.destination.is_on_board(),
        "destination {} is off the board for move {mv}",
        mv.destination
    );
    let dest = Location::Board(mv.destination);
    let mut placements: Vec<Placement> = board
        .placements()
        .iter()
        .map(|&p| {
            if p.location == dest {
                Placement::new(mv.side, Location::Hand, p.kind)
            } else {
                p
            }
        })
        .collect();

    let mover = placements
        .iter_mut()
        .find(|p| p.side == mv.side && p.location == mv.origin && p.kind == mv.kind);
    match mover {
        Some(p) => p.location = dest,
        None => panic!("no {} {} at {} for move {mv}", mv.side, mv.kind, mv.origin),
    }

    Board::from_placements(placements)
}

impl Board {
    /// Validate `mv` and, if it passes, return the board after it.
    pub fn play(&self, mv: &Move) -> Result<Board, ValidationError> {
        validate(self, mv)?;
        Ok(apply(self, mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::initial_board;

    fn cell(name: &str) -> Cell {
        name.parse().unwrap()
    }

    #[test]
    fn test_initial_moves_first() {
        let board = initial_board();
        let moves = generate_moves(&board, Side::First);
        let text: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            text,
            [
                "▲a3 Lion (b4)",
                "▲c3 Lion (b4)",
                "▲c3 Giraffe (c4)",
                "▲b2 Chick (b3)",
            ]
        );
    }

    #[test]
    fn test_initial_moves_second_are_mirrored() {
        let board = initial_board();
        let moves = generate_moves(&board, Side::Second);
        let text: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            text,
            [
                "△c2 Lion (b1)",
                "△a2 Lion (b1)",
                "△a2 Giraffe (a1)",
                "△b3 Chick (b2)",
            ]
        );
    }

    #[test]
    fn test_apply_capture_goes_to_hand() {
        let board = initial_board();
        let mv = Move::new(Side::First, PieceKind::Chick, cell("b3"), cell("b2"));
        let next = apply(&board, &mv);
        assert_eq!(next.len(), board.len());
        assert_eq!(next.hand(Side::First).collect::<Vec<_>>(), [PieceKind::Chick]);
        assert_eq!(next.piece_at(cell("b2")).map(|p| p.side), Some(Side::First));
        assert_eq!(next.piece_at(cell("b3")), None);
        // the original board is untouched
        assert_eq!(board, initial_board());
    }

    #[test]
    fn test_chick_does_not_promote() {
        let board = Board::new(vec![
            Placement::new(Side::First, cell("a2"), PieceKind::Chick),
            Placement::new(Side::First, cell("c4"), PieceKind::Lion),
            Placement::new(Side::Second, cell("c2"), PieceKind::Lion),
        ])
        .unwrap();
        let mv = Move::new(Side::First, PieceKind::Chick, cell("a2"), cell("a1"));
        let next = board.play(&mv).unwrap();
        assert_eq!(next.piece_at(cell("a1")).map(|p| p.kind), Some(PieceKind::Chick));
    }

    #[test]
    fn test_apply_moves_only_first_match() {
        let board = Board::new(vec![
            Placement::new(Side::First, Location::Hand, PieceKind::Chick),
            Placement::new(Side::First, Location::Hand, PieceKind::Chick),
        ])
        .unwrap();
        let mv = Move::new(Side::First, PieceKind::Chick, Location::Hand, cell("a1"));
        let next = apply(&board, &mv);
        assert_eq!(next.placements()[0].location, Location::Board(cell("a1")));
        assert_eq!(next.placements()[1].location, Location::Hand);
    }

    #[test]
    #[should_panic(expected = "no first Elephant")]
    fn test_apply_missing_origin_panics() {
        let board = initial_board();
        let mv = Move::new(Side::First, PieceKind::Elephant, cell("b3"), cell("a2"));
        apply(&board, &mv);
    }

    #[test]
    #[should_panic(expected = "destination d1 is off the board")]
    fn test_apply_off_board_destination_panics() {
        let board = initial_board();
        let mv = Move::new(Side::First, PieceKind::Giraffe, cell("c4"), cell("d1"));
        apply(&board, &mv);
    }

    #[test]
    fn test_validate_order() {
        let board = initial_board();

        let absent = Move::new(Side::First, PieceKind::Lion, cell("a1"), cell("a2"));
        assert!(matches!(
            validate(&board, &absent),
            Err(ValidationError::PieceAbsent { .. })
        ));

        let onto_own = Move::new(Side::First, PieceKind::Lion, cell("b4"), cell("b3"));
        assert_eq!(
            validate(&board, &onto_own),
            Err(ValidationError::OwnPieceAtDestination(cell("b3")))
        );

        let off = Move::new(Side::First, PieceKind::Giraffe, cell("c4"), cell("d4"));
        assert_eq!(
            validate(&board, &off),
            Err(ValidationError::DestinationOutOfRange(cell("d4")))
        );

        let sideways = Move::new(Side::First, PieceKind::Elephant, cell("a4"), cell("a3"));
        assert!(matches!(
            validate(&board, &sideways),
            Err(ValidationError::IllegalVector { .. })
        ));

        let ok = Move::new(Side::First, PieceKind::Chick, cell("b3"), cell("b2"));
        assert_eq!(validate(&board, &ok), Ok(()));
    }

    #[test]
    fn test_validate_does_not_mirror_second_side() {
        let board = initial_board();
        // The generator offers b2->b3 for the second side's chick...
        let forward = Move::new(Side::Second, PieceKind::Chick, cell("b2"), cell("b3"));
        assert!(generate_moves(&board, Side::Second).contains(&forward));
        // ...but the validator checks the unmirrored vector and refuses it.
        assert!(matches!(
            validate(&board, &forward),
            Err(ValidationError::IllegalVector { .. })
        ));

        // The unmirrored direction passes validation though the generator never offers it.
        let board = Board::new(vec![
            Placement::new(Side::Second, cell("b2"), PieceKind::Chick),
            Placement::new(Side::Second, cell("c1"), PieceKind::Lion),
            Placement::new(Side::First, cell("b4"), PieceKind::Lion),
        ])
        .unwrap();
        let backward = Move::new(Side::Second, PieceKind::Chick, cell("b2"), cell("b1"));
        assert_eq!(validate(&board, &backward), Ok(()));
        assert!(!generate_moves(&board, Side::Second).contains(&backward));
    }

    #[test]
    fn test_drop_skips_vector_check() {
        let board = Board::new(vec![
            Placement::new(Side::First, Location::Hand, PieceKind::Giraffe),
            Placement::new(Side::First, cell("b4"), PieceKind::Lion),
            Placement::new(Side::Second, cell("b1"), PieceKind::Lion),
        ])
        .unwrap();
        let drop = Move::new(Side::First, PieceKind::Giraffe, Location::Hand, cell("a1"));
        assert!(drop.is_drop());
        assert_eq!(validate(&board, &drop), Ok(()));
        let next = board.play(&drop).unwrap();
        assert_eq!(next.hand(Side::First).count(), 0);
    }
}
