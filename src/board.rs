//! Board model: sides, piece kinds, cells, placements, and pure queries.
//!
//! A [`Board`] is an ordered list of [`Placement`]s. The order is the
//! storage order: move generation walks placements in this order, and a
//! transition moves the first placement matching a move's origin. Boards are
//! values; a move produces a new board rather than editing one in place.

use std::fmt;
use std::str::FromStr;

use crate::constants::{COLUMN_NAMES, HAND_TOKEN, HEIGHT, NUM_CELLS, WIDTH};

/// One of the two players. `First` moves toward row 1, `Second` toward row 4.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// `+1` for the maximizing first side, `-1` for the second.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Side::First => 1,
            Side::Second => -1,
        }
    }

    /// Short wire form: `b` for First, `w` for Second.
    pub fn as_char(self) -> char {
        match self {
            Side::First => 'b',
            Side::Second => 'w',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

impl FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" | "first" => Ok(Side::First),
            "w" | "white" | "second" => Ok(Side::Second),
            _ => Err(ParseError::Side(s.to_string())),
        }
    }
}

/// The five piece kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Lion,
    Elephant,
    Giraffe,
    Chick,
    PromotedChick,
}

const LION_VECTORS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const ELEPHANT_VECTORS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const GIRAFFE_VECTORS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const CHICK_VECTORS: [(i8, i8); 1] = [(0, -1)];
const PROMOTED_CHICK_VECTORS: [(i8, i8); 6] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (0, 1),
];

impl PieceKind {
    pub const ALL: [PieceKind; 5] = [
        PieceKind::Lion,
        PieceKind::Elephant,
        PieceKind::Giraffe,
        PieceKind::Chick,
        PieceKind::PromotedChick,
    ];

    /// Material value used by the leaf evaluation.
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Lion => 100,
            PieceKind::Elephant => 5,
            PieceKind::Giraffe => 6,
            PieceKind::Chick => 1,
            PieceKind::PromotedChick => 8,
        }
    }

    /// One-step displacements for the first side. "Forward" is `dy = -1`;
    /// the second side negates every vector.
    pub fn vectors(self) -> &'static [(i8, i8)] {
        match self {
            PieceKind::Lion => &LION_VECTORS,
            PieceKind::Elephant => &ELEPHANT_VECTORS,
            PieceKind::Giraffe => &GIRAFFE_VECTORS,
            PieceKind::Chick => &CHICK_VECTORS,
            PieceKind::PromotedChick => &PROMOTED_CHICK_VECTORS,
        }
    }

    pub fn acronym(self) -> char {
        match self {
            PieceKind::Lion => 'L',
            PieceKind::Elephant => 'E',
            PieceKind::Giraffe => 'G',
            PieceKind::Chick => 'C',
            PieceKind::PromotedChick => 'P',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Lion => "Lion",
            PieceKind::Elephant => "Elephant",
            PieceKind::Giraffe => "Giraffe",
            PieceKind::Chick => "Chick",
            PieceKind::PromotedChick => "PromotedChick",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PieceKind {
    type Err = ParseError;

    /// Accepts names, one-letter acronyms, and the traditional aliases
    /// (`hiyoko` for a chick, `chicken`/`hen` for a promoted chick).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "lion" | "l" => PieceKind::Lion,
            "elephant" | "e" => PieceKind::Elephant,
            "giraffe" | "g" => PieceKind::Giraffe,
            "chick" | "hiyoko" | "c" => PieceKind::Chick,
            "promotedchick" | "chicken" | "hen" | "p" => PieceKind::PromotedChick,
            _ => return Err(ParseError::Kind(s.to_string())),
        };
        Ok(kind)
    }
}

/// A raw grid coordinate. Cells parsed from text may lie off the 3x4 grid;
/// use [`Cell::is_on_board`] before treating one as a square.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i8,
    pub y: i8,
}

impl Cell {
    pub const fn new(x: i8, y: i8) -> Self {
        Cell { x, y }
    }

    #[inline]
    pub fn is_on_board(self) -> bool {
        (0..WIDTH).contains(&self.x) && (0..HEIGHT).contains(&self.y)
    }

    /// The cell displaced by `(dx, dy)`. The result may be off the board.
    #[inline]
    pub fn offset(self, dx: i8, dy: i8) -> Cell {
        Cell::new(self.x + dx, self.y + dy)
    }

    /// All 12 grid cells in column-major order: a1, a2, a3, a4, b1, ..., c4.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..WIDTH).flat_map(|x| (0..HEIGHT).map(move |y| Cell::new(x, y)))
    }

    /// Dense index in `0..NUM_CELLS` for on-board cells.
    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self.is_on_board());
        (self.y * WIDTH + self.x) as usize
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            let col = COLUMN_NAMES[self.x as usize] as char;
            write!(f, "{col}{}", self.y + 1)
        } else if (0..26).contains(&self.x) && (-1..9).contains(&self.y) {
            write!(f, "{}{}", (b'a' + self.x as u8) as char, self.y + 1)
        } else {
            write!(f, "({},{})", self.x, self.y)
        }
    }
}

impl FromStr for Cell {
    type Err = ParseError;

    /// Parses `<letter><digit>`, e.g. `a1` -> `(0, 0)`. Any letter and digit is
    /// accepted; `d5` parses to the off-board cell `(3, 4)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Cell(s.to_string()));
        }
        let col = bytes[0].to_ascii_lowercase();
        let row = bytes[1];
        if !col.is_ascii_lowercase() || !row.is_ascii_digit() {
            return Err(ParseError::Cell(s.to_string()));
        }
        Ok(Cell::new((col - b'a') as i8, (row - b'0') as i8 - 1))
    }
}

/// Where a piece sits: a grid cell, or its owner's hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Board(Cell),
    Hand,
}

impl Location {
    pub fn cell(self) -> Option<Cell> {
        match self {
            Location::Board(cell) => Some(cell),
            Location::Hand => None,
        }
    }

    pub fn is_hand(self) -> bool {
        self == Location::Hand
    }
}

impl From<Cell> for Location {
    fn from(cell: Cell) -> Self {
        Location::Board(cell)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Board(cell) => write!(f, "{cell}"),
            Location::Hand => f.write_str(HAND_TOKEN),
        }
    }
}

impl FromStr for Location {
    type Err = ParseError;

    /// `hand`, or anything starting with `m` (as in "mochigoma"), is the hand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower == HAND_TOKEN || lower.starts_with('m') {
            return Ok(Location::Hand);
        }
        s.parse().map(Location::Board)
    }
}

/// One piece: who owns it, where it is, and what it is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub side: Side,
    pub location: Location,
    pub kind: PieceKind,
}

impl Placement {
    pub fn new(side: Side, location: impl Into<Location>, kind: PieceKind) -> Self {
        Placement {
            side,
            location: location.into(),
            kind,
        }
    }
}

impl fmt::Display for Placement {
    /// Token form: `bL@b4`, `wC@hand`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}@{}",
            self.side.as_char(),
            self.kind.acronym(),
            self.location
        )
    }
}

impl FromStr for Placement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseError::Placement(s.to_string());
        let (piece, location) = s.split_once('@').ok_or_else(bad)?;
        let mut chars = piece.chars();
        let side = chars.next().ok_or_else(bad)?;
        let kind = chars.as_str();
        if kind.is_empty() {
            return Err(bad());
        }
        Ok(Placement {
            side: side.to_string().parse()?,
            location: location.parse()?,
            kind: kind.parse()?,
        })
    }
}

/// Failure to parse a side, kind, cell, or placement token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Side(String),
    Kind(String),
    Cell(String),
    Placement(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Side(s) => write!(f, "invalid side name [{s}]"),
            ParseError::Kind(s) => write!(f, "invalid piece name [{s}]"),
            ParseError::Cell(s) => write!(f, "invalid cell name [{s}]"),
            ParseError::Placement(s) => write!(f, "invalid placement [{s}], expected e.g. bL@b4"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A placement list that violates the board invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// A placement sits outside the 3x4 grid.
    OffBoard(Cell),
    /// Two placements share a grid cell.
    Occupied(Cell),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OffBoard(cell) => write!(f, "placement outside the board [{cell}]"),
            BoardError::Occupied(cell) => write!(f, "more than one piece on [{cell}]"),
        }
    }
}

impl std::error::Error for BoardError {}

/// A position: every piece in play, in storage order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    placements: Vec<Placement>,
}

impl Default for Board {
    fn default() -> Self {
        initial_board()
    }
}

impl Board {
    /// Build a board, checking that every grid placement is on the board and
    /// that no cell holds two pieces.
    pub fn new(placements: Vec<Placement>) -> Result<Self, BoardError> {
        let mut seen = [false; NUM_CELLS];
        for p in &placements {
            if let Location::Board(cell) = p.location {
                if !cell.is_on_board() {
                    return Err(BoardError::OffBoard(cell));
                }
                if std::mem::replace(&mut seen[cell.index()], true) {
                    return Err(BoardError::Occupied(cell));
                }
            }
        }
        Ok(Board { placements })
    }

    pub(crate) fn from_placements(placements: Vec<Placement>) -> Self {
        Board { placements }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// The piece on `cell`, if any.
    pub fn piece_at(&self, cell: Cell) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.location == Location::Board(cell))
    }

    /// Kinds held in `side`'s hand, in storage order.
    pub fn hand(&self, side: Side) -> impl Iterator<Item = PieceKind> + '_ {
        self.placements
            .iter()
            .filter(move |p| p.side == side && p.location.is_hand())
            .map(|p| p.kind)
    }

    /// All grid cells with no piece on them, in column-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        let mut filled = [false; NUM_CELLS];
        for cell in self.placements.iter().filter_map(|p| p.location.cell()) {
            filled[cell.index()] = true;
        }
        Cell::all().filter(|c| !filled[c.index()]).collect()
    }

    /// Grid cells holding a piece owned by `side`, in storage order.
    pub fn cells_owned_by(&self, side: Side) -> Vec<Cell> {
        self.placements
            .iter()
            .filter(|p| p.side == side)
            .filter_map(|p| p.location.cell())
            .collect()
    }

    /// Signed material sum over every piece, on the board or in hand.
    /// Positive favours the first side.
    pub fn material_score(&self) -> i32 {
        self.placements
            .iter()
            .map(|p| p.side.sign() * p.kind.value())
            .sum()
    }

    /// If a lion has been captured, the side now holding it (the winner).
    pub fn captured_lion(&self) -> Option<Side> {
        self.placements
            .iter()
            .find(|p| p.kind == PieceKind::Lion && p.location.is_hand())
            .map(|p| p.side)
    }
}

/// The fixed starting position: four pieces per side, hands empty.
pub fn initial_board() -> Board {
    use PieceKind::*;
    let at = |side, x, y, kind| Placement::new(side, Cell::new(x, y), kind);
    Board::from_placements(vec![
        at(Side::First, 1, 3, Lion),
        at(Side::First, 0, 3, Elephant),
        at(Side::First, 2, 3, Giraffe),
        at(Side::First, 1, 2, Chick),
        at(Side::Second, 1, 0, Lion),
        at(Side::Second, 2, 0, Elephant),
        at(Side::Second, 0, 0, Giraffe),
        at(Side::Second, 1, 1, Chick),
    ])
}

impl fmt::Display for Board {
    /// Second's hand on top, the grid from row 1 down to row 4, then First's
    /// hand. Pieces show as `^X` (First) or `vX` (Second).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hand_line = |side| {
            self.hand(side)
                .map(|k| k.acronym().to_string())
                .collect::<Vec<_>>()
                .join(",")
        };

        writeln!(f, "{}", hand_line(Side::Second))?;
        writeln!(f)?;
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                match self.piece_at(Cell::new(x, y)) {
                    Some(p) => {
                        let arrow = if p.side == Side::First { '^' } else { 'v' };
                        write!(f, "{arrow}{}", p.kind.acronym())?;
                    }
                    None => write!(f, "..")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", hand_line(Side::First))
    }
}
