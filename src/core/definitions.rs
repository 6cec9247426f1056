use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::core::utils::{compact_pos, is_valid_coord, parse_square, unpack_pos};

/// Number of men each side starts with.
pub const PIECES_PER_SIDE: u8 = 12;

#[derive(PartialEq, Eq, Hash, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "B")]
    Black,
    #[default]
    #[serde(rename = "W")]
    White,
}

impl Color {
    pub fn opposite(self) -> Color {
        if self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    /** Row on which men of this color are crowned */
    pub fn promotion_row(self) -> u8 {
        match self {
            Color::Black => 7,
            Color::White => 0,
        }
    }

    /** 0x88 steps of the two forward diagonals */
    pub(crate) fn forward(self) -> &'static [u8] {
        match self {
            Color::Black => BLACK_FORWARD,
            Color::White => WHITE_FORWARD,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(if self == &Self::White {
            "White"
        } else {
            "Black"
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown side `{0}`, expected white or black")]
pub struct UnknownColor(pub String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(UnknownColor(s.to_string())),
        }
    }
}

/** Tables directions for pieces */
pub(crate) const DIAGONALS: &[u8] = &[0x11, 0x0f, 0xef, 0xf1];
const BLACK_FORWARD: &[u8] = &[0x11, 0x0f];
const WHITE_FORWARD: &[u8] = &[0xef, 0xf1];

#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PieceKind {
    Man,
    King,
}

/// Content of a single square. Wire code is the `Display` form:
/// `E`, `B`, `W`, `BK`, `WK`.
#[derive(PartialEq, Eq, Debug, Default, Clone, Copy, SerializeDisplay, DeserializeFromStr)]
pub enum Cell {
    #[default]
    Empty,
    ManBlack,
    ManWhite,
    KingBlack,
    KingWhite,
}

impl Cell {
    pub fn piece(color: Color, kind: PieceKind) -> Cell {
        match (color, kind) {
            (Color::Black, PieceKind::Man) => Cell::ManBlack,
            (Color::White, PieceKind::Man) => Cell::ManWhite,
            (Color::Black, PieceKind::King) => Cell::KingBlack,
            (Color::White, PieceKind::King) => Cell::KingWhite,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::ManBlack | Cell::KingBlack => Some(Color::Black),
            Cell::ManWhite | Cell::KingWhite => Some(Color::White),
        }
    }

    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::ManBlack | Cell::ManWhite => Some(PieceKind::Man),
            Cell::KingBlack | Cell::KingWhite => Some(PieceKind::King),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn is_king(self) -> bool {
        matches!(self, Cell::KingBlack | Cell::KingWhite)
    }

    /** Same piece after promotion. Kings and empty cells are unchanged. */
    pub fn crowned(self) -> Cell {
        self.color()
            .map_or(self, |color| Cell::piece(color, PieceKind::King))
    }

    pub(crate) fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::ManBlack => 'b',
            Cell::ManWhite => 'w',
            Cell::KingBlack => 'B',
            Cell::KingWhite => 'W',
        }
    }

    pub(crate) fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            '.' => Some(Cell::Empty),
            'b' => Some(Cell::ManBlack),
            'w' => Some(Cell::ManWhite),
            'B' => Some(Cell::KingBlack),
            'W' => Some(Cell::KingWhite),
            _ => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Cell::Empty => "E",
            Cell::ManBlack => "B",
            Cell::ManWhite => "W",
            Cell::KingBlack => "BK",
            Cell::KingWhite => "WK",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cell code `{0}`")]
pub struct UnknownCell(pub String);

impl FromStr for Cell {
    type Err = UnknownCell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E" => Ok(Cell::Empty),
            "B" => Ok(Cell::ManBlack),
            "W" => Ok(Cell::ManWhite),
            "BK" => Ok(Cell::KingBlack),
            "WK" => Ok(Cell::KingWhite),
            other => Err(UnknownCell(other.to_string())),
        }
    }
}

/// Board coordinate, zero-based. Row 0 is rank `1`, column 0 is file `a`.
///
/// Squares are not validated on construction: the legality evaluator reports
/// off-board or light squares as [`IllegalMove::OutOfRange`].
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, SerializeDisplay, DeserializeFromStr)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Square {
        Square { row, col }
    }

    pub fn is_on_board(self) -> bool {
        self.row < 8 && self.col < 8
    }

    /** Only dark squares hold pieces. Dark means `row + col` is even. */
    pub fn is_dark(self) -> bool {
        (self.row ^ self.col) & 1 == 0
    }

    pub fn is_playable(self) -> bool {
        self.is_on_board() && self.is_dark()
    }

    /** 0x88 index, `None` for off-board squares */
    pub(crate) fn index(self) -> Option<u8> {
        if self.is_on_board() {
            Some(compact_pos(self.row, self.col))
        } else {
            None
        }
    }

    pub(crate) fn from_index(pos: u8) -> Square {
        debug_assert!(is_valid_coord(pos), "0x88 index {pos:#x} is off the board");
        let (row, col) = unpack_pos(pos);
        Square { row, col }
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_on_board() {
            let file = (b'a' + self.col) as char;
            write!(f, "{}{}", file, self.row + 1)
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_square(s)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MoveKind {
    Move,
    Capture { jumped: Square },
}

impl MoveKind {
    pub fn jumped(self) -> Option<Square> {
        match self {
            MoveKind::Move => None,
            MoveKind::Capture { jumped } => Some(jumped),
        }
    }
}

/// One capture opportunity found by the scanner.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Capture {
    pub from: Square,
    pub landing: Square,
    pub jumped: Square,
}

/// A move that the evaluator would accept in the current position.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CandidateMove {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl From<Capture> for CandidateMove {
    fn from(capture: Capture) -> Self {
        CandidateMove {
            from: capture.from,
            to: capture.landing,
            kind: MoveKind::Capture {
                jumped: capture.jumped,
            },
        }
    }
}

impl Display for CandidateMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sep = match self.kind {
            MoveKind::Move => '-',
            MoveKind::Capture { .. } => 'x',
        };
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinate `{token}`, expected a letter a-h followed by a digit 1-8")]
pub struct ParseError {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("square is outside the playable dark squares")]
    OutOfRange,
    #[error("there is no piece on the source square")]
    NoPieceThere,
    #[error("piece belongs to the other side")]
    NotYourTurn,
    #[error("a capture is available and must be taken")]
    MustCapture,
    #[error("men can't move backward")]
    BackwardNotAllowed,
    #[error("destination is not on a diagonal of the piece")]
    InvalidDiagonal,
    #[error("king's path is blocked by its own piece")]
    IllegalKingMove,
    #[error("men move one square at a time")]
    TooFar,
    #[error("more than one enemy piece on the diagonal")]
    MultipleEnemiesOnDiagonal,
    #[error("destination square is occupied")]
    DestinationOccupied,
}

impl IllegalMove {
    pub fn code(self) -> &'static str {
        match self {
            IllegalMove::OutOfRange => "out_of_range",
            IllegalMove::NoPieceThere => "no_piece_there",
            IllegalMove::NotYourTurn => "not_your_turn",
            IllegalMove::MustCapture => "must_capture",
            IllegalMove::BackwardNotAllowed => "backward_not_allowed",
            IllegalMove::InvalidDiagonal => "invalid_diagonal",
            IllegalMove::IllegalKingMove => "illegal_king_move",
            IllegalMove::TooFar => "too_far",
            IllegalMove::MultipleEnemiesOnDiagonal => "multiple_enemies_on_diagonal",
            IllegalMove::DestinationOccupied => "destination_occupied",
        }
    }
}

/// Every way an [`action`](crate::Game::action) can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Illegal(#[from] IllegalMove),
    #[error("game is already over")]
    GameAlreadyOver,
}

impl MoveError {
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::Parse(_) => "parse_error",
            MoveError::Illegal(illegal) => illegal.code(),
            MoveError::GameAlreadyOver => "game_already_over",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid board: {0}")]
pub struct InvalidBoard(pub String);
