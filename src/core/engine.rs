use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::core::definitions::{
    CandidateMove, Capture, Cell, Color, IllegalMove, InvalidBoard, MoveKind, PieceKind, Square,
    DIAGONALS,
};
use crate::core::utils::{
    between, compact_pos, diagonal_step, distance, in_direction, unpack_pos,
};

/// Wire form of a board: one map per row, keyed by the column of each dark
/// square.
pub type BoardRows = Vec<BTreeMap<u8, Cell>>;

/** Variation of 0x88 board. Only dark squares are ever written. */
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BoardRows", try_from = "BoardRows")]
pub struct Board {
    arr: [Cell; 128],
}

/// What [`Board::execute`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    pub piece: Cell,
    pub promoted: bool,
    pub captured: Option<Cell>,
}

impl Board {
    /** Board without any pieces */
    pub fn new() -> Board {
        Board {
            arr: [Cell::Empty; 128],
        }
    }

    /// Reads a text diagram: eight lines, rank 8 first, one symbol per file.
    /// `.` is empty, `b`/`w` are men, `B`/`W` are kings. Whitespace inside a
    /// line is ignored.
    pub fn from_rows(diagram: &str) -> Result<Board, InvalidBoard> {
        let lines: Vec<&str> = diagram
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() != 8 {
            return Err(InvalidBoard(format!("expected 8 rows, got {}", lines.len())));
        }
        let mut board = Board::new();
        for (idx, line) in lines.iter().enumerate() {
            let row = 7 - idx as u8;
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != 8 {
                return Err(InvalidBoard(format!(
                    "row {} has {} squares",
                    row + 1,
                    symbols.len()
                )));
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or_else(|| {
                    InvalidBoard(format!("unknown symbol `{symbol}` in row {}", row + 1))
                })?;
                if !cell.is_empty() {
                    board
                        .place(Square::new(row, col as u8), cell)
                        .map_err(|_| {
                            InvalidBoard(format!("piece on light square in row {}", row + 1))
                        })?;
                }
            }
        }
        Ok(board)
    }

    pub fn get(&self, square: Square) -> Option<Cell> {
        square.index().map(|pos| self.arr[pos as usize])
    }

    /// Puts `cell` on a playable square, replacing what was there.
    pub fn place(&mut self, square: Square, cell: Cell) -> Result<(), IllegalMove> {
        if !square.is_playable() {
            return Err(IllegalMove::OutOfRange);
        }
        self.arr[compact_pos(square.row, square.col) as usize] = cell;
        Ok(())
    }

    #[inline]
    fn at(&self, pos: u8) -> Cell {
        self.arr[pos as usize]
    }

    pub fn iter_pieces(&self) -> impl Iterator<Item = (Square, Cell)> + '_ {
        DARK_SQUARES
            .iter()
            .map(|&pos| (Square::from_index(pos), self.at(pos)))
            .filter(|(_, cell)| !cell.is_empty())
    }

    pub fn count(&self, color: Color) -> u8 {
        self.iter_pieces()
            .filter(|(_, cell)| cell.color() == Some(color))
            .count() as u8
    }

    pub fn piece_count(&self) -> u8 {
        self.iter_pieces().count() as u8
    }

    /// Capture opportunities of the piece standing on `square`.
    ///
    /// Men look at their two forward diagonals only. Kings walk every ray:
    /// the first occupied square must be an enemy with an empty square behind
    /// it, and every empty square beyond the enemy up to the next obstacle is
    /// a landing.
    pub fn captures_for(&self, square: Square) -> Vec<Capture> {
        let mut captures = Vec::new();
        let Some(pos) = square.index() else {
            return captures;
        };
        let piece = self.at(pos);
        let (Some(color), Some(kind)) = (piece.color(), piece.kind()) else {
            return captures;
        };
        match kind {
            PieceKind::Man => {
                for &dir in color.forward() {
                    let mut ray = in_direction(pos, dir);
                    let (Some(over), Some(landing)) = (ray.next(), ray.next()) else {
                        continue;
                    };
                    if self.at(over).color() == Some(color.opposite())
                        && self.at(landing).is_empty()
                    {
                        captures.push(Capture {
                            from: square,
                            landing: Square::from_index(landing),
                            jumped: Square::from_index(over),
                        });
                    }
                }
            }
            PieceKind::King => {
                for &dir in DIAGONALS {
                    let Some(over) = in_direction(pos, dir).find(|&p| !self.at(p).is_empty())
                    else {
                        continue;
                    };
                    if self.at(over).color() != Some(color.opposite()) {
                        continue;
                    }
                    captures.extend(
                        in_direction(over, dir)
                            .take_while(|&p| self.at(p).is_empty())
                            .map(|landing| Capture {
                                from: square,
                                landing: Square::from_index(landing),
                                jumped: Square::from_index(over),
                            }),
                    );
                }
            }
        }
        captures
    }

    pub fn side_captures(&self, color: Color) -> Vec<Capture> {
        self.iter_pieces()
            .filter(|(_, cell)| cell.color() == Some(color))
            .flat_map(|(square, _)| self.captures_for(square))
            .collect()
    }

    pub fn any_capture_available(&self, color: Color) -> bool {
        self.iter_pieces()
            .filter(|(_, cell)| cell.color() == Some(color))
            .any(|(square, _)| !self.captures_for(square).is_empty())
    }

    /// Classifies a move by `turn` from `from` to `to`. Never mutates.
    pub fn evaluate(&self, turn: Color, from: Square, to: Square) -> Result<MoveKind, IllegalMove> {
        self.evaluate_in_chain(turn, from, to, None)
    }

    /// Same as [`Board::evaluate`], but while a capture chain is running only
    /// captures of `chain_piece` are acceptable.
    pub fn evaluate_in_chain(
        &self,
        turn: Color,
        from: Square,
        to: Square,
        chain_piece: Option<Square>,
    ) -> Result<MoveKind, IllegalMove> {
        if !from.is_playable() || !to.is_playable() {
            return Err(IllegalMove::OutOfRange);
        }
        let piece = self.at(compact_pos(from.row, from.col));
        match piece.color() {
            None => return Err(IllegalMove::NoPieceThere),
            Some(color) if color != turn => return Err(IllegalMove::NotYourTurn),
            Some(_) => {}
        }

        let captures = match chain_piece {
            Some(square) => self.captures_for(square),
            None => self.side_captures(turn),
        };
        if !captures.is_empty() {
            return captures
                .iter()
                .find(|capture| capture.from == from && capture.landing == to)
                .map(|capture| MoveKind::Capture {
                    jumped: capture.jumped,
                })
                .ok_or(IllegalMove::MustCapture);
        }

        let from_pos = compact_pos(from.row, from.col);
        let to_pos = compact_pos(to.row, to.col);
        let step = diagonal_step(from_pos, to_pos).ok_or(IllegalMove::InvalidDiagonal)?;
        if piece.is_king() {
            self.evaluate_king_ray(turn, from_pos, to_pos)
        } else {
            if !turn.forward().contains(&step) {
                return Err(IllegalMove::BackwardNotAllowed);
            }
            if !self.at(to_pos).is_empty() {
                return Err(IllegalMove::DestinationOccupied);
            }
            if distance(from_pos, to_pos) > 1 {
                return Err(IllegalMove::TooFar);
            }
            Ok(MoveKind::Move)
        }
    }

    fn evaluate_king_ray(&self, turn: Color, from: u8, to: u8) -> Result<MoveKind, IllegalMove> {
        if !self.at(to).is_empty() {
            return Err(IllegalMove::DestinationOccupied);
        }
        let mut enemies = Vec::new();
        for pos in between(from, to) {
            match self.at(pos).color() {
                None => {}
                Some(color) if color == turn => return Err(IllegalMove::IllegalKingMove),
                Some(_) => enemies.push(pos),
            }
        }
        match enemies.as_slice() {
            [] => Ok(MoveKind::Move),
            [jumped] => Ok(MoveKind::Capture {
                jumped: Square::from_index(*jumped),
            }),
            _ => Err(IllegalMove::MultipleEnemiesOnDiagonal),
        }
    }

    /// Every move the evaluator accepts for `turn`. Captures take precedence,
    /// and a running chain restricts the list to `chain_piece`.
    pub fn legal_moves(&self, turn: Color, chain_piece: Option<Square>) -> Vec<CandidateMove> {
        let captures = match chain_piece {
            Some(square) => self.captures_for(square),
            None => self.side_captures(turn),
        };
        if chain_piece.is_some() || !captures.is_empty() {
            return captures.into_iter().map(CandidateMove::from).collect();
        }
        let mut moves = Vec::new();
        for (square, cell) in self.iter_pieces() {
            if cell.color() != Some(turn) {
                continue;
            }
            let pos = compact_pos(square.row, square.col);
            let directions = if cell.is_king() {
                DIAGONALS
            } else {
                turn.forward()
            };
            for &dir in directions {
                let reach = if cell.is_king() { 7 } else { 1 };
                moves.extend(
                    in_direction(pos, dir)
                        .take(reach)
                        .take_while(|&p| self.at(p).is_empty())
                        .map(|p| CandidateMove {
                            from: square,
                            to: Square::from_index(p),
                            kind: MoveKind::Move,
                        }),
                );
            }
        }
        moves
    }

    /** Execute ***valid*** move. */
    pub fn execute(&mut self, from: Square, to: Square, kind: MoveKind) -> Executed {
        debug_assert!(from.is_playable() && to.is_playable());
        let from_pos = compact_pos(from.row, from.col);
        let to_pos = compact_pos(to.row, to.col);
        let piece = self.at(from_pos);
        assert!(!piece.is_empty(), "Trying to move from empty square!");
        assert!(
            self.at(to_pos).is_empty(),
            "Trying to move in busy place!"
        );
        let captured = kind.jumped().map(|jumped| {
            let pos = compact_pos(jumped.row, jumped.col);
            let target = self.at(pos);
            assert!(
                target.color() == piece.color().map(Color::opposite),
                "That's a bug! Piece captured teammate!"
            );
            self.arr[pos as usize] = Cell::Empty;
            target
        });
        let promoted = !piece.is_king()
            && piece.color().map(Color::promotion_row) == Some(to.row);
        self.arr[from_pos as usize] = Cell::Empty;
        self.arr[to_pos as usize] = if promoted { piece.crowned() } else { piece };
        trace!(
            "Executed {:?} {} -> {} (captured: {:?}, promoted: {})",
            piece,
            from,
            to,
            captured,
            promoted
        );
        Executed {
            piece,
            promoted,
            captured,
        }
    }
}

impl Default for Board {
    /** Black men on rows 0-2, white men on rows 5-7 */
    fn default() -> Self {
        let mut board = Board::new();
        for &pos in DARK_SQUARES.iter() {
            let (row, _): (u8, u8) = unpack_pos(pos);
            board.arr[pos as usize] = match row {
                0..=2 => Cell::ManBlack,
                5..=7 => Cell::ManWhite,
                _ => Cell::Empty,
            };
        }
        board
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in (0..8u8).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..8u8 {
                write!(f, "{}", self.at(compact_pos(row, col)).symbol())?;
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefgh")
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Board")?;
        Display::fmt(self, f)
    }
}

impl From<Board> for BoardRows {
    fn from(board: Board) -> Self {
        (0..8u8)
            .map(|row| {
                (0..8u8)
                    .map(|col| Square::new(row, col))
                    .filter(|square| square.is_dark())
                    .map(|square| {
                        (
                            square.col,
                            board.at(compact_pos(square.row, square.col)),
                        )
                    })
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<BoardRows> for Board {
    type Error = InvalidBoard;

    fn try_from(rows: BoardRows) -> Result<Self, Self::Error> {
        if rows.len() != 8 {
            return Err(InvalidBoard(format!("expected 8 rows, got {}", rows.len())));
        }
        let mut board = Board::new();
        for (row, cells) in rows.into_iter().enumerate() {
            for (col, cell) in cells {
                board
                    .place(Square::new(row as u8, col), cell)
                    .map_err(|_| {
                        InvalidBoard(format!("column {col} of row {row} is not playable"))
                    })?;
            }
        }
        Ok(board)
    }
}

const DARK_SQUARES: [u8; 32] = {
    let mut arr = [0; 32];
    let mut idx = 0;
    let mut row = 0;
    while row < 8 {
        let mut col = row % 2;
        while col < 8 {
            arr[idx] = (row << 4 | col) as u8;
            idx += 1;
            col += 2;
        }
        row += 1;
    }
    arr
};
