use crate::core::definitions::{ParseError, Square};

const FILES: &[u8] = b"abcdefgh";
const RANKS: &[u8] = b"12345678";

/// Walks from `from` towards `to` along a diagonal, yielding the squares
/// strictly between them.
#[derive(Debug)]
pub struct BetweenIterator {
    current: u8,
    target: u8,
    step: u8,
}

impl Iterator for BetweenIterator {
    type Item = u8;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.current = self.current.wrapping_add(self.step);
        if self.current == self.target || !is_valid_coord(self.current) {
            None
        } else {
            Some(self.current)
        }
    }
}

/// Squares strictly between `from` and `to`. Empty when the two squares
/// don't share a diagonal, see [`diagonal_step`].
pub fn between(from: u8, to: u8) -> BetweenIterator {
    match diagonal_step(from, to) {
        Some(step) => BetweenIterator {
            current: from,
            target: to,
            step,
        },
        None => BetweenIterator {
            current: to,
            target: to,
            step: 0,
        },
    }
}

pub struct DirectionIterator {
    position: u8,
    direction: u8,
}

impl Iterator for DirectionIterator {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.position = self.position.wrapping_add(self.direction);
        if is_valid_coord(self.position) {
            Some(self.position)
        } else {
            None
        }
    }
}

/// Every square from `position` (exclusive) to the edge of the board.
pub fn in_direction(position: u8, direction: u8) -> DirectionIterator {
    DirectionIterator {
        position,
        direction,
    }
}

/// 0x88 step leading from `from` to `to`, or `None` when the two squares
/// don't share a diagonal (or are the same square).
pub fn diagonal_step(from: u8, to: u8) -> Option<u8> {
    let (from_row, from_col): (u8, u8) = unpack_pos(from);
    let (to_row, to_col): (u8, u8) = unpack_pos(to);
    if from == to || from_row.abs_diff(to_row) != from_col.abs_diff(to_col) {
        return None;
    }
    Some(match (to_row > from_row, to_col > from_col) {
        (true, true) => 0x11,
        (true, false) => 0x0f,
        (false, false) => 0xef,
        (false, true) => 0xf1,
    })
}

pub fn distance(from: u8, to: u8) -> u8 {
    let (from_row, _): (u8, u8) = unpack_pos(from);
    let (to_row, _): (u8, u8) = unpack_pos(to);
    from_row.abs_diff(to_row)
}

#[inline]
pub fn is_valid_coord(coord: u8) -> bool {
    coord & 0x88 == 0x00
}

#[inline]
pub fn compact_pos(row: u8, col: u8) -> u8 {
    row << 4 | col
}

#[inline]
pub fn unpack_pos<T: From<u8>, V: Into<u8>>(pos: V) -> (T, T) {
    let pos: u8 = pos.into();
    (((pos & 0xf0) >> 4).into(), (pos & 0x0f).into())
}

/// Parses one algebraic token such as `"c3"`.
///
/// Exactly two characters are accepted: a file `a`-`h` then a rank `1`-`8`.
/// Every other input fails with the same [`ParseError`].
pub fn parse_square(token: &str) -> Result<Square, ParseError> {
    let error = || ParseError {
        token: token.to_string(),
    };
    match token.as_bytes() {
        [file, rank] => {
            let col = FILES.iter().position(|f| f == file).ok_or_else(error)?;
            let row = RANKS.iter().position(|r| r == rank).ok_or_else(error)?;
            Ok(Square::new(row as u8, col as u8))
        }
        _ => Err(error()),
    }
}

/// Translates a move request from notation into board squares.
pub fn translate(from: &str, to: &str) -> Result<(Square, Square), ParseError> {
    Ok((parse_square(from)?, parse_square(to)?))
}
