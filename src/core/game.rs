use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::core::definitions::{
    CandidateMove, Color, MoveError, MoveKind, Square, PIECES_PER_SIDE,
};
use crate::core::engine::Board;
use crate::core::utils::translate;

/// Result of [`Game::action`].
pub type MoveOutcome = Result<Snapshot, MoveError>;

/// Pieces of each color removed from the board so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub black: u8,
    pub white: u8,
}

impl Tally {
    pub fn of(&self, color: Color) -> u8 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    fn add(&mut self, color: Color) {
        match color {
            Color::Black => self.black += 1,
            Color::White => self.white += 1,
        }
    }

    pub fn total(&self) -> u8 {
        self.black + self.white
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /** Every piece of the loser was captured */
    AllCaptured,
    /** The loser is to move and has no legal move */
    NoMovesLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnd {
    pub winner: Color,
    pub reason: EndReason,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    AwaitingMove,
    /// The piece on this square has jumped and must keep jumping.
    CaptureChain(Square),
    GameOver(GameEnd),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    pub captured: Option<Square>,
    pub promoted: bool,
}

/// Everything a client needs to redraw the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Board,
    pub turn: Color,
    pub tally: Tally,
    pub state: GameState,
    pub last_move: Option<AppliedMove>,
}

impl Snapshot {
    pub fn game_over(&self) -> Option<GameEnd> {
        match self.state {
            GameState::GameOver(end) => Some(end),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    turn: Color,
    tally: Tally,
    state: GameState,
    last_move: Option<AppliedMove>,
}

impl Game {
    /// Canonical setup, white to move.
    pub fn new() -> Game {
        Game::with_position(Board::default(), Color::White)
    }

    /// Starts from an arbitrary position. Tallies are derived from the
    /// pieces missing on each side.
    pub fn with_position(board: Board, turn: Color) -> Game {
        let tally = Tally {
            black: PIECES_PER_SIDE.saturating_sub(board.count(Color::Black)),
            white: PIECES_PER_SIDE.saturating_sub(board.count(Color::White)),
        };
        let mut game = Game {
            board,
            turn,
            tally,
            state: GameState::AwaitingMove,
            last_move: None,
        };
        if let Some(end) = game.settle() {
            game.state = GameState::GameOver(end);
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn last_move(&self) -> Option<AppliedMove> {
        self.last_move
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    fn chain_piece(&self) -> Option<Square> {
        match self.state {
            GameState::CaptureChain(square) => Some(square),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            turn: self.turn,
            tally: self.tally,
            state: self.state,
            last_move: self.last_move,
        }
    }

    pub fn legal_moves(&self) -> Vec<CandidateMove> {
        if self.is_over() {
            return Vec::new();
        }
        self.board.legal_moves(self.turn, self.chain_piece())
    }

    /// Validates the move without applying it.
    pub fn evaluate(&self, from: Square, to: Square) -> Result<MoveKind, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }
        Ok(self
            .board
            .evaluate_in_chain(self.turn, from, to, self.chain_piece())?)
    }

    /// The single entry point: translate, evaluate and, on success, apply.
    pub fn action(&mut self, from: &str, to: &str) -> MoveOutcome {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }
        let (from, to) = translate(from, to)?;
        self.play(from, to)
    }

    pub fn play(&mut self, from: Square, to: Square) -> MoveOutcome {
        let kind = self.evaluate(from, to).map_err(|err| {
            debug!("{} move {} -> {} rejected: {}", self.turn, from, to, err);
            err
        })?;
        Ok(self.apply(from, to, kind))
    }

    fn apply(&mut self, from: Square, to: Square, kind: MoveKind) -> Snapshot {
        let executed = self.board.execute(from, to, kind);
        if let Some(color) = executed.captured.and_then(|cell| cell.color()) {
            self.tally.add(color);
        }
        self.last_move = Some(AppliedMove {
            from,
            to,
            captured: kind.jumped(),
            promoted: executed.promoted,
        });

        // a capture chain continues with the same piece, the turn stays
        if kind.jumped().is_some() && !self.board.captures_for(to).is_empty() {
            trace!("{} continues capture chain from {}", self.turn, to);
            self.state = GameState::CaptureChain(to);
        } else {
            self.turn = self.turn.opposite();
            self.state = match self.settle() {
                Some(end) => {
                    debug!("Game over: {} wins ({:?})", end.winner, end.reason);
                    GameState::GameOver(end)
                }
                None => GameState::AwaitingMove,
            };
        }
        self.snapshot()
    }

    /// Terminal check for a position in which `self.turn` is about to move.
    fn settle(&self) -> Option<GameEnd> {
        for color in [Color::Black, Color::White] {
            if self.tally.of(color) >= PIECES_PER_SIDE || self.board.count(color) == 0 {
                return Some(GameEnd {
                    winner: color.opposite(),
                    reason: EndReason::AllCaptured,
                });
            }
        }
        if self.board.legal_moves(self.turn, None).is_empty() {
            return Some(GameEnd {
                winner: self.turn.opposite(),
                reason: EndReason::NoMovesLeft,
            });
        }
        None
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
