pub mod core;
#[cfg(feature = "network")]
pub mod online_game;
pub mod utils;

// module re-exports
pub use core::definitions::{
    CandidateMove, Capture, Cell, Color, IllegalMove, MoveError, MoveKind, ParseError, PieceKind,
    Square,
};
pub use core::engine::Board;
pub use core::game::{AppliedMove, EndReason, Game, GameEnd, GameState, MoveOutcome, Snapshot, Tally};
pub use core::utils::translate;

#[cfg(test)]
mod tests;
