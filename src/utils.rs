use std::fmt::Display;
use std::ops::AddAssign;

use crate::core::game::Game;
use crate::core::game::GameState;

/// Leaf counts of a move tree. Every jump of a capture chain is a ply.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PERFResult {
    pub all: u64,
    pub captures: u64,
    pub promotions: u64,
    pub game_ends: u64,
}

impl AddAssign for PERFResult {
    fn add_assign(&mut self, rhs: Self) {
        self.all += rhs.all;
        self.captures += rhs.captures;
        self.promotions += rhs.promotions;
        self.game_ends += rhs.game_ends;
    }
}

impl Display for PERFResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "all: {} captures: {} promotions: {} game ends: {}",
            self.all, self.captures, self.promotions, self.game_ends
        )
    }
}

pub fn perft(game: &Game, depth: usize) -> PERFResult {
    let mut result = PERFResult::default();
    for candidate in game.legal_moves() {
        let mut next = game.clone();
        let snapshot = match next.play(candidate.from, candidate.to) {
            Ok(snapshot) => snapshot,
            Err(err) => panic!("Generated move {candidate} was rejected: {err}"),
        };
        if depth <= 1 {
            result.all += 1;
            if let Some(applied) = snapshot.last_move {
                result.captures += applied.captured.is_some() as u64;
                result.promotions += applied.promoted as u64;
            }
            result.game_ends += matches!(snapshot.state, GameState::GameOver(_)) as u64;
        } else {
            result += perft(&next, depth - 1);
        }
    }
    result
}

/// Runs perft from `game`, optionally printing the count below every root
/// move, and compares the total with `expected`.
pub fn perf_test(game: &Game, depth: usize, expected: u64, detailed: bool) -> bool {
    if depth == 0 {
        return expected == 1;
    }
    if detailed {
        let mut total = PERFResult::default();
        for candidate in game.legal_moves() {
            let mut next = game.clone();
            if next.play(candidate.from, candidate.to).is_err() {
                return false;
            }
            let result = if depth > 1 {
                perft(&next, depth - 1)
            } else {
                PERFResult {
                    all: 1,
                    ..Default::default()
                }
            };
            println!(" {candidate} : {}", result.all);
            total += result;
        }
        println!("+ total: {}", total.all);
        total.all == expected
    } else {
        perft(game, depth).all == expected
    }
}
