use checkers_engine::{utils::perf_test, Board, Color, Game};
use clap::Parser;

/// Counts the move tree of a position and checks it against an expected value.
#[derive(Debug, Parser)]
struct Args {
    /// Search depth in plies
    depth: usize,
    /// Expected number of leaves
    expected: u64,
    /// Position diagram file (8 lines, rank 8 first); the opening if omitted
    #[arg(long)]
    position: Option<std::path::PathBuf>,
    /// Side to move in the given position
    #[arg(long, default_value = "white")]
    turn: Color,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let game = match &args.position {
        Some(path) => {
            let diagram = std::fs::read_to_string(path)?;
            Game::with_position(Board::from_rows(&diagram)?, args.turn)
        }
        None => Game::new(),
    };
    if perf_test(&game, args.depth, args.expected, true) {
        Ok(())
    } else {
        anyhow::bail!("perft({}) doesn't match {}", args.depth, args.expected)
    }
}
