use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use checkers_engine::online_game::{routes, RoomRegistry};
use checkers_engine::{Board, Color, Game};

/// Hosts checkers rooms over websockets.
#[derive(Debug, Parser)]
struct Config {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    /// Port to listen on
    #[arg(long, short, default_value_t = 8800)]
    port: u16,
    /// Position diagram every room starts from (8 lines, rank 8 first)
    #[arg(long)]
    position: Option<PathBuf>,
    /// Side to move in the given position
    #[arg(long, default_value = "white")]
    turn: Color,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    let rooms = match &config.position {
        Some(path) => {
            let diagram = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let board = Board::from_rows(&diagram)?;
            info!("Rooms start from {}, {} to move", path.display(), config.turn);
            RoomRegistry::with_opening(Game::with_position(board, config.turn))
        }
        None => RoomRegistry::default(),
    };

    let address = SocketAddr::new(config.host, config.port);
    info!("Checkers server listening on {}", address);
    warp::serve(routes(rooms)).run(address).await;
    Ok(())
}
