use anyhow::Context;
use clap::Parser;
use futures::{SinkExt, StreamExt};
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use checkers_engine::online_game::definitions::{ClientMessage, Encoding, ServerMessage};

/// Terminal client. Type moves as `from to`, e.g. `b6 a5`.
#[derive(Debug, Parser)]
struct Args {
    /// Room address, ws://host:8800/ws for a new room or ws://host:8800/ws/<room>
    url: Url,
    /// Use postcard binary frames instead of JSON
    #[arg(long)]
    postcard: bool,
}

fn show(message: ServerMessage) {
    match message {
        ServerMessage::RoomId(id) => println!("Room: {id}"),
        ServerMessage::GameStateSync { snapshot, you } => {
            println!("{}", snapshot.board);
            println!(
                "You play {you}, {} to move. Captured: black {}, white {}",
                snapshot.turn, snapshot.tally.black, snapshot.tally.white
            );
        }
        ServerMessage::MoveRejected { code, reason } => println!("Rejected ({code}): {reason}"),
        ServerMessage::OpponentConnected => println!("Opponent connected"),
        ServerMessage::OpponentDisconnected => println!("Opponent disconnected"),
        ServerMessage::GameFinished(end) => {
            println!("Game over: {} wins ({:?})", end.winner, end.reason)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let encoding = if args.postcard {
        Encoding::Postcard
    } else {
        Encoding::Json
    };
    let mut url = args.url;
    if args.postcard {
        url.query_pairs_mut().append_pair("format", "postcard");
    }

    let (websocket, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    let (mut write, mut read) = websocket.split();

    let input = tokio::task::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let mut tokens = line.split_whitespace();
            let (Some(from), Some(to)) = (tokens.next(), tokens.next()) else {
                println!("Expected a move like `b6 a5`");
                continue;
            };
            let message = ClientMessage::MakeMove {
                from: from.to_string(),
                to: to.to_string(),
            };
            write.send(message.encode(encoding)?).await?;
        }
        write.send(ClientMessage::Disconnect.encode(encoding)?).await?;
        anyhow::Ok(())
    });

    while let Some(frame) = read.next().await {
        let frame = frame?;
        if frame.is_close() {
            break;
        }
        match ServerMessage::try_from(frame) {
            Ok(message) => show(message),
            Err(err) => debug!("Skipped frame: {}", err),
        }
    }
    if !input.is_finished() {
        warn!("Server closed the connection");
    }
    input.abort();
    Ok(())
}
