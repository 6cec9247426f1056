use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_stream::wrappers::UnboundedReceiverStream;
use warp::filters::ws::WebSocket;

use crate::online_game::definitions::*;
use crate::online_game::rooms::RoomRegistry;
use crate::{Color, Game};

pub async fn client_connection(
    ws: WebSocket,
    rooms: RoomRegistry,
    room_name: Option<GameId>,
    encoding: Encoding,
) {
    let (client_ws_sender, mut client_ws_receiver) = ws.split();
    let (client_sender, client_rcv) = mpsc::unbounded_channel();

    let client_rcv = UnboundedReceiverStream::new(client_rcv);
    tokio::task::spawn(client_rcv.forward(client_ws_sender).map(|result| {
        if let Err(e) = result {
            error!("Failed sending websocket msg: {}", e);
        }
    }));

    // kept for replies that never reach the room, e.g. unreadable frames
    let direct = client_sender.clone();
    let seat = match room_name {
        Some(name) => match rooms.join(&name, client_sender, encoding).await {
            Ok(seat) => seat,
            Err(err) => {
                warn!("Client can't join room '{}': {}", name, err);
                return;
            }
        },
        None => rooms.create(client_sender, encoding).await,
    };

    if seat.room.send((seat.color, ClientMessage::Connected)).is_err() {
        error!("Failed to send msg to game handler! Is game ended?");
        debug!("Client id: {}, game id: {}", seat.client_id, seat.game_id);
        return;
    }

    while let Some(msg) = client_ws_receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                error!("Failed receiving message from client! Err: {}", err);
                break;
            }
        };
        if msg.is_close() {
            break;
        }
        if msg.is_ping() || msg.is_pong() {
            continue;
        }
        match ClientMessage::try_from(&msg) {
            Ok(ClientMessage::Connected) => {
                warn!("Client {} sent a reserved message", seat.client_id);
            }
            Ok(ClientMessage::Disconnect) => break,
            Ok(message) => {
                if seat.room.send((seat.color, message)).is_err() {
                    break;
                }
            }
            Err(err) => {
                error!("Failed to parse client message! Err: {}", err);
                let reply = ServerMessage::MoveRejected {
                    code: "bad_request".to_string(),
                    reason: err.to_string(),
                };
                if let Ok(reply) = reply.encode(encoding) {
                    let _ = direct.send(Ok(reply));
                }
            }
        }
    }

    let _ = seat.room.send((seat.color, ClientMessage::Disconnect));
    trace!("Client {} was disconnected...", seat.client_id);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerState {
    WaitingOpponent,
    ActiveGame,
    GameFinished,
}

/// Room task. Owns the game and serializes every move of the room.
pub(crate) async fn game_handler(
    mut receiver: UnboundedReceiver<(Color, ClientMessage)>,
    rooms: RoomRegistry,
    game_id: GameId,
    mut game: Game,
) {
    let mut current_state = ServerState::WaitingOpponent;
    while let Some((player, message)) = receiver.recv().await {
        match message {
            ClientMessage::Connected => {
                trace!("Game #{} accepted {} player connection", game_id, player);
                rooms
                    .send_to(&game_id, player, &ServerMessage::RoomId(game_id.clone()))
                    .await;
                let sync = ServerMessage::GameStateSync {
                    snapshot: game.snapshot(),
                    you: player,
                };
                rooms.send_to(&game_id, player, &sync).await;

                if let Some(end) = game.snapshot().game_over() {
                    rooms
                        .send_to(&game_id, player, &ServerMessage::GameFinished(end))
                        .await;
                } else if rooms.is_full(&game_id).await {
                    current_state = ServerState::ActiveGame;
                    rooms
                        .broadcast(&game_id, &ServerMessage::OpponentConnected)
                        .await;
                }
            }
            ClientMessage::Disconnect => {
                trace!("Game #{} {} player is disconnected!", game_id, player);
                if rooms.leave(&game_id, player).await {
                    trace!("Game #{} all players have left! Room is closed!", game_id);
                    receiver.close();
                    continue;
                }
                if current_state == ServerState::ActiveGame {
                    current_state = ServerState::WaitingOpponent;
                }
                rooms
                    .send_to(
                        &game_id,
                        player.opposite(),
                        &ServerMessage::OpponentDisconnected,
                    )
                    .await;
            }
            ClientMessage::MakeMove { from, to } => {
                let rejected = |code: &str, reason: &str| ServerMessage::MoveRejected {
                    code: code.to_string(),
                    reason: reason.to_string(),
                };
                if current_state == ServerState::WaitingOpponent {
                    info!(
                        "Game #{} received move from {} player before opponent joined",
                        game_id, player
                    );
                    let msg = rejected("waiting_for_opponent", "opponent is not connected");
                    rooms.send_to(&game_id, player, &msg).await;
                    continue;
                }
                if current_state == ServerState::ActiveGame && game.turn() != player {
                    info!(
                        "Game #{} {} player is trying to make move not in turn order!",
                        game_id, player
                    );
                    let msg = rejected("not_your_turn", "it is the opponent's turn");
                    rooms.send_to(&game_id, player, &msg).await;
                    continue;
                }
                match game.action(&from, &to) {
                    Ok(snapshot) => {
                        debug!("Game #{} {} played {} -> {}", game_id, player, from, to);
                        rooms.sync(&game_id, &snapshot).await;
                        if let Some(end) = snapshot.game_over() {
                            info!("Game #{} finished, {} wins", game_id, end.winner);
                            current_state = ServerState::GameFinished;
                            rooms
                                .broadcast(&game_id, &ServerMessage::GameFinished(end))
                                .await;
                        }
                    }
                    Err(err) => {
                        rooms
                            .send_to(&game_id, player, &ServerMessage::rejected(&err))
                            .await;
                    }
                }
            }
        }
    }
    rooms.remove(&game_id).await;
    trace!("Game #{} handler stopped", game_id);
}
