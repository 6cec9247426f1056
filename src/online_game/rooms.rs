use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tokio::sync::{
    mpsc::{self, UnboundedSender},
    RwLock,
};

use crate::online_game::definitions::*;
use crate::online_game::logic::game_handler;
use crate::{Color, Game};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("no such room")]
    UnknownRoom,
    #[error("room already has two players")]
    RoomFull,
}

/// Seat handed to a connection after it entered a room.
pub struct Seat {
    pub game_id: GameId,
    pub client_id: Uuid,
    pub color: Color,
    pub room: UnboundedSender<(Color, ClientMessage)>,
}

/// Every open room by id. Cloning shares the same map.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<GameId, OnlineGame>>>,
    opening: Game,
}

impl RoomRegistry {
    /// Registry whose rooms start from `opening` instead of the canonical setup.
    pub fn with_opening(opening: Game) -> RoomRegistry {
        RoomRegistry {
            rooms: Default::default(),
            opening,
        }
    }

    /// Opens a room with the caller seated as white and starts its game task.
    pub async fn create(&self, sender: ClientSender, encoding: Encoding) -> Seat {
        let game_id = Uuid::new_v4().to_string();
        let client_id = Uuid::new_v4();
        let (room, receiver) = mpsc::unbounded_channel();
        let game = OnlineGame {
            id: game_id.clone(),
            sender: room.clone(),
            white: Some(Client {
                id: client_id,
                sender,
                color: Color::White,
                encoding,
            }),
            black: None,
        };
        self.rooms.write().await.insert(game_id.clone(), game);
        trace!("Created new room '{}' for new client {}", game_id, client_id);
        tokio::task::spawn(game_handler(
            receiver,
            self.clone(),
            game_id.clone(),
            self.opening.clone(),
        ));
        Seat {
            game_id,
            client_id,
            color: Color::White,
            room,
        }
    }

    pub async fn join(
        &self,
        game_id: &str,
        sender: ClientSender,
        encoding: Encoding,
    ) -> Result<Seat, JoinError> {
        let mut rooms = self.rooms.write().await;
        let game = rooms.get_mut(game_id).ok_or(JoinError::UnknownRoom)?;
        let color = game.free_color().ok_or(JoinError::RoomFull)?;
        let client_id = Uuid::new_v4();
        *game.get_player_mut(color) = Some(Client {
            id: client_id,
            sender,
            color,
            encoding,
        });
        trace!("Added new client {} to '{}' room as {}", client_id, game_id, color);
        Ok(Seat {
            game_id: game.id.clone(),
            client_id,
            color,
            room: game.sender.clone(),
        })
    }

    pub async fn can_join(&self, game_id: &str) -> Result<(), JoinError> {
        match self.rooms.read().await.get(game_id) {
            None => Err(JoinError::UnknownRoom),
            Some(game) if game.is_full() => Err(JoinError::RoomFull),
            Some(_) => Ok(()),
        }
    }

    /// Frees the seat. Returns `true` once the room is gone.
    pub async fn leave(&self, game_id: &str, color: Color) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(game) = rooms.get_mut(game_id) else {
            return true;
        };
        if let Some(client) = game.get_player_mut(color).take() {
            trace!("Client {} left room '{}'", client.id, game_id);
        }
        if game.is_empty() {
            rooms.remove(game_id);
            trace!("Deleted empty room '{}'", game_id);
            true
        } else {
            false
        }
    }

    pub async fn remove(&self, game_id: &str) {
        if self.rooms.write().await.remove(game_id).is_some() {
            trace!("Deleted room '{}'", game_id);
        }
    }

    pub async fn is_full(&self, game_id: &str) -> bool {
        self.rooms
            .read()
            .await
            .get(game_id)
            .is_some_and(OnlineGame::is_full)
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    pub async fn send_to(&self, game_id: &str, player: Color, msg: &ServerMessage) {
        if let Some(room) = self.rooms.read().await.get(game_id) {
            if let Some(client) = room.get_player(player) {
                send_message(client, msg);
            }
        }
    }

    pub async fn broadcast(&self, game_id: &str, msg: &ServerMessage) {
        if let Some(room) = self.rooms.read().await.get(game_id) {
            for client in [&room.white, &room.black].into_iter().flatten() {
                send_message(client, msg);
            }
        }
    }

    /// Per-seat state sync, each client learns its own color.
    pub async fn sync(&self, game_id: &str, snapshot: &crate::Snapshot) {
        if let Some(room) = self.rooms.read().await.get(game_id) {
            for client in [&room.white, &room.black].into_iter().flatten() {
                send_message(
                    client,
                    &ServerMessage::GameStateSync {
                        snapshot: snapshot.clone(),
                        you: client.color,
                    },
                );
            }
        }
    }
}

fn send_message(client: &Client, msg: &ServerMessage) {
    match msg.encode(client.encoding) {
        Ok(message) => {
            let _ = client.sender.send(Ok(message));
        }
        Err(err) => error!("Failed to encode message for client {}: {}", client.id, err),
    }
}
