use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use warp::filters::ws::Message;

use crate::core::game::{GameEnd, Snapshot};
use crate::{Color, MoveError};

pub use uuid::Uuid;

#[allow(unused_imports)]
pub use log::{debug, error, info, trace, warn};

pub type GameId = String;

pub type ClientSender = UnboundedSender<Result<Message, warp::Error>>;

/// Frame format chosen by a client when it connects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// JSON in text frames
    #[default]
    Json,
    /// postcard in binary frames
    Postcard,
}

/// Query string of the websocket routes, e.g. `/ws?format=postcard`.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ConnectOptions {
    #[serde(default)]
    pub format: Encoding,
}

pub struct Client {
    pub id: Uuid,
    pub sender: ClientSender,
    pub color: Color,
    pub encoding: Encoding,
}

pub struct OnlineGame {
    pub id: GameId,
    pub sender: UnboundedSender<(Color, ClientMessage)>,
    pub white: Option<Client>,
    pub black: Option<Client>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    RoomId(GameId),
    GameStateSync { snapshot: Snapshot, you: Color },
    MoveRejected { code: String, reason: String },
    OpponentConnected,
    OpponentDisconnected,
    GameFinished(GameEnd),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Sent by the connection task once the client has a seat.
    Connected,
    Disconnect,
    MakeMove { from: String, to: String },
}

/// Plain `{"from": "b6", "to": "a5"}` object accepted in JSON frames.
#[derive(Deserialize)]
struct MoveRequest {
    from: String,
    to: String,
}

impl OnlineGame {
    pub fn get_player(&self, player: Color) -> Option<&Client> {
        match player {
            Color::Black => self.black.as_ref(),
            Color::White => self.white.as_ref(),
        }
    }

    pub fn get_player_mut(&mut self, player: Color) -> &mut Option<Client> {
        match player {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    /** White seat is handed out first */
    pub fn free_color(&self) -> Option<Color> {
        if self.white.is_none() {
            Some(Color::White)
        } else if self.black.is_none() {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_full(&self) -> bool {
        self.white.is_some() && self.black.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.white.is_none() && self.black.is_none()
    }
}

impl ServerMessage {
    pub fn rejected(err: &MoveError) -> Self {
        ServerMessage::MoveRejected {
            code: err.code().to_string(),
            reason: err.to_string(),
        }
    }

    pub fn encode(&self, encoding: Encoding) -> Result<Message, ParsingMessageError> {
        Ok(match encoding {
            Encoding::Json => Message::text(serde_json::to_string(self)?),
            Encoding::Postcard => Message::binary(to_allocvec(self)?),
        })
    }
}

impl ClientMessage {
    pub fn encode(&self, encoding: Encoding) -> Result<tungstenite::Message, ParsingMessageError> {
        Ok(match encoding {
            Encoding::Json => tungstenite::Message::text(serde_json::to_string(self)?),
            Encoding::Postcard => tungstenite::Message::binary(to_allocvec(self)?),
        })
    }

    fn from_json(text: &str) -> Result<Self, ParsingMessageError> {
        match serde_json::from_str(text) {
            Ok(message) => Ok(message),
            Err(err) => match serde_json::from_str::<MoveRequest>(text) {
                Ok(MoveRequest { from, to }) => Ok(ClientMessage::MakeMove { from, to }),
                Err(_) => Err(err.into()),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ParsingMessageError {
    #[error("frame carries no data")]
    NonDataError,
    #[error("json: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("postcard: {0}")]
    PostcardError(#[from] postcard::Error),
}

impl TryFrom<tungstenite::Message> for ServerMessage {
    type Error = ParsingMessageError;
    fn try_from(value: tungstenite::Message) -> Result<Self, Self::Error> {
        match value {
            tungstenite::Message::Text(text) => Ok(serde_json::from_str(&text)?),
            tungstenite::Message::Binary(data) => Ok(from_bytes(&data)?),
            _ => Err(ParsingMessageError::NonDataError),
        }
    }
}

impl TryFrom<&warp::ws::Message> for ClientMessage {
    type Error = ParsingMessageError;
    fn try_from(value: &warp::ws::Message) -> Result<Self, Self::Error> {
        if let Ok(text) = value.to_str() {
            ClientMessage::from_json(text)
        } else if value.is_binary() {
            Ok(from_bytes(value.as_bytes())?)
        } else {
            Err(ParsingMessageError::NonDataError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Game;

    #[test]
    fn bare_move_object_is_accepted() {
        let message = ClientMessage::try_from(&Message::text(r#"{"from":"b6","to":"a5"}"#)).unwrap();
        assert_eq!(
            message,
            ClientMessage::MakeMove {
                from: "b6".into(),
                to: "a5".into()
            }
        );
        let tagged = ClientMessage::try_from(&Message::text(
            r#"{"MakeMove":{"from":"c3","to":"d4"}}"#,
        ))
        .unwrap();
        assert!(matches!(tagged, ClientMessage::MakeMove { .. }));
        assert!(ClientMessage::try_from(&Message::text("Bad request")).is_err());
    }

    #[test]
    fn postcard_frames() {
        let message = ClientMessage::MakeMove {
            from: "c3".into(),
            to: "d4".into(),
        };
        let frame = Message::binary(to_allocvec(&message).unwrap());
        assert_eq!(ClientMessage::try_from(&frame).unwrap(), message);

        let sync = ServerMessage::GameStateSync {
            snapshot: Game::new().snapshot(),
            you: Color::Black,
        };
        let bytes = to_allocvec(&sync).unwrap();
        let back = ServerMessage::try_from(tungstenite::Message::binary(bytes)).unwrap();
        assert_eq!(back, sync);
    }

    #[test]
    fn rejection_carries_code() {
        let rejected = ServerMessage::rejected(&MoveError::GameAlreadyOver);
        assert_eq!(
            rejected,
            ServerMessage::MoveRejected {
                code: "game_already_over".into(),
                reason: "game is already over".into(),
            }
        );
    }
}
