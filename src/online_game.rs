//! Websocket room server. Two clients share one room and the room task
//! owns the [`Game`](crate::Game) they play.

pub mod definitions;
pub mod handlers;
pub mod logic;
pub mod rooms;

pub use handlers::routes;
pub use rooms::RoomRegistry;
