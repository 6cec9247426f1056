use warp::{reject::Rejection, reply::Reply, Filter};

use crate::online_game::definitions::*;
use crate::online_game::logic::client_connection;
use crate::online_game::rooms::RoomRegistry;

pub async fn new_room_handler(
    options: ConnectOptions,
    ws: warp::ws::Ws,
    rooms: RoomRegistry,
) -> Result<impl Reply, Rejection> {
    info!("New room requested, {:?} frames", options.format);
    Ok(ws.on_upgrade(move |ws| client_connection(ws, rooms, None, options.format)))
}

pub async fn existing_room_handler(
    room: String,
    options: ConnectOptions,
    ws: warp::ws::Ws,
    rooms: RoomRegistry,
) -> Result<impl Reply, Rejection> {
    if let Err(err) = rooms.can_join(&room).await {
        debug!("Rejected connection to room '{}': {}", room, err);
        return Err(warp::reject::not_found());
    }
    Ok(ws.on_upgrade(move |ws| client_connection(ws, rooms, Some(room), options.format)))
}

/// `/` greeting, `/ws` to open a room and `/ws/<room>` to join one.
pub fn routes(
    rooms: RoomRegistry,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let greeting = warp::path::end()
        .map(|| "Checkers server. Open a websocket on /ws or /ws/<room> to play.");

    let new_room = warp::path("ws")
        .and(warp::path::end())
        .and(warp::query::<ConnectOptions>())
        .and(warp::ws())
        .and(with(rooms.clone()))
        .and_then(new_room_handler);

    let existing_room = warp::path!("ws" / String)
        .and(warp::query::<ConnectOptions>())
        .and(warp::ws())
        .and(with(rooms))
        .and_then(existing_room_handler);

    greeting.or(existing_room).or(new_room)
}

pub fn with<T>(value: T) -> impl Filter<Extract = (T,), Error = std::convert::Infallible> + Clone
where
    T: Clone + std::marker::Send,
{
    warp::any().map(move || value.clone())
}
