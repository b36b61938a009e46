use std::sync::Arc;

use dashmap::Entry;
use nanoid::nanoid;
use rocket::{State, futures::StreamExt, get, http::Status, post, serde::json::Json};
use rocket_ws::{Channel, Message, WebSocket};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use minesweeper_common::{
    models::{CreateResponse, GameParams},
    protocol::ClientMessage,
};
use minesweeper_engine::SavedField;

use crate::logic::{Game, Games};

#[instrument(level = "trace", skip(games, game))]
fn add_game(games: &Games, game: Game) -> String {
    let mut id_length = 5;
    let max_attempts_per_length = 10;

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match games.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Game ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(game)));
                    info!("Created new game with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

fn find_game(games: &Games, id: &str) -> Result<Arc<Mutex<Game>>, Status> {
    match games.get(id) {
        Some(game) => Ok(game.value().clone()),
        None => {
            warn!("Request for non-existent game: {}", id);
            Err(Status::NotFound)
        }
    }
}

#[post("/create", data = "<params>")]
#[instrument(level = "trace", skip(games), fields(cols = params.cols, rows = params.rows, mines = params.mines))]
pub fn create_game(params: Json<GameParams>, games: &State<Games>) -> Json<CreateResponse> {
    let id = add_game(games, Game::new(params.into_inner()));
    Json(CreateResponse { id })
}

#[get("/games/<id>/save")]
#[instrument(level = "trace", skip(games))]
pub async fn save_game(id: &str, games: &State<Games>) -> Result<Json<SavedField>, Status> {
    let game = find_game(games, id)?;
    let game = game.lock().await;
    debug!("Saving game {}", id);
    Ok(Json(game.save()))
}

#[post("/games/<id>/load", data = "<saved>")]
#[instrument(level = "trace", skip(games, saved))]
pub async fn load_game(id: &str, saved: Json<SavedField>, games: &State<Games>) -> Status {
    let game = match find_game(games, id) {
        Ok(game) => game,
        Err(status) => return status,
    };
    let mut game = game.lock().await;

    match game.load(saved.into_inner()).await {
        Ok(()) => Status::NoContent,
        Err(error) => {
            warn!("Rejected saved field for game {}: {}", id, error);
            Status::UnprocessableEntity
        }
    }
}

#[get("/ws?<id>")]
#[instrument(level = "trace", skip(ws, games), fields(game_id = %id))]
pub fn websocket_handler(
    ws: WebSocket,
    games: &State<Games>,
    id: String,
) -> Result<Channel<'static>, Status> {
    let game = find_game(games, &id)?;
    info!("WebSocket connection established for game: {}", id);

    Ok(ws.channel(move |stream| {
        let game_id = id.clone();
        Box::pin(async move {
            let (write, mut read) = stream.split();

            let stream_id = {
                let mut game = game.lock().await;
                game.add_stream(write).await
            };

            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            debug!("Received message from game {}: {:?}", game_id, message);
                            let mut game = game.lock().await;
                            match message {
                                ClientMessage::Open { pos } => game.open(pos).await,
                                ClientMessage::Mark { pos } => game.mark(pos).await,
                                ClientMessage::Generate { params } => {
                                    info!(
                                        "Player regenerating game {}: {}x{} with {} mines",
                                        game_id, params.cols, params.rows, params.mines
                                    );
                                    game.restart(params).await;
                                }
                            }
                        }
                        Err(e) => {
                            warn!(
                                "Invalid message format in game {}: {} - Error: {}",
                                game_id, text, e
                            );
                        }
                    },
                    Ok(Message::Close(_)) => {
                        info!(
                            "WebSocket connection closed for game {} (stream: {})",
                            game_id, stream_id
                        );
                        break;
                    }
                    Err(e) => {
                        error!(
                            "WebSocket error in game {} (stream: {}): {}",
                            game_id, stream_id, e
                        );
                        break;
                    }
                    _ => {
                        debug!("Received non-text message in game {}, ignoring", game_id);
                    }
                }
            }

            {
                let mut game = game.lock().await;
                game.remove_stream(&stream_id).await;
            }

            info!(
                "Client disconnected from game {} (stream: {})",
                game_id, stream_id
            );
            Ok(())
        })
    }))
}
