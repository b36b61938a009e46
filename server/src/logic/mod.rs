use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rocket::futures::{SinkExt, future::join_all, stream::SplitSink};
use rocket_ws::{Message, stream::DuplexStream};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use minesweeper_common::{
    models::{CellView, GameParams, GameState, Pos},
    protocol::{CellUpdate, ServerMessage},
};
use minesweeper_engine::{FieldError, Minesweeper, SavedField};

pub type Games = Arc<DashMap<String, Arc<Mutex<Game>>>>;

const MAX_SIDE: usize = 1000;

/// One hosted game: the engine plus every websocket watching it.
pub struct Game {
    engine: Minesweeper,
    streams: HashMap<Uuid, SplitSink<DuplexStream, Message>>,
    shown: Vec<CellView>,
    shown_state: GameState,
    last_activity: Instant,
}

fn validate_params(params: GameParams) -> GameParams {
    GameParams {
        cols: params.cols.clamp(1, MAX_SIDE),
        rows: params.rows.clamp(1, MAX_SIDE),
        mines: params.mines,
    }
}

async fn send(stream: &mut SplitSink<DuplexStream, Message>, message: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(message) {
        let _ = stream.send(Message::Text(text)).await;
    }
}

async fn broadcast(
    streams: &mut HashMap<Uuid, SplitSink<DuplexStream, Message>>,
    message: &ServerMessage,
) {
    let futures: Vec<_> = streams
        .values_mut()
        .map(|stream| send(stream, message))
        .collect();

    join_all(futures).await;
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams) -> Self {
        let params = validate_params(params);
        info!(
            "Creating new game: {}x{} with {} mines",
            params.cols, params.rows, params.mines
        );
        let engine = Minesweeper::new(params);
        Self {
            shown: engine.field_view(),
            shown_state: engine.game_state(),
            engine,
            streams: HashMap::new(),
            last_activity: Instant::now(),
        }
    }

    fn init_message(&self) -> ServerMessage {
        ServerMessage::Init {
            cols: self.engine.cols(),
            rows: self.engine.rows(),
            mines: self.engine.mines(),
            state: self.engine.game_state(),
            remaining_mines: self.engine.closed_and_not_marked_mines_count(),
            seconds: self.engine.seconds_from_start(),
            field: self
                .shown
                .chunks(self.engine.cols())
                .map(|chunk| chunk.to_vec())
                .collect(),
        }
    }

    /// Sends whatever cells changed since the last broadcast.
    async fn sync(&mut self) {
        let current = self.engine.field_view();
        let cols = self.engine.cols();
        let updates: Vec<CellUpdate> = current
            .iter()
            .zip(&self.shown)
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(|(index, (now, _))| CellUpdate {
                pos: Pos {
                    x: index % cols,
                    y: index / cols,
                },
                value: *now,
            })
            .collect();

        let state = self.engine.game_state();
        if updates.is_empty() && state == self.shown_state {
            return;
        }

        debug!("Broadcasting {} cell updates", updates.len());
        self.shown = current;
        self.shown_state = state;
        let message = ServerMessage::Update {
            updates,
            state,
            remaining_mines: self.engine.closed_and_not_marked_mines_count(),
            seconds: self.engine.seconds_from_start(),
            busy: self.engine.is_busy(),
        };
        broadcast(&mut self.streams, &message).await;
    }

    async fn reset_view(&mut self) {
        self.shown = self.engine.field_view();
        self.shown_state = self.engine.game_state();
        let message = self.init_message();
        broadcast(&mut self.streams, &message).await;
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn restart(&mut self, params: GameParams) {
        let params = validate_params(params);
        self.engine.generate_field(params.cols, params.rows, params.mines);
        self.last_activity = Instant::now();
        self.reset_view().await;
        info!(
            "Game restarted and broadcasted to {} connections",
            self.streams.len()
        );
    }

    #[instrument(level = "trace", skip(self, stream))]
    pub async fn add_stream(&mut self, mut stream: SplitSink<DuplexStream, Message>) -> Uuid {
        let id = Uuid::new_v4();
        debug!("Adding stream {} to game", id);
        send(&mut stream, &self.init_message()).await;
        self.streams.insert(id, stream);
        self.last_activity = Instant::now();
        info!(
            "Stream {} added, total connections: {}",
            id,
            self.streams.len()
        );
        id
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn remove_stream(&mut self, id: &Uuid) {
        if self.streams.remove(id).is_some() {
            info!(
                "Stream {} removed, remaining connections: {}",
                id,
                self.streams.len()
            );
        } else {
            warn!("Attempted to remove non-existent stream: {}", id);
        }
        self.last_activity = Instant::now()
    }

    pub fn has_active_connections(&self) -> bool {
        !self.streams.is_empty()
    }

    pub fn should_cleanup(&self, inactive_timeout: Duration) -> bool {
        !self.has_active_connections() && self.last_activity.elapsed() > inactive_timeout
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn open(&mut self, pos: Pos) {
        if !self.engine.cell_exists(pos.x, pos.y) {
            warn!("Invalid open position: ({}, {})", pos.x, pos.y);
            return;
        }

        self.last_activity = Instant::now();
        if let Err(error) = self.engine.open_cell(pos.x, pos.y) {
            warn!("Open at ({}, {}) failed: {}", pos.x, pos.y, error);
            return;
        }
        self.sync().await;
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn mark(&mut self, pos: Pos) {
        if !self.engine.cell_exists(pos.x, pos.y) {
            warn!("Invalid mark position: ({}, {})", pos.x, pos.y);
            return;
        }

        self.last_activity = Instant::now();
        if let Err(error) = self.engine.mark_cell(pos.x, pos.y) {
            warn!("Mark at ({}, {}) failed: {}", pos.x, pos.y, error);
            return;
        }
        self.sync().await;
    }

    /// Advances the engine by one frame and broadcasts what it revealed.
    pub async fn tick(&mut self) {
        if !self.engine.is_playing() {
            return;
        }

        let opened = self.engine.update();
        if opened > 0 || self.engine.game_state() != self.shown_state {
            self.sync().await;
        }
    }

    pub fn save(&self) -> SavedField {
        self.engine.save()
    }

    #[instrument(level = "trace", skip_all)]
    pub async fn load(&mut self, saved: SavedField) -> Result<(), FieldError> {
        self.engine.load(saved)?;
        self.last_activity = Instant::now();
        self.reset_view().await;
        info!(
            "Game loaded and broadcasted to {} connections",
            self.streams.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_clamped_to_a_drawable_field() {
        let params = validate_params(GameParams {
            cols: 0,
            rows: 5000,
            mines: 3,
        });
        assert_eq!(
            params,
            GameParams {
                cols: 1,
                rows: MAX_SIDE,
                mines: 3
            }
        );
    }

    #[test]
    fn new_game_shows_a_closed_field() {
        let game = Game::new(GameParams::default());
        assert_eq!(game.shown.len(), 81);
        assert!(game.shown.iter().all(|view| *view == CellView::Closed));
        assert!(!game.has_active_connections());
        assert!(!game.should_cleanup(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn ticks_reveal_cells_queued_by_an_open() {
        let mut game = Game::new(GameParams {
            cols: 20,
            rows: 20,
            mines: 0,
        });
        game.open(Pos { x: 3, y: 3 }).await;
        assert!(game.engine.is_busy());

        while game.engine.is_busy() {
            game.tick().await;
        }

        assert_eq!(game.engine.game_state(), GameState::Win);
        assert_eq!(game.shown_state, GameState::Win);
        assert!(
            game.shown
                .iter()
                .all(|view| *view == CellView::Opened { adjacent: 0 })
        );
    }

    #[tokio::test]
    async fn out_of_field_input_is_ignored() {
        let mut game = Game::new(GameParams::default());
        game.open(Pos { x: 9, y: 0 }).await;
        game.mark(Pos { x: 0, y: 40 }).await;
        assert!(game.engine.start_time().is_none());
        assert!(!game.engine.is_busy());
    }
}
