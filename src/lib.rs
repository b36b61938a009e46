//! Minesweeper simulation engine.
//!
//! A [`Minesweeper`] value owns one game session: mine placement with a safe
//! first click, a flood-fill reveal that is spread over frames, chording on
//! opened cells, and win/lose tracking with timing.
//!
//! ```
//! use minesweeper_engine::{GameParams, GameState, Minesweeper};
//!
//! let mut game = Minesweeper::new(GameParams { cols: 9, rows: 9, mines: 10 });
//! game.open_cell(4, 4)?;
//! while game.is_busy() {
//!     game.update();
//! }
//! assert!(game.is_cell_opened(4, 4)?);
//! assert_ne!(game.game_state(), GameState::GameOver);
//! # Ok::<(), minesweeper_engine::FieldError>(())
//! ```

pub mod clock;
pub mod data;
pub mod error;
pub mod logic;
pub mod save;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::FieldError;
pub use logic::{CELLS_TO_OPEN_PER_TICK, Minesweeper};
pub use minesweeper_common::models::{CellView, GameParams, GameState};
pub use save::SavedField;
