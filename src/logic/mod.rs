use std::{collections::VecDeque, fmt};

use chrono::{DateTime, Utc};
use minesweeper_common::models::{GameParams, GameState};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    clock::{Clock, SystemClock},
    data::Field,
    error::FieldError,
};

mod chord;
mod generator;
mod lifecycle;
mod reveal;
mod view;

pub use reveal::CELLS_TO_OPEN_PER_TICK;

/// One game session: the grid, its counters and the pending reveal cascade.
///
/// Player input goes through [`Minesweeper::open_cell`] and
/// [`Minesweeper::mark_cell`]; a frame loop calls [`Minesweeper::update`] once
/// per tick to drain the cascade those actions seed.
pub struct Minesweeper<R = StdRng> {
    pub(crate) field: Field,
    pub(crate) marked_mines_count: usize,
    pub(crate) closed_cells_count: usize,
    pub(crate) cells_to_open: usize,
    pub(crate) start_time: Option<DateTime<Utc>>,
    pub(crate) end_time: Option<DateTime<Utc>>,
    pub(crate) game_state: GameState,
    pub(crate) is_first_click: bool,
    pub(crate) reveal_worklist: VecDeque<usize>,
    pub(crate) rng: R,
    pub(crate) clock: Box<dyn Clock>,
}

impl Minesweeper<StdRng> {
    pub fn new(params: GameParams) -> Self {
        Self::with_rng(params, StdRng::from_os_rng())
    }
}

impl<R: rand::Rng> Minesweeper<R> {
    pub fn with_rng(params: GameParams, rng: R) -> Self {
        let mut engine = Self {
            field: Field::empty(0, 0, 0),
            marked_mines_count: 0,
            closed_cells_count: 0,
            cells_to_open: 0,
            start_time: None,
            end_time: None,
            game_state: GameState::Playing,
            is_first_click: true,
            reveal_worklist: VecDeque::new(),
            rng,
            clock: Box::new(SystemClock),
        };
        engine.generate_field(params.cols, params.rows, params.mines);
        engine
    }
}

impl<R> Minesweeper<R> {
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn cell_exists(&self, col: usize, row: usize) -> bool {
        self.field.contains(col, row)
    }

    pub fn is_cell_opened(&self, col: usize, row: usize) -> Result<bool, FieldError> {
        Ok(self.field.cells[self.field.index(col, row)?].is_opened())
    }

    pub fn is_cell_closed(&self, col: usize, row: usize) -> Result<bool, FieldError> {
        Ok(self.field.cells[self.field.index(col, row)?].is_closed())
    }

    pub fn is_cell_marked(&self, col: usize, row: usize) -> Result<bool, FieldError> {
        Ok(self.field.cells[self.field.index(col, row)?].is_marked())
    }

    pub fn cell_has_mine(&self, col: usize, row: usize) -> Result<bool, FieldError> {
        Ok(self.field.mine_map[self.field.index(col, row)?])
    }

    /// Mines among the up to 8 neighbors, or 9 on a board made only of mines.
    pub fn cell_mines_count(&self, col: usize, row: usize) -> Result<u8, FieldError> {
        Ok(self.field.cells[self.field.index(col, row)?].mines_around())
    }

    pub fn cols(&self) -> usize {
        self.field.cols
    }

    pub fn rows(&self) -> usize {
        self.field.rows
    }

    pub fn mines(&self) -> usize {
        self.field.mines
    }

    pub fn field_size(&self) -> usize {
        self.field.size()
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn is_first_click(&self) -> bool {
        self.is_first_click
    }

    /// True while a reveal cascade is still queued. Open and mark requests are
    /// ignored until it drains.
    pub fn is_busy(&self) -> bool {
        !self.reveal_worklist.is_empty()
    }

    pub fn marked_mines_count(&self) -> usize {
        self.marked_mines_count
    }

    pub fn closed_cells_count(&self) -> usize {
        self.closed_cells_count
    }

    pub fn opened_cells_count(&self) -> usize {
        self.field.size() - self.closed_cells_count
    }

    pub fn cells_to_open(&self) -> usize {
        self.cells_to_open
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn pending_reveals(&self) -> usize {
        self.reveal_worklist.len()
    }

    /// Opens the cell at `index` if still closed, keeping the closed counter in sync.
    fn open_index(&mut self, index: usize) -> bool {
        let cell = &mut self.field.cells[index];
        if cell.is_opened() {
            return false;
        }
        cell.open();
        self.closed_cells_count -= 1;
        true
    }
}

impl<R> fmt::Debug for Minesweeper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Minesweeper")
            .field("cols", &self.field.cols)
            .field("rows", &self.field.rows)
            .field("mines", &self.field.mines)
            .field("game_state", &self.game_state)
            .field("closed_cells_count", &self.closed_cells_count)
            .field("marked_mines_count", &self.marked_mines_count)
            .field("pending_reveals", &self.reveal_worklist.len())
            .finish_non_exhaustive()
    }
}

/// Mine layout, `@` for a mine and `#` otherwise, one line per row.
impl<R> fmt::Display for Minesweeper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.field.rows {
            for col in 0..self.field.cols {
                let mine = self.field.mine_map[col + row * self.field.cols];
                f.write_str(if mine { "@" } else { "#" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
