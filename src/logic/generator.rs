use std::cmp::min;

use minesweeper_common::models::GameState;
use rand::Rng;
use tracing::{debug, info, instrument};

use super::Minesweeper;
use crate::data::Field;

impl<R: Rng> Minesweeper<R> {
    /// Replaces the whole game with a fresh field. Mine counts above the cell
    /// count are clamped, which yields a board made only of mines.
    ///
    /// # Panics
    ///
    /// Panics if `cols * rows` overflows `usize`. Hosts are expected to bound
    /// both sides before calling.
    #[instrument(level = "trace", skip(self))]
    pub fn generate_field(&mut self, cols: usize, rows: usize, mines: usize) {
        let Some(size) = cols.checked_mul(rows) else {
            panic!("field size {cols}x{rows} overflows usize");
        };
        let mines = min(mines, size);
        info!("Generating field: {}x{} with {} mines", cols, rows, mines);

        self.field = Field::empty(cols, rows, mines);
        self.marked_mines_count = 0;
        self.closed_cells_count = size;
        self.cells_to_open = size - mines;
        self.start_time = None;
        self.end_time = None;
        self.game_state = GameState::Playing;
        self.is_first_click = true;
        self.reveal_worklist.clear();

        if mines == size {
            debug!("Every cell holds a mine, nothing to open");
            self.field.fill_with_mines();
            return;
        }

        let mut mines_left = mines;
        let mut draws = 0usize;
        while mines_left > 0 {
            let index = self.rng.random_range(0..size);
            draws += 1;
            if !self.field.mine_map[index] {
                self.field.place_mine(index);
                mines_left -= 1;
            }
        }
        debug!("Placed {} mines in {} draws", mines, draws);
    }
}
