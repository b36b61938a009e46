use minesweeper_common::models::GameState;
use rand::Rng;
use tracing::{debug, info, instrument, trace, warn};

use super::Minesweeper;
use crate::error::FieldError;

/// Worklist entries processed by a single [`Minesweeper::update`] call.
pub const CELLS_TO_OPEN_PER_TICK: usize = 100;

const RELOCATION_ATTEMPTS: usize = 1000;

impl<R: Rng> Minesweeper<R> {
    /// Opens a cell, or chords it when it is already open.
    ///
    /// A safe closed cell is only queued here; the cells actually open during
    /// the following [`update`](Self::update) calls.
    #[instrument(level = "trace", skip(self))]
    pub fn open_cell(&mut self, col: usize, row: usize) -> Result<(), FieldError> {
        let index = self.field.index(col, row)?;

        if self.game_state != GameState::Playing {
            debug!("Ignoring open on finished game at ({}, {})", col, row);
            return Ok(());
        }
        if self.is_busy() {
            debug!(
                "Ignoring open at ({}, {}) while {} reveals are pending",
                col,
                row,
                self.reveal_worklist.len()
            );
            return Ok(());
        }

        self.start_clock();

        if self.field.cells[index].is_marked() {
            debug!("Ignoring open on marked cell ({}, {})", col, row);
            return Ok(());
        }

        if self.field.mine_map[index] {
            if !self.is_first_click {
                warn!("Mine hit at ({}, {}) - game over!", col, row);
                self.open_index(index);
                self.finish(GameState::GameOver);
                return Ok(());
            }
            if !self.relocate_mine(index) {
                debug!("No free cell to move the mine at ({}, {}) to", col, row);
                return Ok(());
            }
        }
        self.is_first_click = false;

        if self.field.cells[index].is_opened() {
            self.chord(index);
            return Ok(());
        }

        debug!(
            "Queueing reveal of ({}, {}) with {} adjacent mines",
            col,
            row,
            self.field.cells[index].mines_around()
        );
        self.reveal_worklist.push_back(index);
        Ok(())
    }

    /// Moves the mine under a first click elsewhere. Returns false when every
    /// other cell already holds a mine.
    fn relocate_mine(&mut self, index: usize) -> bool {
        let size = self.field.size();
        let mut target = None;

        for _ in 0..RELOCATION_ATTEMPTS {
            let candidate = self.rng.random_range(0..size);
            if !self.field.mine_map[candidate] {
                target = Some(candidate);
                break;
            }
        }
        if target.is_none() {
            target = (0..size)
                .find(|&candidate| candidate != index && !self.field.mine_map[candidate]);
        }

        let Some(target) = target else {
            return false;
        };

        self.field.remove_mine(index);
        self.field.place_mine(target);
        let (col, row) = self.field.coords(target);
        info!("First click was on a mine, moved it to ({}, {})", col, row);
        true
    }

    /// Advances the reveal cascade by at most [`CELLS_TO_OPEN_PER_TICK`]
    /// entries and checks for a win. Returns how many cells were opened.
    pub fn update(&mut self) -> usize {
        if self.game_state != GameState::Playing {
            return 0;
        }

        let mut opened = 0;
        for _ in 0..CELLS_TO_OPEN_PER_TICK {
            let Some(index) = self.reveal_worklist.pop_front() else {
                break;
            };

            let cell = self.field.cells[index];
            if cell.is_opened() || cell.is_marked() {
                continue;
            }
            debug_assert!(!self.field.mine_map[index], "cascade reached a mine");

            self.open_index(index);
            opened += 1;

            if cell.mines_around() == 0 {
                for neighbor in self.field.neighbors(index) {
                    let neighbor_cell = self.field.cells[neighbor];
                    if neighbor_cell.is_closed() && !neighbor_cell.is_marked() {
                        self.reveal_worklist.push_back(neighbor);
                    }
                }
            }
        }

        if opened > 0 {
            trace!(
                "Opened {} cells, {} reveals pending",
                opened,
                self.reveal_worklist.len()
            );
        }

        if self.opened_cells_count() == self.cells_to_open {
            // Every safe cell is open, so whatever is still queued is stale.
            self.reveal_worklist.clear();
            info!("Game won! All safe cells opened.");
            self.finish(GameState::Win);
        }

        opened
    }
}
