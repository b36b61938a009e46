//! Serializable snapshot of a running game.
//!
//! The snapshot carries the pending reveal worklist so a game saved in the
//! middle of a cascade resumes it after loading.

use chrono::{DateTime, Utc};
use minesweeper_common::models::GameState;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    data::{CellState, Field},
    error::FieldError,
    logic::Minesweeper,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedField {
    pub field_size: [usize; 2],
    pub mines: usize,
    pub mine_map: Vec<bool>,
    pub cell_state: Vec<u8>,
    pub marked_mines_count: usize,
    pub closed_cells_count: usize,
    pub cells_to_open: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub game_state: GameState,
    pub is_first_click: bool,
    pub reveal_worklist: Vec<usize>,
}

impl SavedField {
    /// Checks that the counters, neighbor counts and worklist all agree with
    /// `mine_map` and `cell_state`, so a loaded game behaves like one that was
    /// played to this point.
    fn validate(&self) -> Result<(), FieldError> {
        let [cols, rows] = self.field_size;
        if cols == 0 || rows == 0 {
            return Err(invalid(format!("field size {cols}x{rows} has no cells")));
        }
        let size = cols
            .checked_mul(rows)
            .ok_or_else(|| invalid(format!("field size {cols}x{rows} overflows")))?;

        if self.mine_map.len() != size {
            return Err(invalid(format!(
                "mine map has {} cells, expected {}",
                self.mine_map.len(),
                size
            )));
        }
        if self.cell_state.len() != size {
            return Err(invalid(format!(
                "cell state has {} cells, expected {}",
                self.cell_state.len(),
                size
            )));
        }

        let expected = Field::from_mine_map(cols, rows, &self.mine_map);
        if expected.mines != self.mines {
            return Err(invalid(format!(
                "mine map holds {} mines, expected {}",
                expected.mines, self.mines
            )));
        }
        if self.cells_to_open != size - self.mines {
            return Err(invalid(format!(
                "{} cells to open with {} mines on {} cells",
                self.cells_to_open, self.mines, size
            )));
        }

        let mut closed = 0;
        let mut marked = 0;
        for (index, (&bits, counted)) in self.cell_state.iter().zip(&expected.cells).enumerate() {
            let cell = CellState::from_bits(bits);
            if !cell.is_well_formed() {
                return Err(invalid(format!("cell {index} has bad state {bits:#010b}")));
            }
            if cell.mines_around() != counted.mines_around() {
                return Err(invalid(format!(
                    "cell {index} counts {} mines around, mine map has {}",
                    cell.mines_around(),
                    counted.mines_around()
                )));
            }
            if cell.is_opened() && self.mine_map[index] && self.game_state != GameState::GameOver {
                return Err(invalid(format!(
                    "mine at cell {index} is open in a {:?} game",
                    self.game_state
                )));
            }
            if cell.is_closed() {
                closed += 1;
            }
            if cell.is_marked() {
                marked += 1;
            }
        }
        if closed != self.closed_cells_count {
            return Err(invalid(format!(
                "{} closed cells recorded, cell state has {}",
                self.closed_cells_count, closed
            )));
        }
        if marked != self.marked_mines_count {
            return Err(invalid(format!(
                "{} marks recorded, cell state has {}",
                self.marked_mines_count, marked
            )));
        }

        if self.game_state.is_terminal() && !self.reveal_worklist.is_empty() {
            return Err(invalid(format!(
                "finished game still has {} reveals pending",
                self.reveal_worklist.len()
            )));
        }
        if let Some(index) = self.reveal_worklist.iter().find(|&&index| index >= size) {
            return Err(invalid(format!("worklist entry {index} is out of field")));
        }
        if let Some(index) = self
            .reveal_worklist
            .iter()
            .find(|&&index| self.mine_map[index])
        {
            return Err(invalid(format!("worklist entry {index} is a mine")));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> FieldError {
    FieldError::InvalidSave(reason)
}

impl<R> Minesweeper<R> {
    pub fn save(&self) -> SavedField {
        SavedField {
            field_size: [self.field.cols, self.field.rows],
            mines: self.field.mines,
            mine_map: self.field.mine_map.clone(),
            cell_state: self.field.cells.iter().map(|cell| cell.bits()).collect(),
            marked_mines_count: self.marked_mines_count,
            closed_cells_count: self.closed_cells_count,
            cells_to_open: self.cells_to_open,
            start_time: self.start_time,
            end_time: self.end_time,
            game_state: self.game_state,
            is_first_click: self.is_first_click,
            reveal_worklist: self.reveal_worklist.iter().copied().collect(),
        }
    }

    /// Replaces the whole game with a snapshot. A snapshot that does not
    /// describe a consistent field is rejected and the game is left as is.
    #[instrument(level = "trace", skip_all)]
    pub fn load(&mut self, saved: SavedField) -> Result<(), FieldError> {
        if let Err(error) = saved.validate() {
            warn!("Rejecting saved field: {}", error);
            return Err(error);
        }

        let [cols, rows] = saved.field_size;
        info!(
            "Loading field: {}x{} with {} mines, {} reveals pending",
            cols,
            rows,
            saved.mines,
            saved.reveal_worklist.len()
        );

        self.field = Field {
            cols,
            rows,
            mines: saved.mines,
            mine_map: saved.mine_map,
            cells: saved
                .cell_state
                .into_iter()
                .map(CellState::from_bits)
                .collect(),
        };
        self.marked_mines_count = saved.marked_mines_count;
        self.closed_cells_count = saved.closed_cells_count;
        self.cells_to_open = saved.cells_to_open;
        self.start_time = saved.start_time;
        self.end_time = saved.end_time;
        self.game_state = saved.game_state;
        self.is_first_click = saved.is_first_click;
        self.reveal_worklist = saved.reveal_worklist.into();
        Ok(())
    }
}
