use minesweeper_common::models::GameState;
use tracing::{debug, warn};

use super::Minesweeper;

impl<R> Minesweeper<R> {
    /// Resolves a click on an already opened cell from its neighborhood.
    pub(super) fn chord(&mut self, index: usize) {
        let mines_around = self.field.cells[index].mines_around() as usize;
        let mut marked_around = 0;
        let mut wrong_marks = 0;
        let mut closed_around = 0;

        for neighbor in self.field.neighbors(index) {
            let cell = self.field.cells[neighbor];
            if cell.is_marked() {
                marked_around += 1;
                if !self.field.mine_map[neighbor] {
                    wrong_marks += 1;
                }
            }
            if cell.is_closed() {
                closed_around += 1;
            }
        }

        let (col, row) = self.field.coords(index);

        if marked_around == mines_around {
            if wrong_marks > 0 {
                warn!(
                    "Chord at ({}, {}) with {} wrong marks - game over!",
                    col, row, wrong_marks
                );
                for neighbor in self.field.neighbors(index) {
                    if !self.field.cells[neighbor].is_marked() {
                        self.open_index(neighbor);
                    }
                }
                self.finish(GameState::GameOver);
                return;
            }

            for neighbor in self.field.neighbors(index) {
                let cell = self.field.cells[neighbor];
                if cell.is_closed() && !cell.is_marked() {
                    self.reveal_worklist.push_back(neighbor);
                }
            }
            debug!(
                "Chord at ({}, {}) queued {} neighbors",
                col,
                row,
                self.reveal_worklist.len()
            );
        } else if mines_around == closed_around {
            let mut newly_marked = 0;
            for neighbor in self.field.neighbors(index) {
                let cell = &mut self.field.cells[neighbor];
                if cell.is_closed() && !cell.is_marked() {
                    cell.set_marked(true);
                    self.marked_mines_count += 1;
                    newly_marked += 1;
                }
            }
            debug!("Chord at ({}, {}) marked {} neighbors", col, row, newly_marked);
        } else {
            debug!(
                "Chord at ({}, {}) is ambiguous: {} mines, {} marked, {} closed",
                col, row, mines_around, marked_around, closed_around
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use minesweeper_common::models::GameState;

    use crate::logic::tests::{drain, engine_with_mines};

    #[test]
    fn correct_marks_open_remaining_neighbors() {
        // Mine at (0, 0); open (1, 1) which shows 1.
        let mut engine = engine_with_mines(3, 3, &[(0, 0)]);
        engine.open_cell(1, 1).unwrap();
        drain(&mut engine);
        engine.mark_cell(0, 0).unwrap();

        engine.open_cell(1, 1).unwrap();
        assert!(engine.is_busy());
        drain(&mut engine);

        for row in 0..3 {
            for col in 0..3 {
                if (col, row) != (0, 0) {
                    assert!(engine.is_cell_opened(col, row).unwrap());
                }
            }
        }
        assert_eq!(engine.game_state(), GameState::Win);
    }

    #[test]
    fn chord_cascades_through_adjoining_zero_region() {
        // Mine at (0, 0) in a 6x1 strip: (1, 0) shows 1, everything right of it is 0.
        let mut engine = engine_with_mines(6, 1, &[(0, 0)]);
        engine.open_cell(1, 0).unwrap();
        drain(&mut engine);
        assert_eq!(engine.opened_cells_count(), 1);
        engine.mark_cell(0, 0).unwrap();

        engine.open_cell(1, 0).unwrap();
        drain(&mut engine);

        assert_eq!(engine.opened_cells_count(), 5);
        assert_eq!(engine.game_state(), GameState::Win);
    }

    #[test]
    fn wrong_mark_opens_neighbors_and_loses() {
        // Mine at (0, 0), but the player marks (2, 0) instead.
        let mut engine = engine_with_mines(3, 3, &[(0, 0)]);
        engine.open_cell(1, 1).unwrap();
        drain(&mut engine);
        engine.mark_cell(2, 0).unwrap();

        engine.open_cell(1, 1).unwrap();

        assert_eq!(engine.game_state(), GameState::GameOver);
        assert!(engine.end_time().is_some());
        assert!(!engine.is_busy());
        assert!(engine.is_cell_opened(0, 0).unwrap());
        assert!(!engine.is_cell_opened(2, 0).unwrap());
        assert!(engine.is_cell_marked(2, 0).unwrap());
        assert!(engine.is_cell_opened(2, 2).unwrap());
    }

    #[test]
    fn closed_neighbors_matching_count_get_marked() {
        // (1, 0) sees two mines and has exactly two closed neighbors left.
        let mut engine = engine_with_mines(3, 3, &[(0, 0), (2, 0)]);
        for (col, row) in [(1, 0), (0, 1), (1, 1), (2, 1)] {
            engine.open_cell(col, row).unwrap();
            drain(&mut engine);
        }
        assert_eq!(engine.cell_mines_count(1, 0).unwrap(), 2);

        engine.open_cell(1, 0).unwrap();

        assert!(engine.is_cell_marked(0, 0).unwrap());
        assert!(engine.is_cell_marked(2, 0).unwrap());
        assert_eq!(engine.marked_mines_count(), 2);
        assert_eq!(engine.closed_and_not_marked_mines_count(), 0);
        assert_eq!(engine.game_state(), GameState::Playing);
        assert!(!engine.is_busy());
    }

    #[test]
    fn ambiguous_neighborhood_is_left_alone() {
        let mut engine = engine_with_mines(4, 4, &[(0, 0), (3, 0)]);
        engine.open_cell(1, 1).unwrap();
        drain(&mut engine);
        assert_eq!(engine.cell_mines_count(1, 1).unwrap(), 1);

        engine.open_cell(1, 1).unwrap();

        assert!(!engine.is_busy());
        assert_eq!(engine.marked_mines_count(), 0);
        assert_eq!(engine.opened_cells_count(), 1);
        assert_eq!(engine.game_state(), GameState::Playing);
    }
}
