use minesweeper_common::models::{CellView, GameState};

use super::Minesweeper;
use crate::error::FieldError;

impl<R> Minesweeper<R> {
    /// What the player sees at `(col, row)`. Mines stay hidden until the
    /// game ends.
    pub fn cell_view(&self, col: usize, row: usize) -> Result<CellView, FieldError> {
        Ok(self.view_at(self.field.index(col, row)?))
    }

    /// Views for the whole field, row by row.
    pub fn field_view(&self) -> Vec<CellView> {
        (0..self.field.size()).map(|index| self.view_at(index)).collect()
    }

    fn view_at(&self, index: usize) -> CellView {
        let cell = self.field.cells[index];
        let mine = self.field.mine_map[index];

        match self.game_state {
            GameState::GameOver => {
                if cell.is_marked() && !mine {
                    return CellView::WrongMark;
                }
                if mine && cell.is_opened() {
                    return CellView::Detonated;
                }
                if cell.is_marked() {
                    return CellView::Marked;
                }
                if mine {
                    return CellView::Mine;
                }
            }
            GameState::Win if mine => return CellView::Marked,
            _ => {}
        }

        if cell.is_marked() {
            CellView::Marked
        } else if cell.is_opened() {
            CellView::Opened {
                adjacent: cell.mines_around(),
            }
        } else {
            CellView::Closed
        }
    }
}

#[cfg(test)]
mod tests {
    use minesweeper_common::models::CellView;

    use crate::logic::tests::{drain, engine_with_mines};

    #[test]
    fn playing_field_hides_mines() {
        let mut engine = engine_with_mines(3, 1, &[(2, 0)]);
        engine.open_cell(1, 0).unwrap();
        drain(&mut engine);

        assert_eq!(engine.cell_view(0, 0).unwrap(), CellView::Closed);
        assert_eq!(
            engine.cell_view(1, 0).unwrap(),
            CellView::Opened { adjacent: 1 }
        );
        assert_eq!(engine.cell_view(2, 0).unwrap(), CellView::Closed);
    }

    #[test]
    fn game_over_shows_mines_and_wrong_marks() {
        let mut engine = engine_with_mines(4, 1, &[(0, 0), (3, 0)]);
        engine.mark_cell(0, 0).unwrap();
        engine.mark_cell(1, 0).unwrap();
        engine.open_cell(3, 0).unwrap();

        assert_eq!(
            engine.field_view(),
            vec![
                CellView::Marked,
                CellView::WrongMark,
                CellView::Closed,
                CellView::Detonated
            ]
        );
    }

    #[test]
    fn won_field_shows_mines_as_marked() {
        let mut engine = engine_with_mines(2, 1, &[(0, 0)]);
        engine.open_cell(1, 0).unwrap();
        drain(&mut engine);

        assert!(engine.is_win());
        assert_eq!(
            engine.field_view(),
            vec![CellView::Marked, CellView::Opened { adjacent: 1 }]
        );
    }

    #[test]
    fn unmarked_mine_is_revealed_after_loss() {
        let mut engine = engine_with_mines(3, 1, &[(0, 0), (2, 0)]);
        engine.mark_cell(1, 0).unwrap();
        engine.mark_cell(1, 0).unwrap();
        engine.open_cell(2, 0).unwrap();

        assert_eq!(engine.cell_view(0, 0).unwrap(), CellView::Mine);
        assert_eq!(engine.cell_view(1, 0).unwrap(), CellView::Closed);
    }
}
