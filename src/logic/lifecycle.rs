use minesweeper_common::models::GameState;
use tracing::{debug, info, instrument};

use super::Minesweeper;
use crate::error::FieldError;

impl<R> Minesweeper<R> {
    /// Toggles the mark on a closed cell.
    #[instrument(level = "trace", skip(self))]
    pub fn mark_cell(&mut self, col: usize, row: usize) -> Result<(), FieldError> {
        let index = self.field.index(col, row)?;

        if self.game_state != GameState::Playing || self.is_busy() {
            debug!("Ignoring mark at ({}, {})", col, row);
            return Ok(());
        }

        self.start_clock();

        let cell = &mut self.field.cells[index];
        if cell.is_opened() {
            debug!("Ignoring mark on opened cell ({}, {})", col, row);
            return Ok(());
        }

        if cell.is_marked() {
            cell.set_marked(false);
            self.marked_mines_count -= 1;
            debug!("Cell ({}, {}) unmarked", col, row);
        } else {
            cell.set_marked(true);
            self.marked_mines_count += 1;
            debug!("Cell ({}, {}) marked", col, row);
        }
        self.is_first_click = false;
        Ok(())
    }

    /// Whole seconds since the first interaction, frozen once the game ends.
    pub fn seconds_from_start(&self) -> i64 {
        let Some(start_time) = self.start_time else {
            return 0;
        };
        let end_time = self.end_time.unwrap_or_else(|| self.clock.now());
        (end_time - start_time).num_seconds().max(0)
    }

    /// Mines left for the counter display. Never negative, even with more
    /// marks than mines.
    pub fn closed_and_not_marked_mines_count(&self) -> usize {
        self.field.mines.saturating_sub(self.marked_mines_count)
    }

    pub fn is_playing(&self) -> bool {
        self.game_state == GameState::Playing
    }

    pub fn is_ended(&self) -> bool {
        self.game_state.is_terminal()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_state == GameState::GameOver
    }

    pub fn is_win(&self) -> bool {
        self.game_state == GameState::Win
    }

    pub(super) fn start_clock(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(self.clock.now());
        }
    }

    pub(super) fn finish(&mut self, state: GameState) {
        debug_assert!(state.is_terminal());
        self.game_state = state;
        self.end_time = Some(self.clock.now());
        info!(
            "Game finished as {:?} after {} seconds",
            state,
            self.seconds_from_start()
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};
    use minesweeper_common::models::GameState;

    use crate::{
        clock::ManualClock,
        logic::tests::{drain, engine_with_mines},
    };

    fn clock() -> ManualClock {
        ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn marking_toggles_and_counts() {
        let mut engine = engine_with_mines(3, 3, &[(0, 0), (1, 0)]);
        assert_eq!(engine.closed_and_not_marked_mines_count(), 2);

        engine.mark_cell(2, 2).unwrap();
        assert!(engine.is_cell_marked(2, 2).unwrap());
        assert_eq!(engine.marked_mines_count(), 1);
        assert_eq!(engine.closed_and_not_marked_mines_count(), 1);

        engine.mark_cell(2, 2).unwrap();
        assert!(!engine.is_cell_marked(2, 2).unwrap());
        assert_eq!(engine.marked_mines_count(), 0);
    }

    #[test]
    fn remaining_mines_never_goes_negative() {
        let mut engine = engine_with_mines(3, 3, &[(0, 0)]);
        engine.mark_cell(1, 1).unwrap();
        engine.mark_cell(2, 2).unwrap();
        engine.mark_cell(0, 0).unwrap();
        assert_eq!(engine.marked_mines_count(), 3);
        assert_eq!(engine.closed_and_not_marked_mines_count(), 0);
    }

    #[test]
    fn opened_cells_cannot_be_marked() {
        let mut engine = engine_with_mines(3, 3, &[(0, 0)]);
        engine.open_cell(2, 2).unwrap();
        drain(&mut engine);
        engine.mark_cell(2, 2).unwrap();
        assert!(!engine.is_cell_marked(2, 2).unwrap());
        assert_eq!(engine.marked_mines_count(), 0);
    }

    #[test]
    fn mark_is_rejected_during_a_cascade() {
        let mut engine = engine_with_mines(5, 5, &[(4, 4)]);
        engine.open_cell(0, 0).unwrap();
        assert!(engine.is_busy());

        engine.mark_cell(3, 3).unwrap();

        assert!(!engine.is_cell_marked(3, 3).unwrap());
        assert_eq!(engine.marked_mines_count(), 0);
    }

    #[test]
    fn mark_starts_the_clock() {
        let clock = clock();
        let mut engine = engine_with_mines(3, 3, &[(0, 0)]).with_clock(clock.clone());
        assert_eq!(engine.seconds_from_start(), 0);

        clock.advance(Duration::seconds(30));
        assert_eq!(engine.seconds_from_start(), 0);

        engine.mark_cell(0, 0).unwrap();
        clock.advance(Duration::milliseconds(4_900));
        assert_eq!(engine.seconds_from_start(), 4);
    }

    #[test]
    fn timer_freezes_when_the_game_ends() {
        let clock = clock();
        let mut engine = engine_with_mines(3, 3, &[(0, 0)]).with_clock(clock.clone());
        engine.open_cell(2, 2).unwrap();
        clock.advance(Duration::seconds(12));
        drain(&mut engine);
        assert_eq!(engine.game_state(), GameState::Win);
        assert!(engine.is_win());
        assert!(engine.is_ended());

        clock.advance(Duration::seconds(100));
        assert_eq!(engine.seconds_from_start(), 12);
        assert_eq!(
            engine.end_time().unwrap() - engine.start_time().unwrap(),
            Duration::seconds(12)
        );
    }
}
