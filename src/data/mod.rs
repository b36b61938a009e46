use crate::error::FieldError;

const OPENED: u8 = 0b0001_0000;
const MARKED: u8 = 0b0010_0000;
const MINES_AROUND: u8 = 0b0000_1111;

/// Neighbor count stored in every cell of a board that is nothing but mines.
pub const ALL_MINES: u8 = 9;

/// Packed per-cell state: opened bit, marked bit and the neighbor mine count
/// in the low nibble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellState(u8);

impl CellState {
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_opened(self) -> bool {
        self.0 & OPENED != 0
    }

    pub fn is_marked(self) -> bool {
        self.0 & MARKED != 0
    }

    pub fn is_closed(self) -> bool {
        !self.is_opened()
    }

    pub fn mines_around(self) -> u8 {
        self.0 & MINES_AROUND
    }

    /// False for bytes no game can produce: unknown bits set, or a cell that
    /// is both opened and marked.
    pub fn is_well_formed(self) -> bool {
        let unknown = self.0 & !(OPENED | MARKED | MINES_AROUND);
        unknown == 0 && !(self.is_opened() && self.is_marked())
    }

    pub(crate) fn open(&mut self) {
        self.0 |= OPENED;
    }

    pub(crate) fn set_marked(&mut self, marked: bool) {
        if marked {
            self.0 |= MARKED;
        } else {
            self.0 &= !MARKED;
        }
    }

    fn set_mines_around(&mut self, count: u8) {
        self.0 = (self.0 & !MINES_AROUND) | (count & MINES_AROUND);
    }

    // Both checks below hold for counts built by `Field::place_mine` and for
    // snapshots that passed `SavedField` validation in `Minesweeper::load`.
    fn add_mine_around(&mut self) {
        let count = self.mines_around();
        debug_assert!(count < 8, "a cell has at most 8 neighbors");
        self.set_mines_around(count + 1);
    }

    fn remove_mine_around(&mut self) {
        let count = self.mines_around();
        debug_assert!(count > 0, "neighbor count underflow");
        self.set_mines_around(count.saturating_sub(1));
    }
}

/// Bounds-checked neighbor indices of one cell, at most 8.
#[derive(Debug, Clone, Default)]
pub struct Neighbors {
    indices: [usize; 8],
    len: usize,
    next: usize,
}

impl Neighbors {
    fn push(&mut self, index: usize) {
        self.indices[self.len] = index;
        self.len += 1;
    }
}

impl Iterator for Neighbors {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next == self.len {
            return None;
        }
        let index = self.indices[self.next];
        self.next += 1;
        Some(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub cols: usize,
    pub rows: usize,
    pub mines: usize,
    pub mine_map: Vec<bool>,
    pub cells: Vec<CellState>,
}

impl Field {
    pub fn empty(cols: usize, rows: usize, mines: usize) -> Self {
        let size = cols * rows;
        Self {
            cols,
            rows,
            mines,
            mine_map: vec![false; size],
            cells: vec![CellState::default(); size],
        }
    }

    /// Rebuilds neighbor counts for an existing mine layout. `mine_map` must
    /// hold exactly `cols * rows` entries.
    pub fn from_mine_map(cols: usize, rows: usize, mine_map: &[bool]) -> Self {
        let mines = mine_map.iter().filter(|&&mine| mine).count();
        let mut field = Self::empty(cols, rows, mines);
        if mines > 0 && mines == field.size() {
            field.fill_with_mines();
            return field;
        }
        for (index, _) in mine_map.iter().enumerate().filter(|(_, mine)| **mine) {
            field.place_mine(index);
        }
        field
    }

    pub fn size(&self) -> usize {
        self.cols * self.rows
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows
    }

    pub fn index(&self, col: usize, row: usize) -> Result<usize, FieldError> {
        if !self.contains(col, row) {
            return Err(FieldError::OutOfField {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(col + row * self.cols)
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    pub fn neighbors(&self, index: usize) -> Neighbors {
        let (col, row) = self.coords(index);
        let mut neighbors = Neighbors::default();

        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let new_col = col as isize + dx;
                let new_row = row as isize + dy;

                if new_col >= 0
                    && new_col < self.cols as isize
                    && new_row >= 0
                    && new_row < self.rows as isize
                {
                    neighbors.push(new_col as usize + new_row as usize * self.cols);
                }
            }
        }

        neighbors
    }

    pub fn place_mine(&mut self, index: usize) {
        self.mine_map[index] = true;
        for neighbor in self.neighbors(index) {
            self.cells[neighbor].add_mine_around();
        }
    }

    pub fn remove_mine(&mut self, index: usize) {
        self.mine_map[index] = false;
        for neighbor in self.neighbors(index) {
            self.cells[neighbor].remove_mine_around();
        }
    }

    pub fn fill_with_mines(&mut self) {
        self.mine_map.fill(true);
        for cell in &mut self.cells {
            cell.set_mines_around(ALL_MINES);
        }
    }
}
