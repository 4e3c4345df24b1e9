use core::fmt;
use core::ops::{Index, IndexMut};
use ndarray::Array2;
use rand::Rng;

use crate::*;

/// Outcome of revealing a single cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Mine,
    Safe(u8),
}

/// Outcome of toggling a flag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

/// Rectangular grid of cells, mines are placed once and never move.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
    mines_placed: bool,
}

impl Board {
    /// Empty board with no mines.
    pub fn new(size: Coord2) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions);
        }
        Ok(Self::blank(size))
    }

    pub(crate) fn blank(size: Coord2) -> Self {
        Self {
            cells: Array2::default(nd_index(size)),
            mine_count: 0,
            mines_placed: false,
        }
    }

    /// Board with a fixed layout, adjacency counts are computed immediately.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut board = Self::new(size)?;

        for &coords in mine_coords {
            let coords = board.validate_coords(coords)?;
            if !board[coords].is_mine {
                board[coords].is_mine = true;
                board.mine_count += 1;
            }
        }

        if board.mine_count >= board.total_cells() {
            return Err(GameError::TooManyMines);
        }

        board.count_adjacent_mines();
        Ok(board)
    }

    /// Randomly places `mine_count` mines, keeping `excluded` and its neighbours clear.
    ///
    /// Samples are drawn uniformly over the whole grid and rejected when they land on
    /// an existing mine or inside the exclusion block. When the block leaves too few
    /// eligible cells only `excluded` itself is kept clear.
    pub fn place_mines<R: Rng + ?Sized>(
        &mut self,
        mine_count: CellCount,
        excluded: Coord2,
        rng: &mut R,
    ) -> Result<()> {
        let excluded = self.validate_coords(excluded)?;
        let total_cells = self.total_cells();

        if mine_count >= total_cells {
            return Err(GameError::TooManyMines);
        }

        if self.mines_placed {
            log::warn!("Mines already placed, keeping the existing layout");
            return Ok(());
        }

        let block_size = 1 + self.neighbors_of(excluded).len() as CellCount;
        let keep_block_clear = mine_count <= total_cells - block_size;
        if !keep_block_clear {
            log::warn!(
                "Cannot keep {:?} and its neighbors clear with {} mines on {} cells, only the cell itself stays safe",
                excluded,
                mine_count,
                total_cells
            );
        }

        let (rows, cols) = self.size();
        let mut mines_placed = 0;
        while mines_placed < mine_count {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));

            let is_excluded = if keep_block_clear {
                within_one(excluded, coords)
            } else {
                coords == excluded
            };
            if is_excluded || self[coords].is_mine {
                continue;
            }

            self[coords].is_mine = true;
            mines_placed += 1;
        }

        self.mine_count = mine_count;
        self.count_adjacent_mines();
        log::debug!("Placed {} mines avoiding {:?}\n{}", mine_count, excluded, self);
        Ok(())
    }

    fn count_adjacent_mines(&mut self) {
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                if !self[coords].is_mine {
                    continue;
                }
                for pos in self.neighbors_of(coords) {
                    let neighbor = &mut self[pos];
                    if !neighbor.is_mine {
                        neighbor.adjacent_mines += 1;
                    }
                }
            }
        }
        self.mines_placed = true;
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    /// `(rows, cols)`
    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        // built from a `Coord2` so this never truncates
        (rows as Coord, cols as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self[coords])
    }

    pub fn neighbors(&self, coords: Coord2) -> Result<Neighbors> {
        let coords = self.validate_coords(coords)?;
        Ok(self.neighbors_of(coords))
    }

    pub fn reveal_cell(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        Ok(self.reveal_at(coords))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        Ok(self.toggle_flag_at(coords))
    }

    /// All cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    pub(crate) fn reveal_at(&mut self, coords: Coord2) -> RevealOutcome {
        let cell = &mut self[coords];
        if !cell.is_covered() {
            return RevealOutcome::NoChange;
        }

        cell.is_revealed = true;
        if cell.is_mine {
            RevealOutcome::Mine
        } else {
            RevealOutcome::Safe(cell.adjacent_mines)
        }
    }

    pub(crate) fn toggle_flag_at(&mut self, coords: Coord2) -> FlagOutcome {
        let cell = &mut self[coords];
        if cell.is_revealed {
            return FlagOutcome::NoChange;
        }

        cell.is_flagged = !cell.is_flagged;
        if cell.is_flagged {
            FlagOutcome::Flagged
        } else {
            FlagOutcome::Unflagged
        }
    }

    pub(crate) fn neighbors_of(&self, coords: Coord2) -> Neighbors {
        neighbors(coords, self.size())
    }

    pub(crate) fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        // at most eight neighbours
        self.neighbors_of(coords)
            .into_iter()
            .filter(|&pos| self[pos].is_flagged)
            .count() as u8
    }
}

fn nd_index((row, col): Coord2) -> [usize; 2] {
    [row.into(), col.into()]
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[nd_index(coords)]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[nd_index(coords)]
    }
}

/// One line per row, `X` for mines and the adjacency count otherwise.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                if cell.is_mine {
                    f.write_str("X")?;
                } else {
                    write!(f, "{}", cell.adjacent_mines)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
