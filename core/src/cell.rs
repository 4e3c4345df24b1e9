use serde::{Deserialize, Serialize};

use crate::Coord2;

/// Per-position state owned by the board.
///
/// A cell is never revealed and flagged at the same time, and `adjacent_mines`
/// stays `0` on mine cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_flagged: bool,
    pub is_revealed: bool,
    pub adjacent_mines: u8,
}

impl Cell {
    /// Neither revealed nor flagged, so a reveal would act on it.
    pub const fn is_covered(self) -> bool {
        !self.is_revealed && !self.is_flagged
    }

    /// Visual state while the game is still being played.
    pub const fn view(self) -> CellView {
        if self.is_flagged {
            CellView::Flagged
        } else if !self.is_revealed {
            CellView::Covered
        } else if self.is_mine {
            CellView::Exploded
        } else {
            CellView::Revealed(self.adjacent_mines)
        }
    }
}

/// What a renderer should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Covered,
    Flagged,
    Revealed(u8),
    /// Mine left unflagged when the game was lost
    Mine,
    /// A mine the player opened
    Exploded,
    /// Flag placed on a safe cell, shown after a loss
    Misflagged,
}

impl Default for CellView {
    fn default() -> Self {
        Self::Covered
    }
}

/// A single visual delta produced by a session call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub coords: Coord2,
    pub view: CellView,
}

impl CellChange {
    pub const fn new(coords: Coord2, view: CellView) -> Self {
        Self { coords, view }
    }
}
