use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Highest value the elapsed-time counter reaches.
pub const MAX_ELAPSED_SECS: u16 = 999;

/// How far past the mine count the player may keep placing flags, so the
/// mines-left counter bottoms out at `-FLAG_OVERFLOW`.
pub const FLAG_OVERFLOW: CellCount = 99;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// `(rows, cols)`
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions);
        }
        if mines >= mult(size.0, size.1) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Number of reveals needed to win.
    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

/// The fixed presets, ordered from easiest to hardest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Beginner => "Beginner",
            Intermediate => "Intermediate",
            Expert => "Expert",
        }
    }

    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Beginner => GameConfig::new_unchecked((8, 8), 10),
            Intermediate => GameConfig::new_unchecked((16, 16), 40),
            Expert => GameConfig::new_unchecked((16, 32), 99),
        }
    }

    /// Resolves a preset by its exact name, `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|difficulty| difficulty.name() == name)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(GameConfig::new((0, 5), 1), Err(GameError::InvalidDimensions));
        assert_eq!(GameConfig::new((5, 0), 1), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn rejects_full_board() {
        assert_eq!(GameConfig::new((3, 3), 9), Err(GameError::TooManyMines));
        assert!(GameConfig::new((3, 3), 8).is_ok());
        assert!(GameConfig::new((1, 1), 0).is_ok());
    }

    #[test]
    fn presets_are_valid_configs() {
        for difficulty in Difficulty::ALL {
            let config = difficulty.config();
            assert_eq!(GameConfig::new(config.size, config.mines), Ok(config));
        }
        assert_eq!(Difficulty::Beginner.config().safe_cells(), 54);
        assert_eq!(Difficulty::Expert.config().total_cells(), 512);
    }

    #[test]
    fn resolves_names() {
        assert_eq!(Difficulty::from_name("Intermediate"), Some(Difficulty::Intermediate));
        assert_eq!(Difficulty::from_name("Expert"), Some(Difficulty::Expert));
        assert_eq!(Difficulty::from_name("expert"), None);
        assert_eq!(Difficulty::from_name("Insane"), None);
    }

    #[test]
    fn presets_order_by_declaration() {
        assert!(Difficulty::Beginner < Difficulty::Intermediate);
        assert!(Difficulty::Intermediate < Difficulty::Expert);
    }
}
