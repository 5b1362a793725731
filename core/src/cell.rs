use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{GameError, Result};

/// Every value a cell can take, either in the minefield itself or on the grid handed to a renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Opened safe cell with the number of adjacent mines, always in `0..=8`.
    Count(u8),
    Mine,
    Unopened,
    Flagged,
    /// The mine that ended the game.
    MineExploded,
    /// A flag placed on a cell without a mine, shown after a loss.
    MisflaggedMine,
    /// Sentinel border of the minefield, never visible to the engine.
    Wall,
}

impl CellState {
    pub const MAX_COUNT: u8 = 8;

    pub fn from_mine_count(count: u8) -> Result<Self> {
        if count > Self::MAX_COUNT {
            Err(GameError::InvalidMineCount(count))
        } else {
            Ok(Self::Count(count))
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Count(0))
    }

    pub const fn count(self) -> Option<u8> {
        match self {
            Self::Count(count) => Some(count),
            _ => None,
        }
    }

    /// Single character used by text renderers.
    pub const fn symbol(self) -> char {
        use CellState::*;
        match self {
            Count(0) => '.',
            Count(count) if count <= Self::MAX_COUNT => (b'0' + count) as char,
            Count(_) => '?',
            Mine => '*',
            Unopened => '#',
            Flagged => 'F',
            MineExploded => 'X',
            MisflaggedMine => '!',
            Wall => '=',
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Unopened
    }
}

impl TryFrom<u8> for CellState {
    type Error = GameError;

    fn try_from(count: u8) -> Result<Self> {
        Self::from_mine_count(count)
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.symbol(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_count_maps_to_count_variant() {
        for count in 0..=8 {
            assert_eq!(CellState::from_mine_count(count), Ok(CellState::Count(count)));
        }
    }

    #[test]
    fn mine_count_above_eight_is_rejected() {
        assert_eq!(CellState::from_mine_count(9), Err(GameError::InvalidMineCount(9)));
        assert_eq!(CellState::try_from(200u8), Err(GameError::InvalidMineCount(200)));
    }

    #[test]
    fn count_is_distinct_from_other_states() {
        assert_ne!(CellState::Count(0), CellState::Mine);
        assert_ne!(CellState::Count(0), CellState::Wall);
        assert_ne!(CellState::Count(1), CellState::Count(2));
        assert!(CellState::Count(0).is_zero());
        assert!(!CellState::Count(3).is_zero());
        assert_eq!(CellState::Count(3).count(), Some(3));
        assert_eq!(CellState::Mine.count(), None);
    }

    #[test]
    fn symbols_are_single_digits_for_counts() {
        assert_eq!(CellState::Count(0).to_string(), ".");
        assert_eq!(CellState::Count(8).to_string(), "8");
        assert_eq!(CellState::Flagged.to_string(), "F");
        assert_eq!(format!("{:>3}", CellState::Count(2)), "  2");
    }

    #[test]
    fn counts_beyond_eight_have_no_digit() {
        assert_eq!(CellState::Count(9).symbol(), '?');
        assert_eq!(CellState::Count(42).symbol(), '?');
    }
}
