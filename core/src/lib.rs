use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use interaction::*;
pub use minefield::*;
pub use seed::*;
pub use session::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod interaction;
mod minefield;
mod seed;
mod session;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Keeps at least one safe cell so every game stays winnable.
    pub fn new(size: Coord2, mines: CellCount) -> Self {
        let mines = mines.min(mult(size.0, size.1).saturating_sub(1));
        Self::new_unchecked(size, mines)
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// What an interaction did to the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    NoChange,
    Opened,
    HitMine,
    Won,
    FlagChanged,
    Reset,
    Exit,
}

impl Outcome {
    /// Whether this outcome could have changed what a renderer shows.
    pub const fn has_update(self) -> bool {
        use Outcome::*;
        match self {
            NoChange => false,
            Opened => true,
            HitMine => true,
            Won => true,
            FlagChanged => true,
            Reset => true,
            Exit => false,
        }
    }
}
