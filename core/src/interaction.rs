use serde::{Deserialize, Serialize};

use crate::{Coord, Coord2};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Open,
    Flag,
    NewGame,
    Exit,
}

/// A single player move. Coordinates are ignored for [`Action::NewGame`] and [`Action::Exit`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub x: Coord,
    pub y: Coord,
    pub action: Action,
}

impl Interaction {
    pub const fn new(x: Coord, y: Coord, action: Action) -> Self {
        Self { x, y, action }
    }

    pub const fn open((x, y): Coord2) -> Self {
        Self::new(x, y, Action::Open)
    }

    pub const fn flag((x, y): Coord2) -> Self {
        Self::new(x, y, Action::Flag)
    }

    pub const fn new_game() -> Self {
        Self::new(0, 0, Action::NewGame)
    }

    pub const fn exit() -> Self {
        Self::new(0, 0, Action::Exit)
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }

    /// Whether the coordinates of this interaction are meaningful.
    pub const fn is_targeted(&self) -> bool {
        matches!(self.action, Action::Open | Action::Flag)
    }
}
