use thiserror::Error;

use crate::Coord;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Out of bounds: x={x}, y={y}")]
    OutOfBounds { x: Coord, y: Coord },
    #[error("Invalid mine count {0}, a cell has at most 8 neighbors")]
    InvalidMineCount(u8),
    #[error("Minefield queried before it was generated")]
    QueriedBeforeInit,
}

pub type Result<T> = core::result::Result<T, GameError>;
