use ndarray::{Array2, ArrayView2, s};
use rand::{Rng, SeedableRng, seq::index};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::*;

/// Ground truth of a single game: where the mines are and how many surround every safe cell.
///
/// The grid carries a one-cell [`CellState::Wall`] border so neighbor lookups never need bounds
/// checks. All public coordinates are in the unpadded interior space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    cells: Array2<CellState>,
    size: Coord2,
    mine_count: CellCount,
}

impl Minefield {
    /// Generates a minefield where `first` is never a mine and, when density allows it, neither are
    /// its neighbors.
    pub fn new(config: GameConfig, first: Coord2, seed: Option<u64>) -> Result<Self> {
        match seed {
            Some(seed) => Self::generate(config, first, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => Self::generate(config, first, &mut rand::rng()),
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        config: GameConfig,
        first: Coord2,
        rng: &mut R,
    ) -> Result<Self> {
        let config = GameConfig::new(config.size, config.mines);
        let mut minefield = Self::walled(config.size);
        minefield.validate_coords(first)?;
        minefield.place_mines(config.mines, first, rng);
        minefield.define_counts()?;
        Ok(minefield)
    }

    /// Builds a minefield from explicit mine positions.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut minefield = Self::walled(size);
        for &coords in mine_coords {
            minefield.validate_coords(coords)?;
            minefield.cells[padded(coords)] = CellState::Mine;
        }
        minefield.mine_count = minefield
            .interior()
            .iter()
            .filter(|cell| cell.is_mine())
            .count() as CellCount;
        minefield.define_counts()?;
        Ok(minefield)
    }

    fn walled((width, height): Coord2) -> Self {
        let rows = usize::from(height) + 2;
        let cols = usize::from(width) + 2;
        let cells = Array2::from_shape_fn((rows, cols), |(row, col)| {
            if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
                CellState::Wall
            } else {
                CellState::Unopened
            }
        });
        Self {
            cells,
            size: (width, height),
            mine_count: 0,
        }
    }

    fn place_mines<R: Rng + ?Sized>(&mut self, mines: CellCount, first: Coord2, rng: &mut R) {
        let (width, height) = self.size;

        let near: Vec<Coord2> = NeighborIter::new(first, self.size).collect();
        let n_nbrs = near.len() as CellCount;
        let far_mines = mines.min(mult(width, height) - n_nbrs - 1);
        let near_mines = (mines - far_mines).min(n_nbrs);

        let far: Vec<Coord2> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|coords| *coords != first && !near.contains(coords))
            .collect();

        for i in index::sample(rng, far.len(), far_mines.into()) {
            self.cells[padded(far[i])] = CellState::Mine;
        }

        if near_mines > 0 {
            log::debug!(
                "{} mines do not fit outside the start area, {} placed next to {:?}",
                mines,
                near_mines,
                first
            );
            for i in index::sample(rng, near.len(), near_mines.into()) {
                self.cells[padded(near[i])] = CellState::Mine;
            }
        }

        self.mine_count = far_mines + near_mines;
    }

    fn define_counts(&mut self) -> Result<()> {
        let (width, height) = self.size;
        for y in 0..height {
            for x in 0..width {
                let coords = (x, y);
                if self.cells[padded(coords)].is_mine() {
                    continue;
                }
                let mines_near = self.neighbors_of_type(coords, CellState::Mine)?.len() as u8;
                self.cells[padded(coords)] = CellState::from_mine_count(mines_near)?;
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (x, y) = coords;
        if x < self.size.0 && y < self.size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds { x, y })
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellState> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[padded(coords)])
    }

    /// The 3×3 block centered on `coords`, with walls where it crosses the edge.
    pub fn neighbors(&self, coords: Coord2) -> Result<Array2<CellState>> {
        let (x, y) = self.validate_coords(coords)?;
        let (x, y) = (usize::from(x), usize::from(y));
        Ok(self.cells.slice(s![y..y + 3, x..x + 3]).to_owned())
    }

    /// Interior coordinates of the neighbors of `coords` whose state equals `kind`.
    pub fn neighbors_of_type(&self, coords: Coord2, kind: CellState) -> Result<BTreeSet<Coord2>> {
        let (x, y) = self.validate_coords(coords)?;
        let (x, y) = (usize::from(x), usize::from(y));
        let mut found = BTreeSet::new();
        for dy in 0..3 {
            for dx in 0..3 {
                if dx == 1 && dy == 1 {
                    continue;
                }
                // padded position of the neighbor is (x + dx, y + dy)
                let cell = self.cells[[y + dy, x + dx]];
                if cell == CellState::Wall || cell != kind {
                    continue;
                }
                found.insert(((x + dx - 1) as Coord, (y + dy - 1) as Coord));
            }
        }
        Ok(found)
    }

    /// Read-only view of the interior, `height × width`, without the wall border.
    pub fn interior(&self) -> ArrayView2<'_, CellState> {
        self.cells.slice(s![1..-1, 1..-1])
    }

    pub fn contains_mine(&self, coords: Coord2) -> Result<bool> {
        Ok(self.cell_at(coords)?.is_mine())
    }
}

fn padded((x, y): Coord2) -> [usize; 2] {
    [usize::from(y) + 1, usize::from(x) + 1]
}

impl fmt::Display for Minefield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
