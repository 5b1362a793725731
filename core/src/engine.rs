use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::*;

/// Valid transitions:
/// - NotStarted -> Playing
/// - Playing -> Won
/// - Playing -> Lost
/// - any -> NotStarted, only through a new game
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// No minefield exists yet, the first open generates it
    #[default]
    NotStarted,
    Playing,
    Lost,
    Won,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and only a new game is accepted
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Player-facing game: the hidden minefield plus the unopened and flagged overlays on top of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    config: GameConfig,
    seeds: SeedSequence,
    minefield: Option<Minefield>,
    unopened: Array2<bool>,
    flagged: Array2<bool>,
    mines_left: isize,
    state: GameState,
    triggered_mine: Option<Coord2>,
}

impl GameEngine {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        let config = GameConfig::new(config.size, config.mines);
        let shape = config.size.to_nd_index();
        Self {
            config,
            seeds: SeedSequence::new(seed),
            minefield: None,
            unopened: Array2::from_elem(shape, true),
            flagged: Array2::from_elem(shape, false),
            mines_left: config.mines as isize,
            state: Default::default(),
            triggered_mine: None,
        }
    }

    /// Starts a game on a prepared minefield instead of generating one on the first open.
    pub fn from_minefield(minefield: Minefield) -> Self {
        let config = GameConfig::new_unchecked(minefield.size(), minefield.mine_count());
        let mut engine = Self::new(config, None);
        engine.config = config;
        engine.mines_left = config.mines as isize;
        engine.minefield = Some(minefield);
        engine.state = GameState::Playing;
        engine
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Seed the engine was created with; successive games use the following values.
    pub fn seed(&self) -> u64 {
        self.seeds.initial()
    }

    /// Mines minus flags, negative when the player placed more flags than there are mines.
    pub fn mines_left(&self) -> isize {
        self.mines_left
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn unopened(&self) -> &Array2<bool> {
        &self.unopened
    }

    pub fn flagged(&self) -> &Array2<bool> {
        &self.flagged
    }

    pub fn unopened_count(&self) -> CellCount {
        self.unopened.iter().filter(|&&unopened| unopened).count() as CellCount
    }

    pub fn minefield(&self) -> Result<&Minefield> {
        self.minefield.as_ref().ok_or(GameError::QueriedBeforeInit)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (x, y) = coords;
        if x < self.config.width() && y < self.config.height() {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds { x, y })
        }
    }

    /// Applies a single interaction. Out-of-bounds coordinates fail without touching the game.
    pub fn interact(&mut self, interaction: Interaction) -> Result<Outcome> {
        use Action::*;

        if interaction.is_targeted() {
            self.validate_coords(interaction.coords())?;
        }

        let outcome = match (interaction.action, self.state) {
            (Open, GameState::NotStarted | GameState::Playing) => self.open(interaction.coords())?,
            (Flag, GameState::Playing) => self.toggle_flag(interaction.coords()),
            (NewGame, _) => {
                self.new_game();
                Outcome::Reset
            }
            (Exit, _) => Outcome::Exit,
            _ => Outcome::NoChange,
        };

        log::trace!("{interaction:?} -> {outcome:?}, state {:?}", self.state);
        Ok(outcome)
    }

    /// Grid handed to renderers: flags and unopened cells on top of the minefield.
    pub fn render_grid(&self) -> Array2<CellState> {
        let interior = self.minefield.as_ref().map(Minefield::interior);
        Array2::from_shape_fn(self.unopened.dim(), |index| {
            if self.flagged[index] {
                CellState::Flagged
            } else if self.unopened[index] {
                CellState::Unopened
            } else {
                interior.as_ref().map_or(CellState::Unopened, |interior| interior[index])
            }
        })
    }

    /// Same as [`Self::render_grid`], but after a loss every mine is shown, the one that ended the
    /// game is marked as exploded and flags on safe cells are marked as wrong.
    pub fn outcome_grid(&self) -> Array2<CellState> {
        let mut grid = self.render_grid();
        if self.state != GameState::Lost {
            return grid;
        }
        let Some(minefield) = &self.minefield else {
            return grid;
        };

        let interior = minefield.interior();
        for (index, cell) in grid.indexed_iter_mut() {
            match (interior[index].is_mine(), self.flagged[index]) {
                (true, false) => *cell = CellState::Mine,
                (false, true) => *cell = CellState::MisflaggedMine,
                _ => {}
            }
        }
        if let Some(coords) = self.triggered_mine {
            grid[coords.to_nd_index()] = CellState::MineExploded;
        }
        grid
    }

    fn is_pristine(&self) -> bool {
        self.unopened.iter().all(|&unopened| unopened)
    }

    fn start(&mut self, coords: Coord2) -> Result<()> {
        let mut rng = self.seeds.next_rng();
        let minefield = Minefield::generate(self.config, coords, &mut rng)?;
        log::debug!("new minefield around {coords:?}:\n{minefield}");
        self.minefield = Some(minefield);
        self.state = GameState::Playing;
        Ok(())
    }

    fn open(&mut self, coords: Coord2) -> Result<Outcome> {
        if self.state.is_initial() {
            if !self.is_pristine() {
                return Ok(Outcome::NoChange);
            }
            self.start(coords)?;
        }

        let index = coords.to_nd_index();
        if self.flagged[index] || !self.unopened[index] {
            return Ok(Outcome::NoChange);
        }

        let cell = self.reveal(coords)?;
        if self.state == GameState::Lost {
            return Ok(Outcome::HitMine);
        }
        if cell.is_zero() {
            self.flood_open(coords)?;
        }

        if self.check_won() {
            self.handle_win();
            Ok(Outcome::Won)
        } else {
            Ok(Outcome::Opened)
        }
    }

    fn reveal(&mut self, coords: Coord2) -> Result<CellState> {
        let cell = self.minefield()?.cell_at(coords)?;
        self.unopened[coords.to_nd_index()] = false;
        if cell.is_mine() {
            log::debug!("mine hit at {coords:?}");
            self.triggered_mine = Some(coords);
            self.state = GameState::Lost;
        }
        Ok(cell)
    }

    /// Opens the zero region containing `seed` together with the numbered cells bordering it.
    fn flood_open(&mut self, seed: Coord2) -> Result<()> {
        let mut visited = BTreeSet::from([seed]);
        let mut to_visit = vec![seed];

        while let Some(coords) = to_visit.pop() {
            self.unopened[coords.to_nd_index()] = false;
            for pos in self.unopened.iter_neighbors(coords) {
                self.unopened[pos.to_nd_index()] = false;
            }

            for pos in self.minefield()?.neighbors_of_type(coords, CellState::Count(0))? {
                if visited.insert(pos) {
                    to_visit.push(pos);
                }
            }
        }

        log::trace!("flood fill from {seed:?} visited {} zero cells", visited.len());
        Ok(())
    }

    fn toggle_flag(&mut self, coords: Coord2) -> Outcome {
        let index = coords.to_nd_index();
        if !self.unopened[index] {
            return Outcome::NoChange;
        }

        let flagged = &mut self.flagged[index];
        *flagged = !*flagged;
        if *flagged {
            self.mines_left -= 1;
        } else {
            self.mines_left += 1;
        }
        Outcome::FlagChanged
    }

    fn check_won(&self) -> bool {
        self.unopened_count() == self.config.mines
    }

    fn handle_win(&mut self) {
        log::debug!("game won");
        self.state = GameState::Won;
        self.flagged.assign(&self.unopened);
        self.mines_left = 0;
    }

    fn new_game(&mut self) {
        self.state = GameState::NotStarted;
        self.mines_left = self.config.mines as isize;
        self.unopened.fill(true);
        self.flagged.fill(false);
        self.minefield = None;
        self.triggered_mine = None;
    }
}
