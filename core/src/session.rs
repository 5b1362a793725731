use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::{CellState, GameConfig, GameEngine, GameError, GameState, Interaction};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Replay diverged from the recording at step {step}")]
    Diverged { step: usize },
}

/// Everything observable after one interaction was applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionStep {
    pub interaction: Interaction,
    pub state: GameState,
    pub mines_left: isize,
    pub unopened: Array2<bool>,
    pub flagged: Array2<bool>,
    pub grid: Array2<CellState>,
}

impl SessionStep {
    pub fn capture(interaction: Interaction, engine: &GameEngine) -> Self {
        Self {
            interaction,
            state: engine.state(),
            mines_left: engine.mines_left(),
            unopened: engine.unopened().clone(),
            flagged: engine.flagged().clone(),
            grid: engine.render_grid(),
        }
    }
}

/// Recording of a play session, used as a golden fixture: replaying the interactions against a
/// fresh engine with the same seed has to reproduce every step exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub config: GameConfig,
    pub seed: u64,
    pub steps: Vec<SessionStep>,
}

impl Session {
    /// Starts a recording for `engine`, which must not have received any interaction yet.
    pub fn new(engine: &GameEngine) -> Self {
        Self {
            config: engine.config(),
            seed: engine.seed(),
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, interaction: Interaction, engine: &GameEngine) {
        self.steps.push(SessionStep::capture(interaction, engine));
    }

    pub fn interactions(&self) -> impl Iterator<Item = Interaction> + '_ {
        self.steps.iter().map(|step| step.interaction)
    }

    /// Replays the recorded interactions and checks every step, returning the final engine.
    pub fn replay(&self) -> Result<GameEngine, SessionError> {
        let mut engine = GameEngine::new(self.config, Some(self.seed));
        for (step, expected) in self.steps.iter().enumerate() {
            engine.interact(expected.interaction)?;
            if SessionStep::capture(expected.interaction, &engine) != *expected {
                log::debug!("step {step} differs, expected {expected:?}");
                return Err(SessionError::Diverged { step });
            }
        }
        Ok(engine)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), SessionError> {
        Ok(serde_json::to_writer(writer, self)?)
    }

    pub fn read_from<R: io::Read>(reader: R) -> Result<Self, SessionError> {
        Ok(serde_json::from_reader(reader)?)
    }
}
