use ndarray::Array2;
use std::io::{self, Write};
use sweeper_core::{CellState, GameEngine, GameState};

/// What the renderer needs to draw one frame, taken after an interaction was fully applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub grid: Array2<CellState>,
    pub state: GameState,
    pub mines_left: isize,
    pub message: Option<String>,
}

impl Snapshot {
    pub fn capture(engine: &GameEngine) -> Self {
        Self {
            grid: engine.outcome_grid(),
            state: engine.state(),
            mines_left: engine.mines_left(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn state_label(state: GameState) -> &'static str {
    match state {
        GameState::NotStarted => "ready",
        GameState::Playing => "playing",
        GameState::Lost => "lost",
        GameState::Won => "won",
    }
}

pub fn draw<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    writeln!(
        out,
        "mines left: {}  state: {}",
        snapshot.mines_left,
        state_label(snapshot.state)
    )?;

    write!(out, "   ")?;
    for x in 0..snapshot.grid.ncols() {
        write!(out, "{x:>3}")?;
    }
    writeln!(out)?;

    for (y, row) in snapshot.grid.rows().into_iter().enumerate() {
        write!(out, "{y:>3}")?;
        for cell in row {
            write!(out, "{cell:>3}")?;
        }
        writeln!(out)?;
    }

    if let Some(message) = &snapshot.message {
        writeln!(out, "{message}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::{GameConfig, Interaction, Minefield};

    fn render(snapshot: &Snapshot) -> String {
        let mut out = Vec::new();
        draw(&mut out, snapshot).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn draws_untouched_board() {
        let engine = GameEngine::new(GameConfig::new((3, 3), 1), Some(1));

        let text = render(&Snapshot::capture(&engine));

        assert_eq!(
            text,
            "mines left: 1  state: ready\n     0  1  2\n  0  #  #  #\n  1  #  #  #\n  2  #  #  #\n"
        );
    }

    #[test]
    fn draws_lost_board_with_message() {
        let minefield = Minefield::from_mine_coords((3, 1), &[(0, 0)]).unwrap();
        let mut engine = GameEngine::from_minefield(minefield);
        engine.interact(Interaction::flag((2, 0))).unwrap();
        engine.interact(Interaction::open((0, 0))).unwrap();

        let text = render(&Snapshot::capture(&engine).with_message("boom"));

        assert_eq!(text, "mines left: 0  state: lost\n     0  1  2\n  0  X  #  !\nboom\n");
    }
}
