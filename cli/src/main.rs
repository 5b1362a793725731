use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweeper_core::{CellCount, Coord, GameConfig, GameEngine, Session};

mod command;
mod render;
mod runner;

const WIDTH_RANGE: (i64, i64) = (3, 30);
const HEIGHT_RANGE: (i64, i64) = (3, 16);
const MINES_RANGE: (i64, i64) = (0, 99);

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// The width of the grid, clamped to 3..=30
    #[arg(default_value_t = 30, allow_negative_numbers = true)]
    width: i64,

    /// The height of the grid, clamped to 3..=16
    #[arg(default_value_t = 16, allow_negative_numbers = true)]
    height: i64,

    /// The amount of mines, clamped to 0..=99
    #[arg(default_value_t = 99, allow_negative_numbers = true)]
    mines: i64,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Save the session to this file when the game exits
    #[arg(short, long, conflicts_with = "replay")]
    record: Option<PathBuf>,

    /// Check that a saved session still plays out the same, then exit
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Upper bound on the time between two frames, in milliseconds
    #[arg(long, default_value_t = 1000)]
    frame_ms: u64,

    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        let clamp = |value: i64, (min, max): (i64, i64)| value.clamp(min, max);
        let width = clamp(self.width, WIDTH_RANGE) as Coord;
        let height = clamp(self.height, HEIGHT_RANGE) as Coord;
        let mines = clamp(self.mines, MINES_RANGE) as CellCount;
        GameConfig::new((width, height), mines)
    }
}

fn replay(path: &Path) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let session = Session::read_from(BufReader::new(file))
        .with_context(|| format!("Could not read session {}", path.display()))?;
    let engine = session
        .replay()
        .with_context(|| format!("Session {} no longer replays", path.display()))?;
    println!(
        "{}: {} steps replayed, final state {:?}",
        path.display(),
        session.steps.len(),
        engine.state()
    );
    Ok(())
}

fn play(args: &Args) -> anyhow::Result<()> {
    let config = args.game_config();
    let mut engine = GameEngine::new(config, args.seed);
    log::info!(
        "{}x{} with {} mines, seed {}",
        config.width(),
        config.height(),
        config.mines,
        engine.seed()
    );

    let mut session = args.record.as_ref().map(|_| Session::new(&engine));

    eprintln!("{}", command::USAGE);
    runner::run(
        &mut engine,
        BufReader::new(io::stdin()),
        io::stdout(),
        session.as_mut(),
        Duration::from_millis(args.frame_ms.max(1)),
    )?;

    if let (Some(path), Some(session)) = (&args.record, &session) {
        let file = File::create(path)
            .with_context(|| format!("Could not create {}", path.display()))?;
        session
            .write_to(BufWriter::new(file))
            .with_context(|| format!("Could not write session to {}", path.display()))?;
        log::info!("session saved to {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("args: {args:?}");

    match &args.replay {
        Some(path) => replay(path),
        None => play(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> GameConfig {
        Args::try_parse_from(std::iter::once("sweeper").chain(args.iter().copied()))
            .unwrap()
            .game_config()
    }

    #[test]
    fn defaults_to_expert_board() {
        assert_eq!(config(&[]), GameConfig::new((30, 16), 99));
    }

    #[test]
    fn clamps_out_of_range_arguments() {
        assert_eq!(config(&["100", "1", "500"]), GameConfig::new((30, 3), 89));
        assert_eq!(config(&["-4", "20", "-1"]), GameConfig::new((3, 16), 0));
        assert_eq!(config(&["3", "3", "99"]).mines, 8);
    }

    #[test]
    fn record_and_replay_are_exclusive() {
        let args = ["sweeper", "--record", "a.json", "--replay", "b.json"];
        assert!(Args::try_parse_from(args).is_err());
    }

    #[test]
    fn seed_and_verbosity_are_parsed() {
        let args =
            Args::try_parse_from(["sweeper", "9", "9", "10", "--seed", "42", "-vv"]).unwrap();
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.verbose.log_level_filter(), log::LevelFilter::Info);
    }
}
