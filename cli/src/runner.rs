use anyhow::anyhow;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use sweeper_core::{Action, GameEngine, Interaction, Outcome, Session};

use crate::command::{self, USAGE};
use crate::render::{self, Snapshot};

/// Interactions waiting for the engine; the reader blocks once this many are queued.
pub const QUEUE_CAPACITY: usize = 100;

#[derive(Default)]
struct Frame {
    pending: Option<Snapshot>,
    closed: bool,
}

/// Hands finished snapshots from the engine loop to the renderer.
#[derive(Default)]
struct Redraw {
    frame: Mutex<Frame>,
    signal: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Redraw {
    fn publish(&self, snapshot: Snapshot) {
        lock(&self.frame).pending = Some(snapshot);
        self.signal.notify_one();
    }

    fn close(&self) {
        lock(&self.frame).closed = true;
        self.signal.notify_one();
    }

    /// Waits at most `interval` for a new snapshot. Returns the snapshot, if any, and whether the
    /// engine is done.
    fn next_frame(&self, interval: Duration) -> (Option<Snapshot>, bool) {
        let guard = lock(&self.frame);
        let (mut frame, _) = self
            .signal
            .wait_timeout_while(guard, interval, |frame| {
                frame.pending.is_none() && !frame.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        (frame.pending.take(), frame.closed)
    }
}

/// Runs the game until an exit command or the end of `input`.
///
/// Input is read on its own thread and queued, the renderer draws on another thread, and the engine
/// applies one interaction at a time on the calling thread, publishing a snapshot only once an
/// interaction is fully applied.
pub fn run<R, W>(
    engine: &mut GameEngine,
    input: R,
    output: W,
    session: Option<&mut Session>,
    frame_interval: Duration,
) -> anyhow::Result<()>
where
    R: BufRead + Send,
    W: Write + Send,
{
    let (sender, receiver) = mpsc::sync_channel(QUEUE_CAPACITY);
    let redraw = Redraw::default();
    let redraw = &redraw;

    thread::scope(|scope| -> anyhow::Result<()> {
        scope.spawn(move || read_interactions(input, sender));
        let renderer = scope.spawn(move || draw_frames(redraw, output, frame_interval));

        redraw.publish(Snapshot::capture(engine));
        apply_interactions(engine, receiver, redraw, session);
        redraw.close();

        renderer
            .join()
            .map_err(|_| anyhow!("Renderer thread panicked"))??;
        Ok(())
    })
}

fn read_interactions<R: BufRead>(input: R, sender: SyncSender<Interaction>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("Could not read input: {err}");
                break;
            }
        };

        match command::parse_line(&line) {
            Ok(Some(interaction)) => {
                let exit = interaction.action == Action::Exit;
                if sender.send(interaction).is_err() || exit {
                    return;
                }
            }
            Ok(None) => {}
            Err(err) => eprintln!("{err}; {USAGE}"),
        }
    }

    log::debug!("input closed");
    let _ = sender.send(Interaction::exit());
}

fn apply_interactions(
    engine: &mut GameEngine,
    receiver: Receiver<Interaction>,
    redraw: &Redraw,
    mut session: Option<&mut Session>,
) {
    for interaction in receiver {
        let outcome = match engine.interact(interaction) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Dropped {interaction:?}: {err}");
                redraw.publish(Snapshot::capture(engine).with_message(err.to_string()));
                continue;
            }
        };

        if let Some(session) = session.as_deref_mut() {
            session.record(interaction, engine);
        }

        match outcome {
            Outcome::Exit => break,
            outcome if outcome.has_update() => redraw.publish(Snapshot::capture(engine)),
            _ => {}
        }
    }
}

fn draw_frames<W: Write>(redraw: &Redraw, mut output: W, interval: Duration) -> io::Result<()> {
    loop {
        let (pending, closed) = redraw.next_frame(interval);
        if let Some(snapshot) = pending {
            render::draw(&mut output, &snapshot)?;
            output.flush()?;
        }
        if closed {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use sweeper_core::{GameConfig, GameState};

    const FRAME: Duration = Duration::from_millis(5);

    fn play(input: &str, session: &mut Session, engine: &mut GameEngine) -> String {
        let mut output = Vec::new();
        run(engine, Cursor::new(input.to_owned()), &mut output, Some(session), FRAME).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn applies_commands_and_records_them() {
        let mut engine = GameEngine::new(GameConfig::new((9, 9), 10), Some(1));
        let mut session = Session::new(&engine);

        let output = play("o 4 4\n\nf 0 0\nq\no 1 1\n", &mut session, &mut engine);

        assert_ne!(engine.state(), GameState::NotStarted);
        let actions: Vec<_> = session.interactions().map(|i| i.action).collect();
        assert_eq!(actions, vec![Action::Open, Action::Flag, Action::Exit]);
        session.replay().unwrap();

        let mut last_frame = Vec::new();
        render::draw(&mut last_frame, &Snapshot::capture(&engine)).unwrap();
        assert!(output.ends_with(&String::from_utf8(last_frame).unwrap()));
    }

    #[test]
    fn out_of_bounds_moves_are_dropped() {
        let mut engine = GameEngine::new(GameConfig::new((5, 5), 3), Some(2));
        let mut session = Session::new(&engine);

        let output = play("o 9 9\nq\n", &mut session, &mut engine);

        assert_eq!(engine.state(), GameState::NotStarted);
        assert_eq!(session.steps.len(), 1);
        assert!(output.contains("Out of bounds: x=9, y=9"));
    }

    #[test]
    fn end_of_input_stops_the_game() {
        let mut engine = GameEngine::new(GameConfig::new((5, 5), 3), Some(2));
        let mut session = Session::new(&engine);

        play("o 2 2\n", &mut session, &mut engine);

        assert_eq!(session.steps.last().unwrap().interaction, Interaction::exit());
    }

    #[test]
    fn redraw_returns_latest_snapshot_then_closes() {
        let engine = GameEngine::new(GameConfig::new((3, 3), 1), Some(1));
        let redraw = Redraw::default();

        redraw.publish(Snapshot::capture(&engine).with_message("first"));
        redraw.publish(Snapshot::capture(&engine).with_message("second"));
        let (pending, closed) = redraw.next_frame(FRAME);
        assert_eq!(pending.unwrap().message.as_deref(), Some("second"));
        assert!(!closed);

        assert_eq!(redraw.next_frame(FRAME), (None, false));

        redraw.close();
        assert_eq!(redraw.next_frame(FRAME), (None, true));
    }
}
