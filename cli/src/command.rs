use sweeper_core::{Coord, Interaction};
use thiserror::Error;

pub const USAGE: &str = "commands: o X Y (open), f X Y (flag), n (new game), q (quit)";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command {0:?}")]
    Unknown(String),
    #[error("Missing coordinate")]
    MissingCoordinate,
    #[error("Invalid coordinate {0:?}")]
    InvalidCoordinate(String),
    #[error("Unexpected input {0:?}")]
    Trailing(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Interaction>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let interaction = match command.to_ascii_lowercase().as_str() {
        "o" | "open" => Interaction::open(parse_coords(&mut words)?),
        "f" | "flag" => Interaction::flag(parse_coords(&mut words)?),
        "n" | "new" => Interaction::new_game(),
        "q" | "quit" | "exit" => Interaction::exit(),
        other => return Err(CommandError::Unknown(other.to_owned())),
    };

    match words.next() {
        Some(extra) => Err(CommandError::Trailing(extra.to_owned())),
        None => Ok(Some(interaction)),
    }
}

fn parse_coords<'a>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<(Coord, Coord), CommandError> {
    let x = parse_coord(words.next())?;
    let y = parse_coord(words.next())?;
    Ok((x, y))
}

fn parse_coord(word: Option<&str>) -> Result<Coord, CommandError> {
    let word = word.ok_or(CommandError::MissingCoordinate)?;
    word.parse()
        .map_err(|_| CommandError::InvalidCoordinate(word.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::Action;

    #[test]
    fn parses_targeted_commands() {
        assert_eq!(parse_line("o 3 4"), Ok(Some(Interaction::open((3, 4)))));
        assert_eq!(parse_line("  FLAG 0 15 "), Ok(Some(Interaction::flag((0, 15)))));
    }

    #[test]
    fn parses_untargeted_commands() {
        assert_eq!(parse_line("n").unwrap().unwrap().action, Action::NewGame);
        assert_eq!(parse_line("quit").unwrap().unwrap().action, Action::Exit);
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line("x 1 1"), Err(CommandError::Unknown("x".into())));
        assert_eq!(parse_line("o 1"), Err(CommandError::MissingCoordinate));
        assert_eq!(parse_line("o -1 2"), Err(CommandError::InvalidCoordinate("-1".into())));
        assert_eq!(parse_line("f 1 300"), Err(CommandError::InvalidCoordinate("300".into())));
        assert_eq!(parse_line("n now"), Err(CommandError::Trailing("now".into())));
    }
}
