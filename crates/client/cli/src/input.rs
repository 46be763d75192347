//! Line-oriented command parsing.
use anyhow::{Context, Result, bail};
use tactics_core::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Feed one selected cell to the session.
    Select(Position),
    EndTurn,
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  <x> <y> | select <x> <y>   select a cell
  end                        end the player turn
  board                      redraw the board
  help                       this text
  quit                       leave";

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "end" | "e" => Command::EndTurn,
        "board" | "b" => Command::Board,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "select" | "s" => Command::Select(coordinates(words.next(), words.next())?),
        _ => Command::Select(coordinates(Some(head), words.next())?),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected '{extra}'");
    }
    Ok(Some(command))
}

fn coordinates(x: Option<&str>, y: Option<&str>) -> Result<Position> {
    let (Some(x), Some(y)) = (x, y) else {
        bail!("expected two coordinates, try 'help'");
    };
    let x = x.parse().with_context(|| format!("bad x coordinate '{x}'"))?;
    let y = y.parse().with_context(|| format!("bad y coordinate '{y}'"))?;
    Ok(Position::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_prefixed_coordinates_select() {
        assert_eq!(
            parse("3 -1").unwrap(),
            Some(Command::Select(Position::new(3, -1)))
        );
        assert_eq!(
            parse("  select 0 4 ").unwrap(),
            Some(Command::Select(Position::new(0, 4)))
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse("END").unwrap(), Some(Command::EndTurn));
        assert_eq!(parse("q").unwrap(), Some(Command::Quit));
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse("select 1").is_err());
        assert!(parse("x 2").is_err());
        assert!(parse("end now").is_err());
    }
}
