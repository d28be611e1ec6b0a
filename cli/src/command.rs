use minesweeper_core::{CellCount, Coord, Coord2, Difficulty, Intent};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  r X Y      reveal a cell, or chord an opened number
  m X Y      cycle flag / question mark on a cell
  n          new game
  1 2 3      beginner / intermediate / expert
  d NAME     switch to a named difficulty
  c W H M    custom board (W 9-60, H 9-32, M 10+)
  p          pause / resume
  q          toggle question marks
  h          hint a safe cell
  t          switch theme
  s          best times
  ?          this help
  x          exit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Refresh,
    Scores,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}`, type ? for help")]
    Unknown(String),
    #[error("`{command}` expects {expected} arguments")]
    Arity { command: String, expected: usize },
    #[error("Invalid number `{0}`")]
    InvalidNumber(String),
    #[error("Unknown difficulty `{0}`")]
    UnknownDifficulty(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Command::Refresh);
        };
        let args: Vec<&str> = words.collect();

        let arity = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(CommandError::Arity {
                    command: name.to_owned(),
                    expected,
                })
            }
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "r" | "reveal" => {
                arity(2)?;
                Command::Intent(Intent::RevealAt(parse_coords(&args)?))
            }
            "m" | "f" | "mark" => {
                arity(2)?;
                Command::Intent(Intent::MarkAt(parse_coords(&args)?))
            }
            "n" | "new" => Command::Intent(Intent::NewGame),
            "1" => Command::Intent(Intent::SetDifficulty(Difficulty::beginner())),
            "2" => Command::Intent(Intent::SetDifficulty(Difficulty::intermediate())),
            "3" => Command::Intent(Intent::SetDifficulty(Difficulty::expert())),
            "d" | "difficulty" => {
                arity(1)?;
                Command::Intent(Intent::SetDifficulty(parse_difficulty(args[0])?))
            }
            "c" | "custom" => {
                arity(3)?;
                Command::Intent(Intent::ApplyCustom {
                    width: parse_number(args[0])?,
                    height: parse_number(args[1])?,
                    mines: parse_number::<CellCount>(args[2])?,
                })
            }
            "p" | "pause" => Command::Intent(Intent::TogglePause),
            "q" => Command::Intent(Intent::ToggleQuestionMarks),
            "h" | "hint" => Command::Intent(Intent::RequestHint),
            "t" | "theme" => Command::Intent(Intent::CycleTheme),
            "s" | "scores" => Command::Scores,
            "?" | "help" => Command::Help,
            "x" | "exit" | "quit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name.to_owned())),
        };

        Ok(command)
    }
}

pub fn parse_difficulty(name: &str) -> Result<Difficulty, CommandError> {
    Difficulty::from_name(name).ok_or_else(|| CommandError::UnknownDifficulty(name.to_owned()))
}

fn parse_coords(args: &[&str]) -> Result<Coord2, CommandError> {
    Ok((parse_number::<Coord>(args[0])?, parse_number::<Coord>(args[1])?))
}

/// Oversized values saturate so the session can clamp them.
fn parse_number<T: TryFrom<u64> + Bounded>(word: &str) -> Result<T, CommandError> {
    let value: u64 = word
        .parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_owned()))?;
    Ok(T::try_from(value).unwrap_or(T::MAX))
}

trait Bounded {
    const MAX: Self;
}

impl Bounded for u8 {
    const MAX: Self = u8::MAX;
}

impl Bounded for u16 {
    const MAX: Self = u16::MAX;
}
