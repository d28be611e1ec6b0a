use anyhow::Context;
use clap::Parser;
use minesweeper_core::{Difficulty, JsonFileStore, Session, SystemClock};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use command::{Command, HELP, parse_difficulty};

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Classic Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty to start with
    #[arg(short, long, default_value = "beginner", value_parser = parse_difficulty)]
    difficulty: Difficulty,

    /// Where best times are kept
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Cycle marks between flag and none only
    #[arg(long)]
    no_question_marks: bool,
}

/// `$XDG_CONFIG_HOME/minesweeper/scores.json`, else under `~/.config`, else the working directory.
fn default_scores_path() -> PathBuf {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));

    match config_dir {
        Some(dir) => dir.join("minesweeper").join(JsonFileStore::FILE_NAME),
        None => PathBuf::from("minesweeper_scores.json"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);

    let store = JsonFileStore::new(args.scores.unwrap_or_else(default_scores_path));
    log::debug!("scores: {:?}", store.path());

    let mut session = Session::new(args.difficulty, store, SystemClock, seed);
    if args.no_question_marks {
        session.toggle_question_marks();
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{HELP}\n")?;
    write!(stdout, "{}> ", render::render(&session.snapshot()))?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line.context("Could not read command")?;
        session.tick();

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Intent(intent)) => {
                session.apply(intent);
            }
            Ok(Command::Refresh) => {}
            Ok(Command::Scores) => {
                for score_line in render::score_lines(session.best_scores()) {
                    writeln!(stdout, "{score_line}")?;
                }
            }
            Ok(Command::Help) => writeln!(stdout, "{HELP}")?,
            Err(err) => writeln!(stdout, "{err}")?,
        }

        session.tick();
        write!(stdout, "{}> ", render::render(&session.snapshot()))?;
        stdout.flush()?;
    }

    log::debug!("bye");
    Ok(())
}
