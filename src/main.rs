//! Blockfall
//!
//! Checks instruction streams for a falling-block puzzle, converts moves
//! entered by hand into instructions, or plays the puzzle automatically, and
//! reports the resulting statistics. With `--view` the run can be replayed
//! in a 3D viewer once it has ended.

mod visualization;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use blockfall::search::DEFAULT_DEPTH;
use blockfall::{
    manual, player, Game, Headless, Interpreter, Observer, RunReport, SearchConfig, Weights,
};

/// Checks or plays a falling-block puzzle.
#[derive(Parser)]
#[command(name = "blockfall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding game.txt and the piece files 0.txt to 9.txt.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Replay the run in a 3D viewer after it ends.
    #[arg(long)]
    view: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read instructions from stdin and print the resulting statistics.
    Check,
    /// Read moves (`<rotation> <xpos>` or `discard`) from stdin, writing
    /// instructions to stdout and statistics to stderr.
    Manual,
    /// Play the game, writing instructions to stdout and statistics to stderr.
    Play {
        /// Number of pieces to look ahead.
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: u32,
        #[arg(long, default_value_t = 1)]
        score_weight: i64,
        #[arg(long, default_value_t = 1)]
        transition_weight: i64,
        #[arg(long, default_value_t = 1)]
        height_weight: i64,
        /// Search the first ply on all cores.
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command. Returns whether the game ended without error.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let game = load_game(&cli.dir)?;
    let mut observer: Box<dyn Observer> = if cli.view {
        Box::new(visualization::Viewer::new())
    } else {
        Box::new(Headless)
    };

    let success = match cli.command {
        Command::Check => {
            let report = Interpreter::new(&game).run(io::stdin().lock(), observer.as_mut());
            finish(&report, &mut io::stdout().lock())?
        }
        Command::Manual => {
            let report = manual::run(
                &game,
                io::stdin().lock(),
                &mut io::stdout().lock(),
                observer.as_mut(),
            );
            finish(&report, &mut io::stderr().lock())?
        }
        Command::Play {
            depth,
            score_weight,
            transition_weight,
            height_weight,
            parallel,
        } => {
            let config = SearchConfig {
                depth,
                weights: Weights {
                    score: score_weight,
                    transitions: transition_weight,
                    height: height_weight,
                },
                parallel,
            };
            let report = player::play(&game, &config, &mut io::stdout().lock(), observer.as_mut());
            finish(&report, &mut io::stderr().lock())?
        }
    };

    observer.wait();
    Ok(success)
}

fn load_game(dir: &Path) -> anyhow::Result<Game> {
    Game::load(dir).with_context(|| format!("cannot load game from {}", dir.display()))
}

/// Logs the failure, if any, and writes the statistics to `out`.
fn finish<W: Write>(report: &RunReport, out: &mut W) -> io::Result<bool> {
    if let Some(e) = &report.error {
        log::error!("{e}");
        log::debug!("field at failure:\n{}", report.field);
    }
    write!(out, "{}", report.stats)?;
    out.flush()?;
    Ok(report.is_success())
}
