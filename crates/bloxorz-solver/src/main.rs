//! CLI entry point for the Bloxorz solver.
//!
//! Usage:
//!   bloxorz-solver solve <puzzles.json> [options]
//!   bloxorz-solver solve --stdin [options]
//!   bloxorz-solver check <puzzles.json>
//!
//! Options:
//!   --index <n>   Only solve the n-th puzzle of the file (0-based)
//!   --path        Print every state on the solution path
//!   --show        Draw the board at every step of the solution
//!   --json        Print the results as JSON
//!   --verbose     Debug logging (RUST_LOG is honoured otherwise)
//!
//! Exit code is 0 when every puzzle loaded and solved, 1 when one did not,
//! 2 when the input could not be read.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde::Serialize;

use bloxorz_solver::{parse_puzzles, solve, Board, Move, PuzzleConfig, SearchStats, Solution};

#[derive(Parser)]
#[command(name = "bloxorz-solver")]
#[command(about = "Shortest-move solver for Bloxorz block puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Input {
    /// Path to a puzzle JSON file (use --stdin to read from stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Read puzzles from stdin instead of a file
    #[arg(long)]
    stdin: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve every puzzle in the file
    Solve {
        #[command(flatten)]
        input: Input,

        /// Only solve the puzzle at this index (0-based)
        #[arg(long)]
        index: Option<usize>,

        /// Print every state on the solution path
        #[arg(long)]
        path: bool,

        /// Draw the board at every step
        #[arg(long)]
        show: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load and validate puzzles without solving them
    Check {
        #[command(flatten)]
        input: Input,
    },
}

/// Per-puzzle result for JSON output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PuzzleOutput {
    name: String,
    passcode: String,
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    moves: Vec<Move>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SearchStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl PuzzleOutput {
    fn solved(config: &PuzzleConfig, solution: &Solution) -> Self {
        Self {
            name: config.name.clone(),
            passcode: config.passcode.clone(),
            solved: true,
            move_count: Some(solution.move_count()),
            moves: solution.moves.clone(),
            stats: Some(solution.stats.clone()),
            error: None,
        }
    }

    fn failed(config: &PuzzleConfig, stats: Option<SearchStats>, error: String) -> Self {
        Self {
            name: config.name.clone(),
            passcode: config.passcode.clone(),
            solved: false,
            move_count: None,
            moves: Vec::new(),
            stats,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PrintOptions {
    path: bool,
    show: bool,
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Returns whether every selected puzzle loaded (and solved, for `solve`)
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Solve {
            input,
            index,
            path,
            show,
            json,
        } => {
            let puzzles = load_puzzles(&input)?;
            let selected: Vec<&PuzzleConfig> = match index {
                Some(i) => vec![puzzles.get(i).with_context(|| {
                    format!("puzzle index {i} out of range ({} puzzles)", puzzles.len())
                })?],
                None => puzzles.iter().collect(),
            };

            let options = PrintOptions { path, show, json };
            let outputs: Vec<PuzzleOutput> = selected
                .into_iter()
                .map(|config| solve_one(config, options))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                let total: usize = outputs.iter().filter_map(|o| o.move_count).sum();
                println!("total_moves = {total}");
            }

            Ok(outputs.iter().all(|o| o.solved))
        }
        Commands::Check { input } => {
            let puzzles = load_puzzles(&input)?;
            let mut all_valid = true;
            for config in &puzzles {
                match Board::from_config(config) {
                    Ok(board) => println!(
                        "{}: {}x{} grid, {} bridges, {} switches, {} teleports",
                        board.name(),
                        board.rows(),
                        board.cols(),
                        board.bridge_count(),
                        board.switches().len(),
                        board.teleports().len()
                    ),
                    Err(e) => {
                        println!("{}: invalid puzzle: {e}", config.name);
                        all_valid = false;
                    }
                }
            }
            Ok(all_valid)
        }
    }
}

fn load_puzzles(input: &Input) -> Result<Vec<PuzzleConfig>> {
    let json = if input.stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        buffer
    } else if let Some(path) = &input.file {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        bail!("must provide either a file path or --stdin");
    };

    parse_puzzles(&json).context("failed to parse puzzle JSON")
}

fn solve_one(config: &PuzzleConfig, options: PrintOptions) -> PuzzleOutput {
    if !options.json {
        println!("Solving {} (passcode = {})", config.name, config.passcode);
    }

    let board = match Board::from_config(config) {
        Ok(board) => board,
        Err(e) => {
            warn!("{}: {e}", config.name);
            if !options.json {
                println!("invalid puzzle: {e}");
            }
            return PuzzleOutput::failed(config, None, e.to_string());
        }
    };

    match solve(&board) {
        Ok(solution) => {
            if !options.json {
                println!("moves: {}", solution.move_count());
                if options.path || options.show {
                    print_solution(&board, &solution, options.show);
                }
            }
            PuzzleOutput::solved(config, &solution)
        }
        Err(e) => {
            if !options.json {
                println!("{e}");
            }
            PuzzleOutput::failed(config, Some(e.stats.clone()), e.to_string())
        }
    }
}

fn print_solution(board: &Board, solution: &Solution, show: bool) {
    for (i, state) in solution.states.iter().enumerate() {
        let step = match i {
            0 => "start".to_string(),
            _ => solution.moves[i - 1].to_string(),
        };
        println!("{i:>3}: {step:<17} {state}");
        if show {
            println!("{}", board.render(state));
        }
    }
}
