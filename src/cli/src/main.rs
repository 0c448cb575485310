#![warn(clippy::pedantic)]

mod config;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::{
    eyre::{WrapErr, eyre},
    owo_colors::OwoColorize,
};
use config::Config;
use cubist_core::{
    ColorScheme, CubieState, MoveSequence, PruningTables, SolverKind,
    facelet::parse_cube_with,
    ida::IdaSolver,
    scramble::{self, Pattern},
    tutor::{LayerByLayerSolver, TutorStep},
    two_phase::TwoPhaseSolver,
    validator::ValidationReport,
};
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, info};
use serde::Serialize;
use std::path::PathBuf;

/// Solves, checks, and scrambles 3x3x3 Rubik's Cubes
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The configuration file to use, in TOML format. Defaults to
    /// cubist/config.toml in the user configuration directory.
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    log_level: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a cube given by its stickers or by a scramble
    Solve {
        /// The 54 stickers, face by face in U R F D L B order, each face read
        /// row by row
        #[arg(required_unless_present = "scramble", conflicts_with = "scramble")]
        facelets: Option<String>,
        /// Solve the cube this move sequence produces from the solved cube,
        /// e.g. "R U' F2"
        #[arg(long, short)]
        scramble: Option<String>,
        /// Which solver to use
        #[arg(long, value_enum, default_value_t = SolverArg::Fast)]
        solver: SolverArg,
        /// The longest solution (fast) or deepest search (research) to allow
        #[arg(long)]
        max_length: Option<usize>,
        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Print a TOML report instead of plain text
        #[arg(long)]
        toml: bool,
    },
    /// Check a sticker string and report everything wrong with it
    Validate {
        /// The 54 stickers, in the configured colour scheme
        facelets: String,
    },
    /// Print a random scramble and the stickers it produces
    Scramble {
        /// Number of moves
        #[arg(long, short = 'n', default_value_t = scramble::DEFAULT_LENGTH)]
        length: usize,
        /// Seed for a reproducible scramble
        #[arg(long)]
        seed: Option<u64>,
        /// Print a named pattern instead, e.g. "superflip"
        #[arg(long, conflicts_with_all = ["length", "seed"])]
        pattern: Option<String>,
    },
    /// Print the stickers after applying moves to the solved cube
    Apply {
        /// The move sequence to apply, e.g. "R U' F2"
        moves: String,
    },
    /// Describe the available solvers
    Solvers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolverArg {
    Fast,
    Research,
    Tutor,
}

impl From<SolverArg> for SolverKind {
    fn from(value: SolverArg) -> Self {
        match value {
            SolverArg::Fast => SolverKind::Fast,
            SolverArg::Research => SolverKind::Research,
            SolverArg::Tutor => SolverKind::Tutor,
        }
    }
}

#[derive(Serialize)]
struct SolveReport<'a> {
    solver: SolverKind,
    length: usize,
    moves: &'a MoveSequence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: &'a Vec<TutorStep>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.log_level {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let scheme = config.scheme()?;

    match cli.command {
        Commands::Solve {
            facelets,
            scramble,
            solver,
            max_length,
            timeout_ms,
            toml,
        } => {
            let state = match (facelets, scramble) {
                (_, Some(scramble)) => CubieState::from_moves(
                    &scramble
                        .parse::<MoveSequence>()
                        .wrap_err("The scramble is not a valid move sequence")?,
                ),
                (Some(facelets), None) => parse_cube_with(&facelets, &scheme)?,
                (None, None) => return Err(eyre!("Give either stickers or --scramble")),
            };
            solve(&config, &state, solver.into(), max_length, timeout_ms, toml)?;
        }
        Commands::Validate { facelets } => {
            validate(&facelets, &scheme)?;
        }
        Commands::Scramble {
            length,
            seed,
            pattern,
        } => {
            let moves = match (pattern, seed) {
                (Some(pattern), _) => pattern.parse::<Pattern>()?.moves(),
                (None, Some(seed)) => scramble::generate_seeded(length, seed),
                (None, None) => scramble::generate(length),
            };
            println!("{moves}");
            println!(
                "{}",
                CubieState::from_moves(&moves).to_facelets_with(&scheme)
            );
        }
        Commands::Apply { moves } => {
            let moves: MoveSequence = moves.parse()?;
            println!(
                "{}",
                CubieState::from_moves(&moves).to_facelets_with(&scheme)
            );
        }
        Commands::Solvers => {
            for kind in SolverKind::ALL {
                println!("{}", kind.bold());
                println!("    {}", kind.description());
            }
        }
    }

    Ok(())
}

fn solve(
    config: &Config,
    state: &CubieState,
    kind: SolverKind,
    max_length: Option<usize>,
    timeout_ms: Option<u64>,
    toml: bool,
) -> color_eyre::Result<()> {
    let mut steps = vec![];
    let solution = match kind {
        SolverKind::Fast => {
            let options = config.two_phase_options(max_length, timeout_ms);
            TwoPhaseSolver::new(PruningTables::shared()?).solve(state, &options)?
        }
        SolverKind::Research => {
            let options = config.ida_options(max_length, timeout_ms);
            IdaSolver::new(PruningTables::shared()?).solve_with_progress(
                state,
                &options,
                |progress| {
                    info!(
                        "No solution of {} moves ({} nodes, {:.1}s)",
                        progress.depth,
                        progress.nodes_expanded,
                        progress.elapsed.as_secs_f64()
                    );
                },
            )?
        }
        SolverKind::Tutor => {
            steps = LayerByLayerSolver::new().solve(state)?;
            steps
                .iter()
                .flat_map(|step| step.moves.iter().copied())
                .collect()
        }
    };

    if toml {
        let report = SolveReport {
            solver: kind,
            length: solution.len(),
            moves: &solution,
            steps: &steps,
        };
        print!("{}", toml::to_string(&report)?);
        return Ok(());
    }

    for step in &steps {
        if step.moves.is_empty() {
            println!("{}", step.phase.bold());
        } else {
            println!("{}: {}", step.phase.bold(), step.moves);
        }
        println!("    {}", step.rationale);
    }
    if !steps.is_empty() {
        println!();
    }
    println!("{}", solution.format_wrapped(80, 20));
    let stats = solution.stats();
    eprintln!(
        "{} moves ({} quarter turns, {} half turns)",
        stats.total, stats.quarter_turns, stats.half_turns
    );
    Ok(())
}

fn validate(facelets: &str, scheme: &ColorScheme) -> color_eyre::Result<()> {
    let report = ValidationReport::new(facelets, scheme);
    println!(
        "Colour counts: {}",
        report
            .color_counts
            .iter()
            .map(|(symbol, count)| format!("{symbol}={count}"))
            .join(" ")
    );
    if report.is_valid {
        println!("{}", "Valid cube".green());
        return Ok(());
    }

    for error in &report.errors {
        println!("{} {error}", "error:".red());
    }
    println!(
        "Problematic stickers: {}",
        report.problematic_stickers.iter().join(", ")
    );
    Err(eyre!(
        "The cube is invalid ({} problems)",
        report.errors.len()
    ))
}
