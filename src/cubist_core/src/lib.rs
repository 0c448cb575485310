#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

//! The cube-solving engine: a cubie-level model of the 3x3x3 Rubik's Cube,
//! conversions to and from sticker strings, and three solvers built on top of
//! it.
//!
//! - [`two_phase::TwoPhaseSolver`] finds short solutions quickly.
//! - [`ida::IdaSolver`] finds move-optimal solutions slowly.
//! - [`tutor::LayerByLayerSolver`] explains a beginner's method step by step.

pub mod canonical_fsm;
pub mod coord;
pub mod cubie;
pub mod facelet;
pub mod ida;
pub mod moves;
pub mod pruning;
pub mod scramble;
pub mod solver;
pub mod tutor;
pub mod two_phase;
pub mod validator;

use thiserror::Error;

pub use cubie::CubieState;
pub use facelet::{ColorScheme, parse_cube};
pub use moves::{Face, Move, MoveSequence, Turn};
pub use pruning::PruningTables;
pub use solver::{CancellationToken, SearchError, SolverKind};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// Every failure the engine can report, for callers that do not care which
/// stage produced it.
#[derive(Error, Debug)]
pub enum CubistError {
    #[error(transparent)]
    Validation(#[from] validator::ValidationError),
    #[error(transparent)]
    ParseMove(#[from] moves::ParseMoveError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    TableBuild(#[from] pruning::TableBuildError),
    #[error(transparent)]
    Tutor(#[from] tutor::TutorError),
}

const FACT_UNTIL_12: [u32; 13] = {
    let mut arr = [0; 13];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u32;
        i += 1;
    }
    arr
};

/// Binomial coefficient, zero when `k > n`.
const fn n_choose_k(n: usize, k: usize) -> u32 {
    if k > n {
        return 0;
    }
    FACT_UNTIL_12[n] / (FACT_UNTIL_12[k] * FACT_UNTIL_12[n - k])
}
