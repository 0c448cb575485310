use serde::Serialize;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("No solution of at most {max_length} moves was found within the search budget")]
    NoSolutionWithinBudget { max_length: usize },
    #[error("No solution of at most {max_depth} moves exists")]
    DepthLimitExceeded { max_depth: usize },
    #[error("The search was cancelled")]
    Cancelled,
}

/// A flag another thread can raise to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a search stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Cancelled,
    TimedOut,
}

/// The per-search bookkeeping both search solvers check at every node.
#[derive(Debug)]
pub(crate) struct SearchBudget<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a CancellationToken>,
    pub(crate) nodes_expanded: u64,
}

impl<'a> SearchBudget<'a> {
    pub(crate) fn new(
        start: Instant,
        timeout: Option<Duration>,
        cancel: Option<&'a CancellationToken>,
    ) -> Self {
        Self {
            deadline: timeout.and_then(|timeout| start.checked_add(timeout)),
            cancel,
            nodes_expanded: 0,
        }
    }

    /// Counts one node expansion.
    pub(crate) fn expand(&mut self) -> Result<(), Interrupt> {
        self.nodes_expanded += 1;
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(Interrupt::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(Interrupt::TimedOut);
        }
        Ok(())
    }
}

/// Reported by [`crate::ida::IdaSolver::solve_with_progress`] after every
/// finished depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchProgress {
    pub depth: usize,
    pub nodes_expanded: u64,
    pub elapsed: Duration,
}

/// The three solvers, as a front end lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Fast,
    Research,
    Tutor,
}

impl SolverKind {
    pub const ALL: [SolverKind; 3] = [SolverKind::Fast, SolverKind::Research, SolverKind::Tutor];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Fast => "Fast (two-phase)",
            SolverKind::Research => "Research (IDA*)",
            SolverKind::Tutor => "Tutor (layer by layer)",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            SolverKind::Fast => {
                "Kociemba's two-phase algorithm. Finds solutions of about 20-25 moves in well under a second."
            }
            SolverKind::Research => {
                "Iterative-deepening A* over all 18 moves. Finds move-optimal solutions but may take minutes on deep scrambles."
            }
            SolverKind::Tutor => {
                "The beginner's layer-by-layer method, one explained step at a time. Long solutions, easy to follow."
            }
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_budget_interrupts() {
        let token = CancellationToken::new();
        let mut budget = SearchBudget::new(Instant::now(), None, Some(&token));
        assert_eq!(budget.expand(), Ok(()));
        token.cancel();
        assert_eq!(budget.expand(), Err(Interrupt::Cancelled));
        assert_eq!(budget.nodes_expanded, 2);

        let mut budget = SearchBudget::new(Instant::now(), Some(Duration::ZERO), None);
        assert_eq!(budget.expand(), Err(Interrupt::TimedOut));
    }

    #[test]
    fn test_solver_kinds() {
        assert_eq!(SolverKind::ALL.len(), 3);
        assert_eq!(SolverKind::Research.to_string(), "Research (IDA*)");
        assert!(SolverKind::Fast.description().contains("two-phase"));
    }
}
