use crate::{
    canonical_fsm::{CanonicalFsm, CanonicalFsmState},
    cubie::CubieState,
    moves::{Move, MoveSequence},
    pruning::PruningTables,
    solver::{CancellationToken, Interrupt, SearchBudget, SearchError, SearchProgress},
    start, success, working,
};
use log::{debug, info};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
pub struct IdaOptions {
    /// Deepest bound searched before giving up.
    pub max_depth: usize,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl Default for IdaOptions {
    fn default() -> Self {
        Self {
            max_depth: 25,
            timeout: Some(Duration::from_secs(300)),
            cancel: None,
        }
    }
}

impl IdaOptions {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Searches until a solution is found or `max_depth` is exhausted.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Iterative-deepening A* over all 18 moves. Every heuristic it uses is exact
/// on a projection of the cube, so the first solution found is move-optimal.
#[derive(Debug)]
pub struct IdaSolver {
    tables: Arc<PruningTables>,
    canonical_fsm: CanonicalFsm,
}

struct IdaSearch<'a> {
    solver: &'a IdaSolver,
    root: CubieState,
    budget: SearchBudget<'a>,
    path: Vec<Move>,
}

impl IdaSolver {
    #[must_use]
    pub fn new(tables: Arc<PruningTables>) -> Self {
        Self {
            tables,
            canonical_fsm: CanonicalFsm::new(),
        }
    }

    /// Finds a shortest solution for a validated `state`.
    ///
    /// # Errors
    ///
    /// `DepthLimitExceeded` if every solution is longer than `max_depth`,
    /// `NoSolutionWithinBudget` if the timeout passes first, `Cancelled` if
    /// the token is raised.
    pub fn solve(
        &self,
        state: &CubieState,
        options: &IdaOptions,
    ) -> Result<MoveSequence, SearchError> {
        self.solve_with_progress(state, options, |_| {})
    }

    /// [`IdaSolver::solve`], calling `progress` after every exhausted depth.
    ///
    /// # Errors
    ///
    /// As [`IdaSolver::solve`].
    pub fn solve_with_progress(
        &self,
        state: &CubieState,
        options: &IdaOptions,
        mut progress: impl FnMut(&SearchProgress),
    ) -> Result<MoveSequence, SearchError> {
        info!(start!("Searching for an optimal solution"));
        let start = Instant::now();

        let mut search = IdaSearch {
            solver: self,
            root: *state,
            budget: SearchBudget::new(start, options.timeout, options.cancel.as_ref()),
            path: Vec::with_capacity(options.max_depth),
        };

        let (twist, flip, slice_sorted, corners) =
            (state.twist(), state.flip(), state.slice_sorted(), state.corners());
        let lower_bound = self
            .tables
            .full_heuristic(twist, flip, slice_sorted, corners) as usize;

        for depth in lower_bound..=options.max_depth {
            debug!(working!("Searching depth {}..."), depth);
            let found = search
                .search(
                    twist,
                    flip,
                    slice_sorted,
                    corners,
                    CanonicalFsmState::default(),
                    depth,
                )
                .map_err(|interrupt| match interrupt {
                    Interrupt::Cancelled => SearchError::Cancelled,
                    Interrupt::TimedOut => SearchError::NoSolutionWithinBudget {
                        max_length: options.max_depth,
                    },
                })?;

            if found {
                let solution = MoveSequence::new(search.path);
                info!(
                    success!("Found an optimal {} move solution in {:.3}s"),
                    solution.len(),
                    start.elapsed().as_secs_f64()
                );
                return Ok(solution);
            }

            let report = SearchProgress {
                depth,
                nodes_expanded: search.budget.nodes_expanded,
                elapsed: start.elapsed(),
            };
            debug!(
                working!("Exhausted depth {} after {} nodes"),
                depth,
                report.nodes_expanded
            );
            progress(&report);
        }

        Err(SearchError::DepthLimitExceeded {
            max_depth: options.max_depth,
        })
    }
}

impl IdaSearch<'_> {
    fn search(
        &mut self,
        twist: u16,
        flip: u16,
        slice_sorted: u16,
        corners: u16,
        fsm_state: CanonicalFsmState,
        togo: usize,
    ) -> Result<bool, Interrupt> {
        self.budget.expand()?;
        if togo == 0 {
            // The coordinates miss the edge permutation outside the slice
            return Ok(self
                .root
                .apply_moves(self.path.iter().copied())
                .is_solved());
        }

        let solver = self.solver;
        let moves = solver.tables.moves();
        for move_ in Move::ALL {
            let Some(next_fsm_state) = solver.canonical_fsm.next_state(fsm_state, move_.face)
            else {
                continue;
            };
            let next_twist = moves.twist(twist, move_);
            let next_flip = moves.flip(flip, move_);
            let next_slice = moves.slice_sorted(slice_sorted, move_);
            let next_corners = moves.corners(corners, move_);
            if solver
                .tables
                .full_heuristic(next_twist, next_flip, next_slice, next_corners) as usize
                > togo - 1
            {
                continue;
            }

            self.path.push(move_);
            if self.search(
                next_twist,
                next_flip,
                next_slice,
                next_corners,
                next_fsm_state,
                togo - 1,
            )? {
                return Ok(true);
            }
            self.path.pop();
        }
        Ok(false)
    }
}
