use crate::{
    canonical_fsm::{CanonicalFsm, CanonicalFsmState},
    cubie::CubieState,
    moves::{Move, MoveSequence},
    pruning::PruningTables,
    solver::{CancellationToken, Interrupt, SearchBudget, SearchError},
    start, success, working,
};
use log::{debug, info};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
pub struct TwoPhaseOptions {
    /// Longest total solution accepted.
    pub max_length: usize,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl Default for TwoPhaseOptions {
    fn default() -> Self {
        Self {
            max_length: 30,
            timeout: None,
            cancel: None,
        }
    }
}

impl TwoPhaseOptions {
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

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

/// Kociemba's two-phase algorithm. Phase 1 brings the cube into
/// G1 = <U, D, R2, L2, F2, B2>, where every piece is oriented and the middle
/// slice edges are in the middle slice; phase 2 solves it using only moves
/// that stay in G1.
#[derive(Debug)]
pub struct TwoPhaseSolver {
    tables: Arc<PruningTables>,
    canonical_fsm: CanonicalFsm,
    g1_moves: Vec<Move>,
}

struct TwoPhaseSearch<'a> {
    solver: &'a TwoPhaseSolver,
    root: CubieState,
    max_length: usize,
    budget: SearchBudget<'a>,
    phase1: Vec<Move>,
    phase2: Vec<Move>,
}

impl TwoPhaseSolver {
    #[must_use]
    pub fn new(tables: Arc<PruningTables>) -> Self {
        Self {
            tables,
            canonical_fsm: CanonicalFsm::new(),
            g1_moves: Move::ALL.into_iter().filter(|move_| move_.is_g1()).collect(),
        }
    }

    /// Finds a solution for a validated `state`: the first one found while
    /// deepening phase 1 and, for each G1 state phase 1 reaches, deepening
    /// phase 2. Short, but not necessarily optimal.
    ///
    /// # Errors
    ///
    /// `NoSolutionWithinBudget` if no solution within `max_length` exists or
    /// the timeout passes first, `Cancelled` if the token is raised.
    pub fn solve(
        &self,
        state: &CubieState,
        options: &TwoPhaseOptions,
    ) -> Result<MoveSequence, SearchError> {
        info!(start!("Searching for a two-phase solution"));
        let start = Instant::now();

        let mut search = TwoPhaseSearch {
            solver: self,
            root: *state,
            max_length: options.max_length,
            budget: SearchBudget::new(start, options.timeout, options.cancel.as_ref()),
            phase1: Vec::with_capacity(options.max_length),
            phase2: Vec::with_capacity(options.max_length),
        };

        match search.run() {
            Ok(true) => {
                let solution: MoveSequence = search
                    .phase1
                    .iter()
                    .chain(&search.phase2)
                    .copied()
                    .collect();
                debug!(
                    working!("Expanded {} nodes"),
                    search.budget.nodes_expanded
                );
                info!(
                    success!("Found a {} move solution ({} + {}) in {:.3}s"),
                    solution.len(),
                    search.phase1.len(),
                    search.phase2.len(),
                    start.elapsed().as_secs_f64()
                );
                Ok(solution)
            }
            Ok(false) | Err(Interrupt::TimedOut) => Err(SearchError::NoSolutionWithinBudget {
                max_length: options.max_length,
            }),
            Err(Interrupt::Cancelled) => Err(SearchError::Cancelled),
        }
    }
}

impl TwoPhaseSearch<'_> {
    fn run(&mut self) -> Result<bool, Interrupt> {
        let (twist, flip, slice_sorted) =
            (self.root.twist(), self.root.flip(), self.root.slice_sorted());
        let lower_bound = self
            .solver
            .tables
            .phase1_heuristic(twist, flip, slice_sorted) as usize;
        for depth in lower_bound..=self.max_length {
            debug!(working!("Searching phase 1 depth {}..."), depth);
            if self.phase1(twist, flip, slice_sorted, CanonicalFsmState::default(), depth)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn phase1(
        &mut self,
        twist: u16,
        flip: u16,
        slice_sorted: u16,
        fsm_state: CanonicalFsmState,
        togo: usize,
    ) -> Result<bool, Interrupt> {
        self.budget.expand()?;
        if togo == 0 {
            // A G1 move cannot have entered G1, so a shorter phase 1 ending
            // here has already been tried
            if self.phase1.last().is_some_and(|move_| move_.is_g1()) {
                return Ok(false);
            }
            return self.start_phase2(fsm_state);
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
            if solver
                .tables
                .phase1_heuristic(next_twist, next_flip, next_slice) as usize
                > togo - 1
            {
                continue;
            }

            self.phase1.push(move_);
            if self.phase1(next_twist, next_flip, next_slice, next_fsm_state, togo - 1)? {
                return Ok(true);
            }
            self.phase1.pop();
        }
        Ok(false)
    }

    fn start_phase2(&mut self, fsm_state: CanonicalFsmState) -> Result<bool, Interrupt> {
        let state = self.root.apply_moves(self.phase1.iter().copied());
        let (corners, ud_edges, slice_perm) =
            (state.corners(), state.ud_edges(), state.slice_sorted());
        let lower_bound = self
            .solver
            .tables
            .phase2_heuristic(corners, ud_edges, slice_perm) as usize;
        let remaining = self.max_length - self.phase1.len();
        for depth in lower_bound..=remaining {
            if self.phase2(corners, ud_edges, slice_perm, fsm_state, depth)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn phase2(
        &mut self,
        corners: u16,
        ud_edges: u16,
        slice_perm: u16,
        fsm_state: CanonicalFsmState,
        togo: usize,
    ) -> Result<bool, Interrupt> {
        self.budget.expand()?;
        if togo == 0 {
            return Ok(corners == 0 && ud_edges == 0 && slice_perm == 0);
        }

        let solver = self.solver;
        let moves = solver.tables.moves();
        for &move_ in &solver.g1_moves {
            let Some(next_fsm_state) = solver.canonical_fsm.next_state(fsm_state, move_.face)
            else {
                continue;
            };
            let next_corners = moves.corners(corners, move_);
            let next_ud_edges = moves.ud_edges(ud_edges, move_);
            let next_slice_perm = moves.slice_sorted(slice_perm, move_);
            if solver
                .tables
                .phase2_heuristic(next_corners, next_ud_edges, next_slice_perm) as usize
                > togo - 1
            {
                continue;
            }

            self.phase2.push(move_);
            if self.phase2(
                next_corners,
                next_ud_edges,
                next_slice_perm,
                next_fsm_state,
                togo - 1,
            )? {
                return Ok(true);
            }
            self.phase2.pop();
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> TwoPhaseSolver {
        TwoPhaseSolver::new(PruningTables::shared().unwrap())
    }

    #[test_log::test]
    fn test_solved_needs_no_moves() {
        let solution = solver()
            .solve(&CubieState::SOLVED, &TwoPhaseOptions::default())
            .unwrap();
        assert!(solution.is_empty());
    }

    #[test_log::test]
    fn test_g1_state_skips_phase_one() {
        let state = CubieState::from_moves(&"U R2 D'".parse().unwrap());
        let solution = solver().solve(&state, &TwoPhaseOptions::default()).unwrap();
        assert_eq!(solution.to_string(), "D R2 U'");
        assert!(state.apply_sequence(&solution).is_solved());
    }

    #[test_log::test]
    fn test_max_length_is_respected() {
        let state = CubieState::from_moves(&"R U F".parse().unwrap());
        let error = solver()
            .solve(&state, &TwoPhaseOptions::default().with_max_length(2))
            .unwrap_err();
        assert_eq!(error, SearchError::NoSolutionWithinBudget { max_length: 2 });
    }

    #[test_log::test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let state = CubieState::from_moves(&"R U F".parse().unwrap());
        let error = solver()
            .solve(&state, &TwoPhaseOptions::default().with_cancellation(token))
            .unwrap_err();
        assert_eq!(error, SearchError::Cancelled);
    }

    #[test]
    fn test_timeout_builders() {
        let options = TwoPhaseOptions::default().with_timeout(Duration::from_millis(5));
        assert_eq!(options.timeout, Some(Duration::from_millis(5)));
        assert_eq!(options.without_timeout().timeout, None);
    }

    #[test_log::test]
    fn test_zero_timeout() {
        let state = CubieState::from_moves(&"R U F".parse().unwrap());
        let error = solver()
            .solve(&state, &TwoPhaseOptions::default().with_timeout(Duration::ZERO))
            .unwrap_err();
        assert_eq!(error, SearchError::NoSolutionWithinBudget { max_length: 30 });
    }
}
