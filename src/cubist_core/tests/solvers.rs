use cubist_core::{
    CancellationToken, CubieState, Move, MoveSequence, PruningTables, SearchError, parse_cube,
    ida::{IdaOptions, IdaSolver},
    scramble::{self, Pattern},
    tutor::{LayerByLayerSolver, Phase},
    two_phase::{TwoPhaseOptions, TwoPhaseSolver},
};
use itertools::Itertools;
use log::info;
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

fn tables() -> Arc<PruningTables> {
    PruningTables::shared().unwrap()
}

fn random_moves(rng: &mut fastrand::Rng, length: usize) -> MoveSequence {
    (0..length)
        .map(|_| Move::ALL[rng.usize(..Move::ALL.len())])
        .collect()
}

#[test_log::test]
fn test_solved_facelets_need_no_moves() {
    let state = parse_cube(SOLVED).unwrap();
    let tables = tables();

    let fast = TwoPhaseSolver::new(Arc::clone(&tables))
        .solve(&state, &TwoPhaseOptions::default())
        .unwrap();
    assert!(fast.is_empty());

    let research = IdaSolver::new(tables)
        .solve(&state, &IdaOptions::default())
        .unwrap();
    assert!(research.is_empty());

    let steps = LayerByLayerSolver::new().solve(&state).unwrap();
    assert!(steps.iter().all(|step| step.moves.is_empty()));
}

#[test_log::test]
fn test_two_phase_solves_full_scrambles() {
    let solver = TwoPhaseSolver::new(tables());
    for seed in 0..10 {
        let scramble = scramble::generate_seeded(25, seed);
        let state = CubieState::from_moves(&scramble);
        let solution = solver.solve(&state, &TwoPhaseOptions::default()).unwrap();
        info!("{scramble} -> {solution}");
        assert!(solution.len() <= 30);
        assert!(state.apply_sequence(&solution).is_solved(), "{scramble}");
    }
}

#[test_log::test]
fn test_ida_is_no_longer_than_two_phase() {
    let tables = tables();
    let fast = TwoPhaseSolver::new(Arc::clone(&tables));
    let research = IdaSolver::new(tables);
    let mut rng = fastrand::Rng::with_seed(2024);

    for _ in 0..8 {
        let scramble = random_moves(&mut rng, 7);
        let state = CubieState::from_moves(&scramble);
        let optimal = research.solve(&state, &IdaOptions::default()).unwrap();
        let short = fast.solve(&state, &TwoPhaseOptions::default()).unwrap();
        assert!(state.apply_sequence(&optimal).is_solved());
        assert!(optimal.len() <= short.len(), "{scramble}: {optimal} vs {short}");
        assert!(optimal.len() <= scramble.simplify().len());
    }
}

#[test_log::test]
fn test_solvers_are_deterministic() {
    let tables = tables();
    let fast = TwoPhaseSolver::new(Arc::clone(&tables));
    let research = IdaSolver::new(tables);
    let tutor = LayerByLayerSolver::new();

    let state = CubieState::from_moves(&scramble::generate_seeded(25, 99));
    let first = fast.solve(&state, &TwoPhaseOptions::default()).unwrap();
    let second = fast.solve(&state, &TwoPhaseOptions::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(tutor.solve(&state).unwrap(), tutor.solve(&state).unwrap());

    let state = CubieState::from_moves(&"L2 B' U R F' D2".parse().unwrap());
    assert_eq!(
        research.solve(&state, &IdaOptions::default()).unwrap(),
        research.solve(&state, &IdaOptions::default()).unwrap()
    );
}

#[test_log::test]
fn test_tutor_phases_in_order() {
    let tutor = LayerByLayerSolver::new();
    for seed in 0..20 {
        let state = CubieState::from_moves(&scramble::generate_seeded(25, seed));
        let steps = tutor.solve(&state).unwrap();

        let phases = steps.iter().map(|step| step.phase).dedup().collect_vec();
        assert!(phases.is_sorted(), "{phases:?}");
        assert_eq!(phases.last(), Some(&Phase::Solved));

        let all_moves: MoveSequence = steps
            .iter()
            .flat_map(|step| step.moves.iter().copied())
            .collect();
        assert!(state.apply_sequence(&all_moves).is_solved(), "seed {seed}");
    }
}

#[test_log::test]
fn test_concurrent_solves_share_tables() {
    let handles = (0..4_u64)
        .map(|seed| {
            thread::spawn(move || {
                let solver = TwoPhaseSolver::new(tables());
                let state = CubieState::from_moves(&scramble::generate_seeded(20, seed));
                let solution = solver.solve(&state, &TwoPhaseOptions::default()).unwrap();
                state.apply_sequence(&solution).is_solved()
            })
        })
        .collect_vec();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test_log::test]
fn test_cancel_from_another_thread() {
    let token = CancellationToken::new();
    let solver = IdaSolver::new(tables());
    let state = CubieState::from_moves(&scramble::generate_seeded(25, 5));

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };
    let start = Instant::now();
    let error = solver
        .solve(
            &state,
            &IdaOptions::default()
                .without_timeout()
                .with_cancellation(token),
        )
        .unwrap_err();
    canceller.join().unwrap();

    assert_eq!(error, SearchError::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test_log::test]
fn test_cancel_two_phase_from_another_thread() {
    let token = CancellationToken::new();
    let solver = TwoPhaseSolver::new(tables());
    // The superflip needs 20 moves, so this runs until cancelled
    let state = CubieState::from_moves(&Pattern::Superflip.moves());

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };
    let start = Instant::now();
    let error = solver
        .solve(
            &state,
            &TwoPhaseOptions::default()
                .with_max_length(19)
                .with_cancellation(token),
        )
        .unwrap_err();
    canceller.join().unwrap();

    assert_eq!(error, SearchError::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test_log::test]
fn test_timeout_is_reported_as_budget() {
    let solver = IdaSolver::new(tables());
    let state = CubieState::from_moves(&scramble::generate_seeded(25, 6));
    let error = solver
        .solve(
            &state,
            &IdaOptions::default().with_timeout(Duration::from_millis(20)),
        )
        .unwrap_err();
    assert_eq!(error, SearchError::NoSolutionWithinBudget { max_length: 25 });
}
