use cubist_core::{
    ColorScheme, CubieState, Move, MoveSequence, parse_cube,
    validator::{ValidationError, ValidationReport, validate_cubie},
};

const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

fn random_moves(rng: &mut fastrand::Rng, length: usize) -> MoveSequence {
    (0..length)
        .map(|_| Move::ALL[rng.usize(..Move::ALL.len())])
        .collect()
}

#[test_log::test]
fn test_facelet_round_trip() {
    let mut rng = fastrand::Rng::with_seed(1);
    for _ in 0..200 {
        let state = CubieState::from_moves(&random_moves(&mut rng, 30));
        let facelets = state.to_facelets();
        assert_eq!(CubieState::from_facelets(&facelets).unwrap(), state);
        assert_eq!(parse_cube(&facelets).unwrap(), state);

        let western = state.to_facelets_with(&ColorScheme::WESTERN);
        assert_eq!(
            CubieState::from_facelets_with(&western, &ColorScheme::WESTERN).unwrap(),
            state
        );
    }
}

#[test_log::test]
fn test_sequence_then_inverse_is_identity() {
    let mut rng = fastrand::Rng::with_seed(2);
    for length in 0..=20 {
        let start = CubieState::from_moves(&random_moves(&mut rng, 15));
        let moves = random_moves(&mut rng, length);
        let there = start.apply_sequence(&moves);
        assert_eq!(there.apply_sequence(&moves.inverse()), start);
    }
}

#[test_log::test]
fn test_simplify_preserves_state() {
    let mut rng = fastrand::Rng::with_seed(3);
    for _ in 0..200 {
        let moves = random_moves(&mut rng, 12);
        let simplified = moves.simplify();
        assert!(simplified.len() <= moves.len());
        assert_eq!(CubieState::from_moves(&simplified), CubieState::from_moves(&moves));
        assert!(simplified.windows(2).all(|pair| pair[0].face != pair[1].face));
    }
}

#[test_log::test]
fn test_sexy_move_six_times() {
    let sexy: MoveSequence = "R U R' U'".parse().unwrap();
    let state = (0..6).fold(CubieState::SOLVED, |state, _| state.apply_sequence(&sexy));
    assert!(state.is_solved());
}

#[test_log::test]
fn test_random_states_are_valid() {
    let mut rng = fastrand::Rng::with_seed(4);
    for _ in 0..100 {
        let state = CubieState::from_moves(&random_moves(&mut rng, 25));
        assert_eq!(validate_cubie(&state), Ok(()));
    }
}

#[test_log::test]
fn test_single_twisted_corner() {
    let mut rng = fastrand::Rng::with_seed(5);
    for _ in 0..20 {
        let mut state = CubieState::from_moves(&random_moves(&mut rng, 25));
        let slot = rng.usize(..8);
        state.corner_orientation[slot] = (state.corner_orientation[slot] + 1) % 3;
        assert_eq!(
            validate_cubie(&state),
            Err(ValidationError::CornerOrientationSumInvalid)
        );
    }

    // The URF corner's stickers, rotated in place
    let mut facelets: Vec<char> = SOLVED.chars().collect();
    facelets[8] = 'F';
    facelets[9] = 'U';
    facelets[20] = 'R';
    let facelets: String = facelets.into_iter().collect();
    assert_eq!(
        parse_cube(&facelets),
        Err(ValidationError::CornerOrientationSumInvalid)
    );

    let report = ValidationReport::new(&facelets, &ColorScheme::FACE_LETTERS);
    assert!(!report.is_valid);
    assert_eq!(report.errors, vec![ValidationError::CornerOrientationSumInvalid]);
}
