use crate::{
    cubie::{CubieState, NUM_CORNERS, NUM_EDGES},
    facelet::{
        CENTER_FACELETS, CORNER_FACELETS, ColorScheme, EDGE_FACELETS, NUM_FACELETS,
        identify_corner, identify_edge,
    },
    moves::Face,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("Expected 54 stickers, got {actual}")]
    WrongLength { actual: usize },
    #[error("Sticker {index} has the unknown colour `{symbol}`")]
    InvalidColorSymbol { index: usize, symbol: char },
    #[error("Colour `{symbol}` appears {count} times, expected 9")]
    WrongColorCounts { symbol: char, count: usize },
    #[error("The centre of face {face} is `{found}`")]
    CenterMismatch { face: Face, found: char },
    #[error("The stickers of corner slot {slot} do not form a real corner")]
    UnrecognizedCorner { slot: usize },
    #[error("The stickers of edge slot {slot} do not form a real edge")]
    UnrecognizedEdge { slot: usize },
    #[error("A cubie is assigned to more than one slot")]
    DuplicateSlotAssignment,
    #[error("A cubie orientation is out of range")]
    OrientationOutOfRange,
    #[error("Corner orientations do not sum to a multiple of three; a corner is twisted")]
    CornerOrientationSumInvalid,
    #[error("Edge orientations do not sum to a multiple of two; an edge is flipped")]
    EdgeOrientationSumInvalid,
    #[error("Corner and edge permutation parities differ; two pieces are swapped")]
    PermutationParityMismatch,
}

/// Checks a face-letter sticker string for the sticker-level constraints.
///
/// # Errors
///
/// Returns the first failing check among length, symbols, counts, and
/// centres, in that order.
pub fn validate_facelets(facelets: &str) -> Result<(), ValidationError> {
    validate_facelets_with(facelets, &ColorScheme::FACE_LETTERS)
}

/// Like [`validate_facelets`] with an explicit colour scheme.
///
/// # Errors
///
/// See [`validate_facelets`].
pub fn validate_facelets_with(facelets: &str, scheme: &ColorScheme) -> Result<(), ValidationError> {
    let symbols: Vec<char> = facelets.chars().collect();
    if symbols.len() != NUM_FACELETS {
        return Err(ValidationError::WrongLength {
            actual: symbols.len(),
        });
    }

    if let Some((index, &symbol)) = symbols
        .iter()
        .enumerate()
        .find(|(_, symbol)| scheme.face_of(**symbol).is_none())
    {
        return Err(ValidationError::InvalidColorSymbol { index, symbol });
    }

    for symbol in scheme.symbols {
        let count = symbols.iter().filter(|&&s| s == symbol).count();
        if count != 9 {
            return Err(ValidationError::WrongColorCounts { symbol, count });
        }
    }

    for (face, &center) in Face::ALL.iter().zip(&CENTER_FACELETS) {
        if symbols[center] != scheme.symbol(*face) {
            return Err(ValidationError::CenterMismatch {
                face: *face,
                found: symbols[center],
            });
        }
    }

    Ok(())
}

/// Checks that a cubie state is reachable from solved by face turns.
///
/// # Errors
///
/// Returns the first failing check among slot assignment, orientation range,
/// corner twist, edge flip, and permutation parity, in that order.
pub fn validate_cubie(state: &CubieState) -> Result<(), ValidationError> {
    if !is_permutation(&state.corner_permutation) || !is_permutation(&state.edge_permutation) {
        return Err(ValidationError::DuplicateSlotAssignment);
    }
    if state.corner_orientation.iter().any(|&o| o > 2)
        || state.edge_orientation.iter().any(|&o| o > 1)
    {
        return Err(ValidationError::OrientationOutOfRange);
    }
    if state.corner_orientation.iter().map(|&o| u32::from(o)).sum::<u32>() % 3 != 0 {
        return Err(ValidationError::CornerOrientationSumInvalid);
    }
    if state.edge_orientation.iter().map(|&o| u32::from(o)).sum::<u32>() % 2 != 0 {
        return Err(ValidationError::EdgeOrientationSumInvalid);
    }
    if state.corner_parity() != state.edge_parity() {
        return Err(ValidationError::PermutationParityMismatch);
    }
    Ok(())
}

fn is_permutation(values: &[u8]) -> bool {
    let mut seen = vec![false; values.len()];
    for &value in values {
        match seen.get_mut(value as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Everything wrong with a sticker string at once, for highlighting in an
/// input panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    /// Sorted sticker indices worth highlighting.
    pub problematic_stickers: Vec<usize>,
    pub color_counts: BTreeMap<char, usize>,
}

impl ValidationReport {
    #[must_use]
    pub fn new(facelets: &str, scheme: &ColorScheme) -> ValidationReport {
        let symbols: Vec<char> = facelets.chars().collect();
        let mut color_counts = BTreeMap::new();
        for &symbol in &symbols {
            *color_counts.entry(symbol).or_insert(0) += 1;
        }

        let mut errors = vec![];
        let mut problematic = vec![];

        if symbols.len() == NUM_FACELETS {
            sticker_errors(&symbols, scheme, &color_counts, &mut errors, &mut problematic);
            if errors.is_empty() {
                cubie_errors(&symbols, scheme, &mut errors, &mut problematic);
            }
        } else {
            errors.push(ValidationError::WrongLength {
                actual: symbols.len(),
            });
            problematic.extend(0..symbols.len());
        }

        problematic.sort_unstable();
        problematic.dedup();
        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            problematic_stickers: problematic,
            color_counts,
        }
    }
}

fn sticker_errors(
    symbols: &[char],
    scheme: &ColorScheme,
    color_counts: &BTreeMap<char, usize>,
    errors: &mut Vec<ValidationError>,
    problematic: &mut Vec<usize>,
) {
    for (index, &symbol) in symbols.iter().enumerate() {
        if scheme.face_of(symbol).is_none() {
            errors.push(ValidationError::InvalidColorSymbol { index, symbol });
            problematic.push(index);
        }
    }
    for symbol in scheme.symbols {
        let count = color_counts.get(&symbol).copied().unwrap_or(0);
        if count != 9 {
            errors.push(ValidationError::WrongColorCounts { symbol, count });
            // Too many of a colour: every sticker of it is suspect
            if count > 9 {
                problematic.extend(
                    symbols
                        .iter()
                        .enumerate()
                        .filter(|&(index, &s)| s == symbol && !CENTER_FACELETS.contains(&index))
                        .map(|(index, _)| index),
                );
            }
        }
    }
    for (face, &center) in Face::ALL.iter().zip(&CENTER_FACELETS) {
        if symbols[center] != scheme.symbol(*face) {
            errors.push(ValidationError::CenterMismatch {
                face: *face,
                found: symbols[center],
            });
            problematic.push(center);
        }
    }
}

fn cubie_errors(
    symbols: &[char],
    scheme: &ColorScheme,
    errors: &mut Vec<ValidationError>,
    problematic: &mut Vec<usize>,
) {
    let faces: Vec<Face> = symbols
        .iter()
        .map(|&symbol| scheme.face_of(symbol).unwrap_or(Face::U))
        .collect();

    let mut state = CubieState::SOLVED;
    let mut recognized = true;
    for slot in 0..NUM_CORNERS {
        if let Some((cubie, twist)) = identify_corner(&faces, slot) {
            state.corner_permutation[slot] = cubie;
            state.corner_orientation[slot] = twist;
        } else {
            errors.push(ValidationError::UnrecognizedCorner { slot });
            problematic.extend(CORNER_FACELETS[slot]);
            recognized = false;
        }
    }
    for slot in 0..NUM_EDGES {
        if let Some((cubie, flip)) = identify_edge(&faces, slot) {
            state.edge_permutation[slot] = cubie;
            state.edge_orientation[slot] = flip;
        } else {
            errors.push(ValidationError::UnrecognizedEdge { slot });
            problematic.extend(EDGE_FACELETS[slot]);
            recognized = false;
        }
    }
    if !recognized {
        return;
    }

    if let Err(error) = validate_cubie(&state) {
        errors.push(error);
        // The fault cannot be pinned on one piece
        problematic.extend((0..NUM_FACELETS).filter(|index| !CENTER_FACELETS.contains(index)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveSequence;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    #[test]
    fn test_facelet_checks_in_order() {
        assert_eq!(validate_facelets(SOLVED), Ok(()));
        assert_eq!(
            validate_facelets("UUU"),
            Err(ValidationError::WrongLength { actual: 3 })
        );
        let bad_symbol = SOLVED.replacen('R', "X", 1);
        assert_eq!(
            validate_facelets(&bad_symbol),
            Err(ValidationError::InvalidColorSymbol {
                index: 9,
                symbol: 'X'
            })
        );
        let bad_count = SOLVED.replacen('R', "U", 1);
        assert_eq!(
            validate_facelets(&bad_count),
            Err(ValidationError::WrongColorCounts {
                symbol: 'U',
                count: 10
            })
        );
        // Two faces trade centres; the counts stay right
        let mut chars: Vec<char> = SOLVED.chars().collect();
        chars.swap(4, 13);
        let swapped: String = chars.into_iter().collect();
        assert_eq!(
            validate_facelets(&swapped),
            Err(ValidationError::CenterMismatch {
                face: Face::U,
                found: 'R'
            })
        );
    }

    #[test]
    fn test_cubie_checks() {
        let mut twisted = CubieState::SOLVED;
        twisted.corner_orientation[3] = 2;
        assert_eq!(
            validate_cubie(&twisted),
            Err(ValidationError::CornerOrientationSumInvalid)
        );

        let mut flipped = CubieState::SOLVED;
        flipped.edge_orientation[7] = 1;
        assert_eq!(
            validate_cubie(&flipped),
            Err(ValidationError::EdgeOrientationSumInvalid)
        );

        let mut swapped = CubieState::SOLVED;
        swapped.edge_permutation.swap(0, 1);
        assert_eq!(
            validate_cubie(&swapped),
            Err(ValidationError::PermutationParityMismatch)
        );

        let mut duplicate = CubieState::SOLVED;
        duplicate.corner_permutation[0] = 1;
        assert_eq!(
            validate_cubie(&duplicate),
            Err(ValidationError::DuplicateSlotAssignment)
        );

        let mut out_of_range = CubieState::SOLVED;
        out_of_range.edge_orientation[0] = 2;
        assert_eq!(
            validate_cubie(&out_of_range),
            Err(ValidationError::OrientationOutOfRange)
        );
    }

    #[test]
    fn test_scrambled_state_is_valid() {
        let moves: MoveSequence = "D2 F' L U2 B R' D L2 F U'".parse().unwrap();
        assert_eq!(validate_cubie(&CubieState::from_moves(&moves)), Ok(()));
    }

    #[test]
    fn test_report_for_valid_cube() {
        let report = ValidationReport::new(SOLVED, &ColorScheme::FACE_LETTERS);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.problematic_stickers.is_empty());
        assert_eq!(report.color_counts.get(&'F'), Some(&9));
    }

    #[test]
    fn test_report_collects_every_error() {
        let mut chars: Vec<char> = SOLVED.chars().collect();
        chars[0] = 'X';
        chars[1] = 'Y';
        let facelets: String = chars.into_iter().collect();
        let report = ValidationReport::new(&facelets, &ColorScheme::FACE_LETTERS);
        assert!(!report.is_valid);
        assert_eq!(report.problematic_stickers, vec![0, 1]);
        assert!(report.errors.contains(&ValidationError::InvalidColorSymbol {
            index: 1,
            symbol: 'Y'
        }));
        assert!(report.errors.contains(&ValidationError::WrongColorCounts {
            symbol: 'U',
            count: 7
        }));
    }

    #[test]
    fn test_report_marks_twisted_cube() {
        let mut twisted = CubieState::SOLVED;
        twisted.corner_orientation[0] = 1;
        let report = ValidationReport::new(&twisted.to_facelets(), &ColorScheme::FACE_LETTERS);
        assert_eq!(
            report.errors,
            vec![ValidationError::CornerOrientationSumInvalid]
        );
        assert_eq!(report.problematic_stickers.len(), 48);
    }
}
