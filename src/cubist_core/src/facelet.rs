//! Conversion between [`CubieState`] and the 54-sticker facelet string.
//!
//! Stickers are numbered face by face in the order U, R, F, D, L, B, nine per
//! face, row-major as the face appears in the standard net:
//!
//! ```text
//!              |************|
//!              |*U1**U2**U3*|
//!              |*U4**U5**U6*|
//!              |*U7**U8**U9*|
//! |************|************|************|************|
//! |*L1**L2**L3*|*F1**F2**F3*|*R1**R2**R3*|*B1**B2**B3*|
//! |*L4**L5**L6*|*F4**F5**F6*|*R4**R5**R6*|*B4**B5**B6*|
//! |*L7**L8**L9*|*F7**F8**F9*|*R7**R8**R9*|*B7**B8**B9*|
//! |************|************|************|************|
//!              |*D1**D2**D3*|
//!              |*D4**D5**D6*|
//!              |*D7**D8**D9*|
//! ```

use crate::{
    cubie::{CubieState, NUM_CORNERS, NUM_EDGES},
    moves::Face,
    validator::{ValidationError, validate_cubie, validate_facelets_with},
};
use serde::{Deserialize, Serialize};

pub const NUM_FACELETS: usize = 54;

const fn at(face: Face, sticker: usize) -> usize {
    face.index() * 9 + sticker - 1
}

/// The stickers of each corner slot, starting with its U or D sticker and
/// continuing clockwise.
pub(crate) const CORNER_FACELETS: [[usize; 3]; NUM_CORNERS] = [
    [at(Face::U, 9), at(Face::R, 1), at(Face::F, 3)],
    [at(Face::U, 7), at(Face::F, 1), at(Face::L, 3)],
    [at(Face::U, 1), at(Face::L, 1), at(Face::B, 3)],
    [at(Face::U, 3), at(Face::B, 1), at(Face::R, 3)],
    [at(Face::D, 3), at(Face::F, 9), at(Face::R, 7)],
    [at(Face::D, 1), at(Face::L, 9), at(Face::F, 7)],
    [at(Face::D, 7), at(Face::B, 9), at(Face::L, 7)],
    [at(Face::D, 9), at(Face::R, 9), at(Face::B, 7)],
];

/// The faces of each corner cubie, in the same sticker order.
pub(crate) const CORNER_COLORS: [[Face; 3]; NUM_CORNERS] = [
    [Face::U, Face::R, Face::F],
    [Face::U, Face::F, Face::L],
    [Face::U, Face::L, Face::B],
    [Face::U, Face::B, Face::R],
    [Face::D, Face::F, Face::R],
    [Face::D, Face::L, Face::F],
    [Face::D, Face::B, Face::L],
    [Face::D, Face::R, Face::B],
];

pub(crate) const EDGE_FACELETS: [[usize; 2]; NUM_EDGES] = [
    [at(Face::U, 6), at(Face::R, 2)],
    [at(Face::U, 8), at(Face::F, 2)],
    [at(Face::U, 4), at(Face::L, 2)],
    [at(Face::U, 2), at(Face::B, 2)],
    [at(Face::D, 6), at(Face::R, 8)],
    [at(Face::D, 2), at(Face::F, 8)],
    [at(Face::D, 4), at(Face::L, 8)],
    [at(Face::D, 8), at(Face::B, 8)],
    [at(Face::F, 6), at(Face::R, 4)],
    [at(Face::F, 4), at(Face::L, 6)],
    [at(Face::B, 6), at(Face::L, 4)],
    [at(Face::B, 4), at(Face::R, 6)],
];

pub(crate) const EDGE_COLORS: [[Face; 2]; NUM_EDGES] = [
    [Face::U, Face::R],
    [Face::U, Face::F],
    [Face::U, Face::L],
    [Face::U, Face::B],
    [Face::D, Face::R],
    [Face::D, Face::F],
    [Face::D, Face::L],
    [Face::D, Face::B],
    [Face::F, Face::R],
    [Face::F, Face::L],
    [Face::B, Face::L],
    [Face::B, Face::R],
];

pub(crate) const CENTER_FACELETS: [usize; 6] = [4, 13, 22, 31, 40, 49];

/// The sticker symbol used for each face, indexed by [`Face::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub symbols: [char; 6],
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::FACE_LETTERS
    }
}

impl ColorScheme {
    /// Stickers are named after the face whose centre they match.
    pub const FACE_LETTERS: ColorScheme = ColorScheme {
        symbols: ['U', 'R', 'F', 'D', 'L', 'B'],
    };

    /// White up, green front.
    pub const WESTERN: ColorScheme = ColorScheme {
        symbols: ['W', 'R', 'G', 'Y', 'O', 'B'],
    };

    /// Looks a scheme up by the name the command line and config files use.
    #[must_use]
    pub fn by_name(name: &str) -> Option<ColorScheme> {
        match name.to_ascii_lowercase().as_str() {
            "faces" | "face_letters" | "urfdlb" => Some(Self::FACE_LETTERS),
            "western" | "colors" | "wrgyob" => Some(Self::WESTERN),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(&self, face: Face) -> char {
        self.symbols[face.index()]
    }

    #[must_use]
    pub fn face_of(&self, symbol: char) -> Option<Face> {
        Face::ALL
            .into_iter()
            .find(|&face| self.symbols[face.index()] == symbol)
    }

    /// The sticker string of the solved cube.
    #[must_use]
    pub fn solved_facelets(&self) -> String {
        Face::ALL
            .iter()
            .flat_map(|&face| std::iter::repeat_n(self.symbol(face), 9))
            .collect()
    }
}

impl CubieState {
    /// Reads a sticker string written with the face-letter scheme.
    ///
    /// # Errors
    ///
    /// Fails when the string is malformed or some group of stickers does not
    /// form a real cubie. The result is not checked for reachability; see
    /// [`validate_cubie`].
    pub fn from_facelets(facelets: &str) -> Result<CubieState, ValidationError> {
        Self::from_facelets_with(facelets, &ColorScheme::FACE_LETTERS)
    }

    /// Like [`CubieState::from_facelets`] with an explicit colour scheme.
    ///
    /// # Errors
    ///
    /// See [`CubieState::from_facelets`].
    pub fn from_facelets_with(
        facelets: &str,
        scheme: &ColorScheme,
    ) -> Result<CubieState, ValidationError> {
        validate_facelets_with(facelets, scheme)?;
        let faces = facelets
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                scheme
                    .face_of(symbol)
                    .ok_or(ValidationError::InvalidColorSymbol { index, symbol })
            })
            .collect::<Result<Vec<Face>, _>>()?;
        cubies_from_faces(&faces)
    }

    /// The sticker string of this state in the face-letter scheme.
    #[must_use]
    pub fn to_facelets(&self) -> String {
        self.to_facelets_with(&ColorScheme::FACE_LETTERS)
    }

    #[must_use]
    pub fn to_facelets_with(&self, scheme: &ColorScheme) -> String {
        self.to_faces()
            .iter()
            .map(|&face| scheme.symbol(face))
            .collect()
    }

    /// Which face colour shows on each of the 54 stickers.
    #[must_use]
    pub fn to_faces(&self) -> [Face; NUM_FACELETS] {
        let mut faces = [Face::U; NUM_FACELETS];
        for (face, &center) in Face::ALL.iter().zip(&CENTER_FACELETS) {
            faces[center] = *face;
        }
        for slot in 0..NUM_CORNERS {
            let cubie = self.corner_permutation[slot] as usize;
            let twist = self.corner_orientation[slot] as usize;
            for k in 0..3 {
                faces[CORNER_FACELETS[slot][(k + twist) % 3]] = CORNER_COLORS[cubie][k];
            }
        }
        for slot in 0..NUM_EDGES {
            let cubie = self.edge_permutation[slot] as usize;
            let flip = self.edge_orientation[slot] as usize;
            for k in 0..2 {
                faces[EDGE_FACELETS[slot][(k + flip) % 2]] = EDGE_COLORS[cubie][k];
            }
        }
        faces
    }
}

/// Identifies the corner in `slot`, returning `(cubie, twist)`.
pub(crate) fn identify_corner(faces: &[Face], slot: usize) -> Option<(u8, u8)> {
    let stickers = CORNER_FACELETS[slot];
    let twist = (0..3).find(|&k| matches!(faces[stickers[k]], Face::U | Face::D))?;
    let clockwise = faces[stickers[(twist + 1) % 3]];
    let anticlockwise = faces[stickers[(twist + 2) % 3]];
    CORNER_COLORS
        .iter()
        .position(|colors| colors[1] == clockwise && colors[2] == anticlockwise)
        .map(|cubie| (cubie as u8, twist as u8))
}

/// Identifies the edge in `slot`, returning `(cubie, flip)`.
pub(crate) fn identify_edge(faces: &[Face], slot: usize) -> Option<(u8, u8)> {
    let [a, b] = EDGE_FACELETS[slot];
    EDGE_COLORS.iter().enumerate().find_map(|(cubie, colors)| {
        if faces[a] == colors[0] && faces[b] == colors[1] {
            Some((cubie as u8, 0))
        } else if faces[a] == colors[1] && faces[b] == colors[0] {
            Some((cubie as u8, 1))
        } else {
            None
        }
    })
}

fn cubies_from_faces(faces: &[Face]) -> Result<CubieState, ValidationError> {
    let mut state = CubieState::SOLVED;
    for slot in 0..NUM_CORNERS {
        let (cubie, twist) =
            identify_corner(faces, slot).ok_or(ValidationError::UnrecognizedCorner { slot })?;
        state.corner_permutation[slot] = cubie;
        state.corner_orientation[slot] = twist;
    }
    for slot in 0..NUM_EDGES {
        let (cubie, flip) =
            identify_edge(faces, slot).ok_or(ValidationError::UnrecognizedEdge { slot })?;
        state.edge_permutation[slot] = cubie;
        state.edge_orientation[slot] = flip;
    }
    Ok(state)
}

/// Parses a face-letter sticker string into a state every solver accepts.
///
/// # Errors
///
/// Returns the first facelet-level or cubie-level problem found.
pub fn parse_cube(facelets: &str) -> Result<CubieState, ValidationError> {
    parse_cube_with(facelets, &ColorScheme::FACE_LETTERS)
}

/// Like [`parse_cube`] with an explicit colour scheme.
///
/// # Errors
///
/// See [`parse_cube`].
pub fn parse_cube_with(
    facelets: &str,
    scheme: &ColorScheme,
) -> Result<CubieState, ValidationError> {
    let state = CubieState::from_facelets_with(facelets, scheme)?;
    validate_cubie(&state)?;
    Ok(state)
}
