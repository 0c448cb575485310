use crate::moves::{Face, Move, MoveSequence};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const NUM_CORNERS: usize = 8;
pub const NUM_EDGES: usize = 12;

/// Corner slots and cubies, named by the faces they touch.
pub mod corner {
    pub const URF: u8 = 0;
    pub const UFL: u8 = 1;
    pub const ULB: u8 = 2;
    pub const UBR: u8 = 3;
    pub const DFR: u8 = 4;
    pub const DLF: u8 = 5;
    pub const DBL: u8 = 6;
    pub const DRB: u8 = 7;
}

/// Edge slots and cubies, named by the faces they touch.
pub mod edge {
    pub const UR: u8 = 0;
    pub const UF: u8 = 1;
    pub const UL: u8 = 2;
    pub const UB: u8 = 3;
    pub const DR: u8 = 4;
    pub const DF: u8 = 5;
    pub const DL: u8 = 6;
    pub const DB: u8 = 7;
    pub const FR: u8 = 8;
    pub const FL: u8 = 9;
    pub const BL: u8 = 10;
    pub const BR: u8 = 11;
}

/// A cube configuration at the level of physical pieces.
///
/// `corner_permutation[i]` is the corner cubie sitting in slot `i` and
/// `corner_orientation[i]` is how far it is twisted there; edges work the
/// same way. The solved cube has every cubie in its own slot with zero
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubieState {
    pub corner_permutation: [u8; NUM_CORNERS],
    pub corner_orientation: [u8; NUM_CORNERS],
    pub edge_permutation: [u8; NUM_EDGES],
    pub edge_orientation: [u8; NUM_EDGES],
}

impl Default for CubieState {
    fn default() -> Self {
        Self::SOLVED
    }
}

// The clockwise quarter turn of each face, in `Face::ALL` order.
const GENERATORS: [CubieState; 6] = [
    // U
    CubieState {
        corner_permutation: [3, 0, 1, 2, 4, 5, 6, 7],
        corner_orientation: [0; 8],
        edge_permutation: [3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
        edge_orientation: [0; 12],
    },
    // R
    CubieState {
        corner_permutation: [4, 1, 2, 0, 7, 5, 6, 3],
        corner_orientation: [2, 0, 0, 1, 1, 0, 0, 2],
        edge_permutation: [8, 1, 2, 3, 11, 5, 6, 7, 4, 9, 10, 0],
        edge_orientation: [0; 12],
    },
    // F
    CubieState {
        corner_permutation: [1, 5, 2, 3, 0, 4, 6, 7],
        corner_orientation: [1, 2, 0, 0, 2, 1, 0, 0],
        edge_permutation: [0, 9, 2, 3, 4, 8, 6, 7, 1, 5, 10, 11],
        edge_orientation: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    // D
    CubieState {
        corner_permutation: [0, 1, 2, 3, 5, 6, 7, 4],
        corner_orientation: [0; 8],
        edge_permutation: [0, 1, 2, 3, 5, 6, 7, 4, 8, 9, 10, 11],
        edge_orientation: [0; 12],
    },
    // L
    CubieState {
        corner_permutation: [0, 2, 6, 3, 4, 1, 5, 7],
        corner_orientation: [0, 1, 2, 0, 0, 2, 1, 0],
        edge_permutation: [0, 1, 10, 3, 4, 5, 9, 7, 8, 2, 6, 11],
        edge_orientation: [0; 12],
    },
    // B
    CubieState {
        corner_permutation: [0, 1, 3, 7, 4, 5, 2, 6],
        corner_orientation: [0, 0, 1, 2, 0, 0, 2, 1],
        edge_permutation: [0, 1, 2, 11, 4, 5, 6, 10, 8, 9, 3, 7],
        edge_orientation: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];

/// All 18 moves as cubie deltas, indexed by [`Move::index`].
static MOVE_CUBES: LazyLock<[CubieState; 18]> = LazyLock::new(|| {
    let mut cubes = [CubieState::SOLVED; 18];
    for face in Face::ALL {
        let generator = &GENERATORS[face.index()];
        let mut power = CubieState::SOLVED;
        for turn in 0..3 {
            power = power.multiply(generator);
            cubes[face.index() * 3 + turn] = power;
        }
    }
    cubes
});

impl CubieState {
    pub const SOLVED: CubieState = CubieState {
        corner_permutation: [0, 1, 2, 3, 4, 5, 6, 7],
        corner_orientation: [0; 8],
        edge_permutation: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        edge_orientation: [0; 12],
    };

    /// The cubie delta of a single move.
    #[must_use]
    pub fn of_move(move_: Move) -> &'static CubieState {
        &MOVE_CUBES[move_.index()]
    }

    /// Group composition: the state reached by performing `self` and then
    /// `other` from solved.
    #[must_use]
    pub fn multiply(&self, other: &CubieState) -> CubieState {
        let mut out = CubieState::SOLVED;
        for slot in 0..NUM_CORNERS {
            let from = other.corner_permutation[slot] as usize;
            out.corner_permutation[slot] = self.corner_permutation[from];
            out.corner_orientation[slot] =
                (self.corner_orientation[from] + other.corner_orientation[slot]) % 3;
        }
        for slot in 0..NUM_EDGES {
            let from = other.edge_permutation[slot] as usize;
            out.edge_permutation[slot] = self.edge_permutation[from];
            out.edge_orientation[slot] =
                (self.edge_orientation[from] + other.edge_orientation[slot]) % 2;
        }
        out
    }

    /// The state that undoes `self`, so `s.multiply(&s.inverse())` is solved.
    #[must_use]
    pub fn inverse(&self) -> CubieState {
        let mut out = CubieState::SOLVED;
        for slot in 0..NUM_CORNERS {
            let cubie = self.corner_permutation[slot] as usize;
            out.corner_permutation[cubie] = slot as u8;
            out.corner_orientation[cubie] = (3 - self.corner_orientation[slot]) % 3;
        }
        for slot in 0..NUM_EDGES {
            let cubie = self.edge_permutation[slot] as usize;
            out.edge_permutation[cubie] = slot as u8;
            out.edge_orientation[cubie] = self.edge_orientation[slot];
        }
        out
    }

    #[must_use]
    pub fn apply(&self, move_: Move) -> CubieState {
        self.multiply(CubieState::of_move(move_))
    }

    #[must_use]
    pub fn apply_sequence(&self, moves: &MoveSequence) -> CubieState {
        self.apply_moves(moves.iter().copied())
    }

    #[must_use]
    pub fn apply_moves(&self, moves: impl IntoIterator<Item = Move>) -> CubieState {
        moves
            .into_iter()
            .fold(*self, |state, move_| state.apply(move_))
    }

    #[must_use]
    pub fn from_moves(moves: &MoveSequence) -> CubieState {
        CubieState::SOLVED.apply_sequence(moves)
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == CubieState::SOLVED
    }

    /// Whether the corner cubie that belongs in `slot` is there and untwisted.
    #[must_use]
    pub fn corner_solved(&self, slot: u8) -> bool {
        self.corner_permutation[slot as usize] == slot
            && self.corner_orientation[slot as usize] == 0
    }

    /// Whether the edge cubie that belongs in `slot` is there and unflipped.
    #[must_use]
    pub fn edge_solved(&self, slot: u8) -> bool {
        self.edge_permutation[slot as usize] == slot && self.edge_orientation[slot as usize] == 0
    }

    /// The slot currently holding corner cubie `cubie`.
    #[must_use]
    pub fn corner_position(&self, cubie: u8) -> usize {
        self.corner_permutation
            .iter()
            .position(|&c| c == cubie)
            .unwrap_or(NUM_CORNERS)
    }

    /// The slot currently holding edge cubie `cubie`.
    #[must_use]
    pub fn edge_position(&self, cubie: u8) -> usize {
        self.edge_permutation
            .iter()
            .position(|&e| e == cubie)
            .unwrap_or(NUM_EDGES)
    }

    /// `true` for odd corner permutations.
    #[must_use]
    pub fn corner_parity(&self) -> bool {
        permutation_parity(&self.corner_permutation)
    }

    /// `true` for odd edge permutations.
    #[must_use]
    pub fn edge_parity(&self) -> bool {
        permutation_parity(&self.edge_permutation)
    }
}

/// Counts inversions; callers must pass a permutation.
fn permutation_parity(permutation: &[u8]) -> bool {
    let mut inversions = 0;
    for i in 0..permutation.len() {
        for j in (i + 1)..permutation.len() {
            if permutation[i] > permutation[j] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 1
}
