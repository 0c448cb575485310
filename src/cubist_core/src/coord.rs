//! Integer coordinates: projections of a [`CubieState`] small enough to index
//! tables with, and the move tables that update them without touching cubies.

use crate::{
    cubie::{CubieState, NUM_CORNERS, NUM_EDGES, edge},
    moves::{Face, Move, Turn},
    n_choose_k,
    pruning::{TableBuildError, allocate},
};

pub const N_MOVES: usize = 18;
/// Corner orientations, 3^7.
pub const N_TWIST: usize = 2187;
/// Edge orientations, 2^11.
pub const N_FLIP: usize = 2048;
/// Positions of the four middle-slice edges, 12 choose 4.
pub const N_SLICE: usize = 495;
/// Orderings of the four middle-slice edges.
pub const N_SLICE_PERM: usize = 24;
/// Positions and ordering of the middle-slice edges together.
pub const N_SLICE_SORTED: usize = N_SLICE * N_SLICE_PERM;
pub const N_CORNERS: usize = 40320;
/// Permutations of the eight U and D layer edges; only meaningful in G1.
pub const N_UD_EDGES: usize = 40320;

impl CubieState {
    #[must_use]
    pub fn twist(&self) -> u16 {
        self.corner_orientation[..NUM_CORNERS - 1]
            .iter()
            .fold(0, |twist, &o| 3 * twist + u16::from(o))
    }

    pub fn set_twist(&mut self, mut twist: u16) {
        let mut total = 0;
        for slot in (0..NUM_CORNERS - 1).rev() {
            self.corner_orientation[slot] = (twist % 3) as u8;
            total += self.corner_orientation[slot];
            twist /= 3;
        }
        self.corner_orientation[NUM_CORNERS - 1] = (3 - total % 3) % 3;
    }

    #[must_use]
    pub fn flip(&self) -> u16 {
        self.edge_orientation[..NUM_EDGES - 1]
            .iter()
            .fold(0, |flip, &o| 2 * flip + u16::from(o))
    }

    pub fn set_flip(&mut self, mut flip: u16) {
        let mut total = 0;
        for slot in (0..NUM_EDGES - 1).rev() {
            self.edge_orientation[slot] = (flip % 2) as u8;
            total += self.edge_orientation[slot];
            flip /= 2;
        }
        self.edge_orientation[NUM_EDGES - 1] = total % 2;
    }

    /// Where the FR, FL, BL, BR edges are (`/ 24`) and in which order
    /// (`% 24`). Zero when they are home.
    #[must_use]
    pub fn slice_sorted(&self) -> u16 {
        let mut location = 0;
        let mut found = 0;
        let mut slice_edges = [0; 4];
        for slot in (0..NUM_EDGES).rev() {
            let cubie = self.edge_permutation[slot];
            if cubie >= edge::FR {
                location += n_choose_k(11 - slot, found + 1);
                slice_edges[3 - found] = cubie;
                found += 1;
            }
        }
        let order = lehmer_code(&mut slice_edges, edge::FR);
        (N_SLICE_PERM as u32 * location + order) as u16
    }

    /// Places the slice edges by [`CubieState::slice_sorted`] and fills the
    /// other slots with UR..DB in order.
    pub fn set_slice_sorted(&mut self, index: u16) {
        let mut slice_edges = [edge::FR, edge::FL, edge::BL, edge::BR];
        undo_lehmer_code(&mut slice_edges, u32::from(index) % N_SLICE_PERM as u32);
        let mut location = u32::from(index) / N_SLICE_PERM as u32;

        let mut placed = [None; NUM_EDGES];
        let mut remaining = 4;
        for (slot, cell) in placed.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            let count = n_choose_k(11 - slot, remaining);
            if location >= count {
                *cell = Some(slice_edges[4 - remaining]);
                location -= count;
                remaining -= 1;
            }
        }

        let mut others = edge::UR..=edge::DB;
        for (slot, cell) in placed.into_iter().enumerate() {
            self.edge_permutation[slot] = cell.or_else(|| others.next()).unwrap_or(edge::UR);
        }
    }

    #[must_use]
    pub fn corners(&self) -> u16 {
        let mut permutation = self.corner_permutation;
        lehmer_code(&mut permutation, 0) as u16
    }

    pub fn set_corners(&mut self, index: u16) {
        self.corner_permutation = CubieState::SOLVED.corner_permutation;
        undo_lehmer_code(&mut self.corner_permutation, u32::from(index));
    }

    /// Only meaningful when the slice edges are in the slice.
    #[must_use]
    pub fn ud_edges(&self) -> u16 {
        let mut permutation = [0; 8];
        permutation.copy_from_slice(&self.edge_permutation[..8]);
        lehmer_code(&mut permutation, 0) as u16
    }

    pub fn set_ud_edges(&mut self, index: u16) {
        self.edge_permutation = CubieState::SOLVED.edge_permutation;
        undo_lehmer_code(&mut self.edge_permutation[..8], u32::from(index));
    }
}

/// Ranks a permutation of `offset..offset + len` by counting the rotations
/// needed to bring each element home, largest first. Scrambles `values`.
fn lehmer_code(values: &mut [u8], offset: u8) -> u32 {
    let mut code = 0;
    for j in (1..values.len()).rev() {
        let mut rotations = 0;
        // The bound only matters for values that are not a permutation
        while values[j] != j as u8 + offset && rotations <= j {
            values[..=j].rotate_left(1);
            rotations += 1;
        }
        code = (j as u32 + 1) * code + rotations as u32;
    }
    code
}

/// Inverse of [`lehmer_code`], applied to a sorted `values`.
fn undo_lehmer_code(values: &mut [u8], mut code: u32) {
    for j in 1..values.len() {
        let base = j as u32 + 1;
        let rotations = code % base;
        code /= base;
        for _ in 0..rotations {
            values[..=j].rotate_right(1);
        }
    }
}

/// Coordinate transitions for every move, laid out as
/// `table[coordinate * N_MOVES + move.index()]`.
#[derive(Debug)]
pub struct MoveTables {
    twist: Box<[u16]>,
    flip: Box<[u16]>,
    slice_sorted: Box<[u16]>,
    corners: Box<[u16]>,
    ud_edges: Box<[u16]>,
}

impl MoveTables {
    /// # Errors
    ///
    /// Fails only if a table cannot be allocated.
    pub fn build() -> Result<MoveTables, TableBuildError> {
        Ok(MoveTables {
            twist: build_move_table(
                "twist moves",
                N_TWIST,
                CubieState::set_twist,
                CubieState::twist,
                false,
            )?,
            flip: build_move_table(
                "flip moves",
                N_FLIP,
                CubieState::set_flip,
                CubieState::flip,
                false,
            )?,
            slice_sorted: build_move_table(
                "slice moves",
                N_SLICE_SORTED,
                CubieState::set_slice_sorted,
                CubieState::slice_sorted,
                false,
            )?,
            corners: build_move_table(
                "corner permutation moves",
                N_CORNERS,
                CubieState::set_corners,
                CubieState::corners,
                false,
            )?,
            // Any other move carries slice edges into the U or D layers
            ud_edges: build_move_table(
                "U/D edge permutation moves",
                N_UD_EDGES,
                CubieState::set_ud_edges,
                CubieState::ud_edges,
                true,
            )?,
        })
    }

    #[must_use]
    pub fn twist(&self, twist: u16, move_: Move) -> u16 {
        self.twist[twist as usize * N_MOVES + move_.index()]
    }

    #[must_use]
    pub fn flip(&self, flip: u16, move_: Move) -> u16 {
        self.flip[flip as usize * N_MOVES + move_.index()]
    }

    #[must_use]
    pub fn slice_sorted(&self, slice_sorted: u16, move_: Move) -> u16 {
        self.slice_sorted[slice_sorted as usize * N_MOVES + move_.index()]
    }

    #[must_use]
    pub fn corners(&self, corners: u16, move_: Move) -> u16 {
        self.corners[corners as usize * N_MOVES + move_.index()]
    }

    /// `move_` must be a G1 move.
    #[must_use]
    pub fn ud_edges(&self, ud_edges: u16, move_: Move) -> u16 {
        self.ud_edges[ud_edges as usize * N_MOVES + move_.index()]
    }
}

fn build_move_table(
    name: &'static str,
    size: usize,
    set: fn(&mut CubieState, u16),
    get: fn(&CubieState) -> u16,
    only_g1: bool,
) -> Result<Box<[u16]>, TableBuildError> {
    let mut table = allocate(name, size * N_MOVES, 0u16)?;
    for coordinate in 0..size {
        let mut base = CubieState::SOLVED;
        set(&mut base, coordinate as u16);
        for face in Face::ALL {
            let generator = CubieState::of_move(Move::new(face, Turn::Clockwise));
            let mut state = base;
            for turn in Turn::ALL {
                state = state.multiply(generator);
                let move_ = Move::new(face, turn);
                if !only_g1 || move_.is_g1() {
                    table[coordinate * N_MOVES + move_.index()] = get(&state);
                }
            }
        }
    }
    Ok(table.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveSequence;

    fn scrambled() -> CubieState {
        CubieState::from_moves(&"F2 R' B U2 L D' R2 B' U F L2".parse::<MoveSequence>().unwrap())
    }

    #[test]
    fn test_solved_coordinates_are_zero() {
        let solved = CubieState::SOLVED;
        assert_eq!(solved.twist(), 0);
        assert_eq!(solved.flip(), 0);
        assert_eq!(solved.slice_sorted(), 0);
        assert_eq!(solved.corners(), 0);
        assert_eq!(solved.ud_edges(), 0);
    }

    #[test]
    fn test_setters_invert_getters() {
        let mut state = CubieState::SOLVED;
        for twist in [0, 1, 1000, N_TWIST as u16 - 1] {
            state.set_twist(twist);
            assert_eq!(state.twist(), twist);
        }
        for flip in [0, 7, 1500, N_FLIP as u16 - 1] {
            state.set_flip(flip);
            assert_eq!(state.flip(), flip);
        }
        for slice_sorted in [0, 23, 24, 5000, N_SLICE_SORTED as u16 - 1] {
            state.set_slice_sorted(slice_sorted);
            assert_eq!(state.slice_sorted(), slice_sorted);
        }
        for corners in [0, 1, 12345, N_CORNERS as u16 - 1] {
            state.set_corners(corners);
            assert_eq!(state.corners(), corners);
        }
        for ud_edges in [0, 2, 30000, N_UD_EDGES as u16 - 1] {
            state.set_ud_edges(ud_edges);
            assert_eq!(state.ud_edges(), ud_edges);
        }
    }

    #[test]
    fn test_setters_keep_invariants() {
        let mut state = CubieState::SOLVED;
        state.set_twist(1234);
        assert_eq!(state.corner_orientation.iter().map(|&o| u32::from(o)).sum::<u32>() % 3, 0);
        state.set_slice_sorted(7777);
        let mut sorted = state.edge_permutation;
        sorted.sort_unstable();
        assert_eq!(sorted, CubieState::SOLVED.edge_permutation);
    }

    #[test]
    fn test_move_tables_track_cubies() {
        let tables = MoveTables::build().unwrap();
        let state = scrambled();
        for move_ in Move::ALL {
            let next = state.apply(move_);
            assert_eq!(tables.twist(state.twist(), move_), next.twist());
            assert_eq!(tables.flip(state.flip(), move_), next.flip());
            assert_eq!(
                tables.slice_sorted(state.slice_sorted(), move_),
                next.slice_sorted()
            );
            assert_eq!(tables.corners(state.corners(), move_), next.corners());
        }

        let g1_state =
            CubieState::from_moves(&"U R2 D' F2 L2 U2 B2 D".parse::<MoveSequence>().unwrap());
        for move_ in Move::ALL.into_iter().filter(|move_| move_.is_g1()) {
            assert_eq!(
                tables.ud_edges(g1_state.ud_edges(), move_),
                g1_state.apply(move_).ud_edges()
            );
        }
    }
}
