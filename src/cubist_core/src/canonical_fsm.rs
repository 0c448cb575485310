//! Canonical move sequence automaton, after Lucas Garron's implementation in
//! twsearch:
//! https://github.com/cubing/twsearch/blob/main/src/rs/_internal/canonical_fsm/canonical_fsm.rs
//!
//! Both searches walk it alongside the move sequence so that a face is never
//! turned twice in a row and commuting faces (U and D, R and L, F and B) are
//! only ever turned in one order.

use crate::{
    cubie::CubieState,
    moves::{Face, Move, Turn},
};
use std::collections::HashMap;

const NUM_MOVE_CLASSES: usize = Face::ALL.len();

// Bit N is indexed by the face with `Face::index` N.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
struct MoveClassMask(u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonicalFsmState(usize);

const ILLEGAL: CanonicalFsmState = CanonicalFsmState(usize::MAX);

#[derive(Debug)]
pub struct CanonicalFsm {
    next_state_lookup: Vec<[CanonicalFsmState; NUM_MOVE_CLASSES]>,
}

impl Default for CanonicalFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalFsm {
    #[must_use]
    pub fn new() -> Self {
        let generators =
            Face::ALL.map(|face| *CubieState::of_move(Move::new(face, Turn::Clockwise)));

        let mut commutes = [MoveClassMask((1 << NUM_MOVE_CLASSES) - 1); NUM_MOVE_CLASSES];
        for i in 0..NUM_MOVE_CLASSES {
            for j in 0..NUM_MOVE_CLASSES {
                if generators[i].multiply(&generators[j]) != generators[j].multiply(&generators[i])
                {
                    commutes[i].0 &= !(1 << j);
                    commutes[j].0 &= !(1 << i);
                }
            }
        }

        let mut next_state_lookup = vec![];
        let mut mask_to_state = HashMap::from([(MoveClassMask(0), CanonicalFsmState(0))]);
        // Indexed by state ordinal: the move classes in the sequence so far
        // that no later move has failed to commute with
        let mut state_to_mask = vec![MoveClassMask(0)];

        let mut queue_index = 0;
        while queue_index < state_to_mask.len() {
            let mut next_state = [ILLEGAL; NUM_MOVE_CLASSES];
            let dequeue_mask = state_to_mask[queue_index];
            queue_index += 1;

            for move_class in 0..NUM_MOVE_CLASSES {
                // A greater move class in the state that commutes with this
                // one must come after it, and a class may not follow itself
                if (dequeue_mask.0 & commutes[move_class].0) >> (move_class + 1) != 0
                    || (dequeue_mask.0 >> move_class) & 1 != 0
                {
                    continue;
                }

                let mut next_bits = (dequeue_mask.0 & commutes[move_class].0) | (1 << move_class);
                // Classes with identical commutation sets are interchangeable;
                // keeping only the greatest keeps the state count small
                for i in 0..NUM_MOVE_CLASSES {
                    if (next_bits >> i) & 1 == 0 {
                        continue;
                    }
                    for j in (i + 1)..NUM_MOVE_CLASSES {
                        if (next_bits >> j) & 1 != 0 && commutes[i] == commutes[j] {
                            next_bits &= !(1 << i);
                        }
                    }
                }

                let next_mask = MoveClassMask(next_bits);
                next_state[move_class] = *mask_to_state.entry(next_mask).or_insert_with(|| {
                    state_to_mask.push(next_mask);
                    CanonicalFsmState(state_to_mask.len() - 1)
                });
            }
            next_state_lookup.push(next_state);
        }

        Self { next_state_lookup }
    }

    /// The state after turning `face`, or `None` if that turn is redundant.
    #[must_use]
    pub fn next_state(
        &self,
        current_fsm_state: CanonicalFsmState,
        face: Face,
    ) -> Option<CanonicalFsmState> {
        match self.next_state_lookup[current_fsm_state.0][face.index()] {
            ILLEGAL => None,
            state => Some(state),
        }
    }

    /// Whether `moves` is a sequence the automaton accepts.
    #[must_use]
    pub fn accepts(&self, moves: &[Move]) -> bool {
        moves
            .iter()
            .try_fold(CanonicalFsmState::default(), |state, move_| {
                self.next_state(state, move_.face)
            })
            .is_some()
    }
}
