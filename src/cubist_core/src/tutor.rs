//! The beginner's layer-by-layer method.
//!
//! Every phase keeps an ordered table of rules. A rule is a short algorithm
//! written as if the piece being worked on sat at the front, together with
//! the reason a person would use it. The solver instantiates each rule for
//! the slot it is working on, optionally after a turn of the top layer,
//! simulates it, and applies the first one that reaches the next goal without
//! disturbing anything already finished.

use crate::{
    cubie::{CubieState, corner, edge},
    moves::{Face, Move, MoveSequence, Template, Turn},
    start, success, working,
};
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Phase {
    CrossOnBottom,
    BottomCorners,
    MiddleLayerEdges,
    /// Orients every top layer piece.
    TopCross,
    /// Places the top layer corners, then the top layer edges.
    TopCornersPermutation,
    Solved,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::CrossOnBottom,
        Phase::BottomCorners,
        Phase::MiddleLayerEdges,
        Phase::TopCross,
        Phase::TopCornersPermutation,
        Phase::Solved,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Phase::CrossOnBottom => "cross on bottom",
            Phase::BottomCorners => "bottom corners",
            Phase::MiddleLayerEdges => "middle layer edges",
            Phase::TopCross => "top cross",
            Phase::TopCornersPermutation => "top layer permutation",
            Phase::Solved => "solved",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorStep {
    pub phase: Phase,
    pub moves: MoveSequence,
    pub rationale: &'static str,
    pub state_after: CubieState,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TutorError {
    #[error("No rule applies to the cube during the {phase} phase")]
    UnrecognizedPattern { phase: Phase },
}

struct Rule {
    template: Template,
    rationale: &'static str,
    /// Try each turn of the top layer before the template.
    adjust_before: bool,
    /// Try each turn of the top layer after the template.
    adjust_after: bool,
}

impl Rule {
    const fn new(notation: &str, rationale: &'static str) -> Rule {
        Rule {
            template: Template::new(notation),
            rationale,
            adjust_before: true,
            adjust_after: false,
        }
    }

    const fn fixed(self) -> Rule {
        Rule {
            adjust_before: false,
            ..self
        }
    }

    const fn with_final_adjust(self) -> Rule {
        Rule {
            adjust_after: true,
            ..self
        }
    }
}

const TOP_ADJUSTMENTS: [Option<Turn>; 4] = [
    None,
    Some(Turn::Clockwise),
    Some(Turn::Half),
    Some(Turn::CounterClockwise),
];

/// Rotating the frame by one relabels F as R, R as B, B as L and L as F.
const SIDE_FACES: [Face; 4] = [Face::F, Face::R, Face::B, Face::L];

const ALL_ROTATIONS: [usize; 4] = [0, 1, 2, 3];

fn rotate(face: Face, rotation: usize) -> Face {
    match SIDE_FACES.iter().position(|&side| side == face) {
        Some(i) => SIDE_FACES[(i + rotation) % SIDE_FACES.len()],
        None => face,
    }
}

const CROSS_RULES: [Rule; 3] = [
    Rule::new(
        "F2",
        "The bottom edge is above its slot with its bottom colour facing up; turn it straight down.",
    ),
    Rule::new(
        "U' R' F R",
        "The bottom edge is above its slot but flipped; bring it round the right face so it drops in the right way up.",
    ),
    Rule::new(
        "U L F' L'",
        "The bottom edge is above its slot but flipped; bring it round the left face so it drops in the right way up.",
    ),
];

const CROSS_STAGING: [Rule; 3] = [
    Rule::new("F2", "Lift the bottom edge out of the bottom layer into the top layer.").fixed(),
    Rule::new(
        "F U F'",
        "Lift the edge out of its side slot into the top layer, then restore the side face.",
    )
    .fixed(),
    Rule::new(
        "F' U F",
        "Lift the edge out of its side slot into the top layer, then restore the side face.",
    )
    .fixed(),
];

const BOTTOM_CORNER_RULES: [Rule; 8] = [
    Rule::new(
        "R U R'",
        "The corner is above its slot with its bottom colour facing right; tuck it in from the right.",
    ),
    Rule::new(
        "F' U' F",
        "The corner is above its slot with its bottom colour facing front; tuck it in from the front.",
    ),
    Rule::new(
        "R U2 R' U' R U R'",
        "The corner's bottom colour faces up; turn it sideways first, then insert it.",
    ),
    Rule::new(
        "R U R' U'",
        "Repeat R U R' U' until the corner drops into its slot the right way round.",
    ),
    Rule::new(
        "R U R' U' R U R' U'",
        "Repeat R U R' U' until the corner drops into its slot the right way round.",
    ),
    Rule::new(
        "R U R' U' R U R' U' R U R' U'",
        "Repeat R U R' U' until the corner drops into its slot the right way round.",
    ),
    Rule::new(
        "R U R' U' R U R' U' R U R' U' R U R' U'",
        "Repeat R U R' U' until the corner drops into its slot the right way round.",
    ),
    Rule::new(
        "R U R' U' R U R' U' R U R' U' R U R' U' R U R' U'",
        "Repeat R U R' U' until the corner drops into its slot the right way round.",
    ),
];

const BOTTOM_CORNER_STAGING: [Rule; 2] = [
    Rule::new("R U R'", "Lift the corner out of the bottom layer into the top layer.").fixed(),
    Rule::new("F' U' F", "Lift the corner out of the bottom layer into the top layer.").fixed(),
];

const MIDDLE_EDGE_RULES: [Rule; 2] = [
    Rule::new(
        "U R U' R' U' F' U F",
        "The edge's front colour matches the front centre; insert it to the right.",
    ),
    Rule::new(
        "U' F' U F U R U' R'",
        "The edge's side colour matches the right centre; insert it from the right side into the front slot.",
    ),
];

const MIDDLE_EDGE_STAGING: [Rule; 1] = [Rule::new(
    "U R U' R' U' F' U F",
    "The edge is stuck in a middle slot; swap any top edge in to push it out.",
)
.fixed()];

const TOP_EDGE_RULES: [Rule; 2] = [
    Rule::new(
        "F R U R' U' F'",
        "Orient the top edges: with a line held sideways, or from a dot, this makes progress towards the cross.",
    ),
    Rule::new(
        "F U R U' R' F'",
        "Orient the top edges: with an L shape held at the back left, this finishes the cross.",
    ),
];

const TOP_CORNER_RULES: [Rule; 7] = [
    Rule::new(
        "R U R' U R U2 R'",
        "One corner is oriented and the front left corner shows its top colour on the front (Sune).",
    ),
    Rule::new(
        "R U2 R' U' R U' R'",
        "One corner is oriented and the front right corner shows its top colour on the right (Antisune).",
    ),
    Rule::new(
        "R U R' U R U' R' U R U2 R'",
        "No corner is oriented and the top colours face left and right in pairs.",
    ),
    Rule::new(
        "R U2 R2 U' R2 U' R2 U2 R",
        "No corner is oriented and the left corners show their top colour on the left.",
    ),
    Rule::new(
        "R2 D R' U2 R D' R' U2 R'",
        "Two adjacent corners are oriented and the front ones show headlights.",
    ),
    Rule::new(
        "L F R' F' L' F R F'",
        "Two adjacent corners are oriented and the others face front and back.",
    ),
    Rule::new(
        "R' F R B' R' F' R B",
        "Two diagonal corners are oriented.",
    ),
];

const TOP_CORNER_PERMUTATION_RULES: [Rule; 5] = [
    Rule::new(
        "R U R' U' R' F R2 U' R' U' R U R' F'",
        "Swap the two right corners (T permutation).",
    ),
    Rule::new(
        "F R U' R' U' R U R' F' R U R' U' R' F R F'",
        "Swap two diagonal corners (Y permutation).",
    ),
    Rule::new(
        "R U R' F' R U R' U' R' F R2 U' R'",
        "Swap the two right corners while cycling edges (J permutation).",
    ),
    Rule::new(
        "R' F R' B2 R F' R' B2 R2",
        "Cycle three corners clockwise, keeping the back left corner (A permutation).",
    ),
    Rule::new(
        "R2 B2 R F R' B2 R F' R",
        "Cycle three corners counterclockwise, keeping the back left corner (A permutation).",
    ),
];

const TOP_EDGE_PERMUTATION_RULES: [Rule; 5] = [
    Rule::new("", "Turn the top layer to line it up with the rest of the cube."),
    Rule::new(
        "R U' R U R U R U' R' U' R2",
        "Cycle three top edges, keeping the back edge (U permutation).",
    )
    .with_final_adjust(),
    Rule::new(
        "R2 U R U R' U' R' U' R' U R'",
        "Cycle three top edges the other way, keeping the back edge (U permutation).",
    )
    .with_final_adjust(),
    Rule::new(
        "R2 U2 R U2 R2 U2 R2 U2 R U2 R2",
        "Swap opposite top edges in both pairs (H permutation).",
    )
    .with_final_adjust(),
    Rule::new(
        "R' U' R2 U R U R' U' R U R U' R U' R'",
        "Swap adjacent top edges in both pairs (Z permutation).",
    )
    .with_final_adjust(),
];

#[derive(Debug, Clone, Copy)]
enum Piece {
    Edge(u8),
    Corner(u8),
}

impl Piece {
    fn is_solved(self, state: &CubieState) -> bool {
        match self {
            Piece::Edge(slot) => state.edge_solved(slot),
            Piece::Corner(slot) => state.corner_solved(slot),
        }
    }

    fn in_top_layer(self, state: &CubieState) -> bool {
        match self {
            Piece::Edge(cubie) => state.edge_position(cubie) <= edge::UB as usize,
            Piece::Corner(cubie) => state.corner_position(cubie) <= corner::UBR as usize,
        }
    }
}

// Ordered by rotation: the piece at index `r` is the front-frame target
// rotated `r` times.
const CROSS_TARGETS: [Piece; 4] = [
    Piece::Edge(edge::DF),
    Piece::Edge(edge::DR),
    Piece::Edge(edge::DB),
    Piece::Edge(edge::DL),
];
const BOTTOM_CORNER_TARGETS: [Piece; 4] = [
    Piece::Corner(corner::DFR),
    Piece::Corner(corner::DRB),
    Piece::Corner(corner::DBL),
    Piece::Corner(corner::DLF),
];
const MIDDLE_EDGE_TARGETS: [Piece; 4] = [
    Piece::Edge(edge::FR),
    Piece::Edge(edge::BR),
    Piece::Edge(edge::BL),
    Piece::Edge(edge::FL),
];

fn oriented_top_edges(state: &CubieState) -> usize {
    state.edge_orientation[..4].iter().filter(|&&o| o == 0).count()
}

fn top_oriented(state: &CubieState) -> bool {
    oriented_top_edges(state) == 4 && state.corner_orientation[..4].iter().all(|&o| o == 0)
}

/// Whether some turn of the top layer solves all four top corners.
fn top_corners_placed(state: &CubieState) -> bool {
    TOP_ADJUSTMENTS.iter().any(|adjustment| {
        let state = match adjustment {
            Some(turn) => state.apply(Move::new(Face::U, *turn)),
            None => *state,
        };
        (corner::URF..=corner::UBR).all(|slot| state.corner_solved(slot))
    })
}

/// A deterministic, explained solve using the beginner's method.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerByLayerSolver;

impl LayerByLayerSolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Solves a validated `state` one explained step at a time. The moves of
    /// all steps, in order, solve the cube; the last step is a
    /// [`Phase::Solved`] marker without moves.
    ///
    /// # Errors
    ///
    /// `UnrecognizedPattern` if no rule fits, which only happens for states
    /// that are not legal cubes.
    pub fn solve(&self, state: &CubieState) -> Result<Vec<TutorStep>, TutorError> {
        info!(start!("Solving layer by layer"));

        let mut walkthrough = Walkthrough {
            state: *state,
            steps: vec![],
            finished: vec![],
        };
        walkthrough.place_pieces(
            Phase::CrossOnBottom,
            &CROSS_TARGETS,
            &CROSS_RULES,
            &CROSS_STAGING,
        )?;
        walkthrough.place_pieces(
            Phase::BottomCorners,
            &BOTTOM_CORNER_TARGETS,
            &BOTTOM_CORNER_RULES,
            &BOTTOM_CORNER_STAGING,
        )?;
        walkthrough.place_pieces(
            Phase::MiddleLayerEdges,
            &MIDDLE_EDGE_TARGETS,
            &MIDDLE_EDGE_RULES,
            &MIDDLE_EDGE_STAGING,
        )?;
        walkthrough.orient_top()?;
        walkthrough.permute_top()?;

        let Walkthrough {
            state, mut steps, ..
        } = walkthrough;
        steps.push(TutorStep {
            phase: Phase::Solved,
            moves: MoveSequence::default(),
            rationale: "Every face is a single colour.",
            state_after: state,
        });
        info!(
            success!("Solved in {} steps and {} moves"),
            steps.len(),
            steps.iter().map(|step| step.moves.len()).sum::<usize>()
        );
        Ok(steps)
    }
}

struct Walkthrough {
    state: CubieState,
    steps: Vec<TutorStep>,
    /// Pieces no later step may disturb.
    finished: Vec<Piece>,
}

impl Walkthrough {
    fn place_pieces(
        &mut self,
        phase: Phase,
        targets: &[Piece; 4],
        rules: &[Rule],
        staging: &[Rule],
    ) -> Result<(), TutorError> {
        for (rotation, &target) in targets.iter().enumerate() {
            while !target.is_solved(&self.state) {
                if self.apply_first_match(phase, rules, &[rotation], |_, after| {
                    target.is_solved(after)
                }) {
                    continue;
                }
                if !target.in_top_layer(&self.state)
                    && self.apply_first_match(phase, staging, &ALL_ROTATIONS, |_, after| {
                        target.in_top_layer(after)
                    })
                {
                    continue;
                }
                return Err(TutorError::UnrecognizedPattern { phase });
            }
            self.finished.push(target);
        }
        Ok(())
    }

    fn orient_top(&mut self) -> Result<(), TutorError> {
        let phase = Phase::TopCross;
        while oriented_top_edges(&self.state) < 4 {
            if !self.apply_first_match(phase, &TOP_EDGE_RULES, &[0], |before, after| {
                oriented_top_edges(after) > oriented_top_edges(before)
            }) {
                return Err(TutorError::UnrecognizedPattern { phase });
            }
        }
        if !top_oriented(&self.state)
            && !self.apply_first_match(phase, &TOP_CORNER_RULES, &[0], |_, after| {
                top_oriented(after)
            })
        {
            return Err(TutorError::UnrecognizedPattern { phase });
        }
        Ok(())
    }

    fn permute_top(&mut self) -> Result<(), TutorError> {
        let phase = Phase::TopCornersPermutation;
        if !top_corners_placed(&self.state)
            && !self.apply_first_match(phase, &TOP_CORNER_PERMUTATION_RULES, &[0], |_, after| {
                top_oriented(after) && top_corners_placed(after)
            })
        {
            return Err(TutorError::UnrecognizedPattern { phase });
        }
        if !self.state.is_solved()
            && !self.apply_first_match(phase, &TOP_EDGE_PERMUTATION_RULES, &[0], |_, after| {
                after.is_solved()
            })
        {
            return Err(TutorError::UnrecognizedPattern { phase });
        }
        Ok(())
    }

    /// Applies the first instantiation of `rules` that satisfies `goal` and
    /// keeps every finished piece solved. Returns whether one was found.
    fn apply_first_match(
        &mut self,
        phase: Phase,
        rules: &[Rule],
        rotations: &[usize],
        goal: impl Fn(&CubieState, &CubieState) -> bool,
    ) -> bool {
        for rule in rules {
            for &rotation in rotations {
                for before in adjustments(rule.adjust_before) {
                    for after in adjustments(rule.adjust_after) {
                        let moves: MoveSequence = before
                            .iter()
                            .copied()
                            .chain(rule.template.moves().iter().map(|move_| {
                                Move::new(rotate(move_.face, rotation), move_.turn)
                            }))
                            .chain(after.iter().copied())
                            .collect();
                        let next = self.state.apply_sequence(&moves);
                        if !goal(&self.state, &next)
                            || !self.finished.iter().all(|piece| piece.is_solved(&next))
                        {
                            continue;
                        }

                        let moves = moves.simplify();
                        debug!(working!("{}: {}"), phase, moves);
                        self.state = next;
                        self.steps.push(TutorStep {
                            phase,
                            moves,
                            rationale: rule.rationale,
                            state_after: next,
                        });
                        return true;
                    }
                }
            }
        }
        false
    }
}

fn adjustments(enabled: bool) -> impl Iterator<Item = Option<Move>> {
    let count = if enabled { TOP_ADJUSTMENTS.len() } else { 1 };
    TOP_ADJUSTMENTS
        .into_iter()
        .take(count)
        .map(|adjustment| adjustment.map(|turn| Move::new(Face::U, turn)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(scramble: &str) -> (CubieState, Vec<TutorStep>) {
        let state = CubieState::from_moves(&scramble.parse().unwrap());
        let steps = LayerByLayerSolver::new().solve(&state).unwrap();
        (state, steps)
    }

    #[test]
    fn test_rotation_relabels_side_faces() {
        assert_eq!(rotate(Face::F, 1), Face::R);
        assert_eq!(rotate(Face::L, 1), Face::F);
        assert_eq!(rotate(Face::R, 2), Face::L);
        assert_eq!(rotate(Face::U, 3), Face::U);
        assert_eq!(rotate(Face::D, 1), Face::D);
    }

    #[test_log::test]
    fn test_solved_cube_is_only_the_marker() {
        let steps = LayerByLayerSolver::new()
            .solve(&CubieState::SOLVED)
            .unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].phase, Phase::Solved);
        assert!(steps[0].moves.is_empty());
    }

    #[test_log::test]
    fn test_steps_solve_the_cube() {
        let (state, steps) = solve("D2 F' R U2 B L' D R2 F U' L2 B' R D' F2 U B2 L R' U");
        let mut replay = state;
        for step in &steps {
            replay = replay.apply_sequence(&step.moves);
            assert_eq!(replay, step.state_after);
        }
        assert!(replay.is_solved());
        assert_eq!(steps.last().map(|step| step.phase), Some(Phase::Solved));
    }

    #[test_log::test]
    fn test_phases_never_go_back() {
        let (_, steps) = solve("R U F' L2 D B' R2 U' F D2 L B2");
        assert!(steps.windows(2).all(|pair| pair[0].phase <= pair[1].phase));
    }

    #[test_log::test]
    fn test_last_layer_only() {
        let (_, steps) = solve("R U R' U R U2 R'");
        assert!(steps[..steps.len() - 1].iter().all(|step| step.phase >= Phase::TopCross));
    }

    #[test_log::test]
    fn test_illegal_state_is_unrecognized() {
        let mut state = CubieState::SOLVED;
        state.corner_orientation[corner::URF as usize] = 1;
        let error = LayerByLayerSolver::new().solve(&state).unwrap_err();
        assert_eq!(
            error,
            TutorError::UnrecognizedPattern {
                phase: Phase::TopCross
            }
        );
    }
}
