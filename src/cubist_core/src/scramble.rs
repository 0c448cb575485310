//! Random scrambles in the WCA style, plus a few well known pattern
//! algorithms.

use crate::moves::{Face, Move, MoveSequence, Template, Turn};
use std::{collections::VecDeque, fmt, str::FromStr};
use thiserror::Error;

pub const DEFAULT_LENGTH: usize = 25;

/// A scramble of `length` moves from the thread-local generator.
#[must_use]
pub fn generate(length: usize) -> MoveSequence {
    generate_with(&mut fastrand::Rng::new(), length)
}

/// The same `seed` always produces the same scramble.
#[must_use]
pub fn generate_seeded(length: usize, seed: u64) -> MoveSequence {
    generate_with(&mut fastrand::Rng::with_seed(seed), length)
}

/// Never turns a face twice in a row, and never turns a face again right
/// after its opposite face when that opposite face followed it.
pub fn generate_with(rng: &mut fastrand::Rng, length: usize) -> MoveSequence {
    let mut moves = Vec::with_capacity(length);
    let mut last: Option<Face> = None;
    let mut second_last: Option<Face> = None;
    for _ in 0..length {
        let candidates: Vec<Face> = Face::ALL
            .into_iter()
            .filter(|&face| allowed_after(face, last, second_last))
            .collect();
        let face = candidates[rng.usize(..candidates.len())];
        let turn = Turn::ALL[rng.usize(..Turn::ALL.len())];
        moves.push(Move::new(face, turn));
        second_last = last;
        last = Some(face);
    }
    MoveSequence::new(moves)
}

fn allowed_after(face: Face, last: Option<Face>, second_last: Option<Face>) -> bool {
    match (last, second_last) {
        (Some(last), _) if last == face => false,
        (Some(last), Some(second_last)) => !(second_last == face && last == face.opposite()),
        _ => true,
    }
}

/// Whether `moves` could have come from [`generate`].
#[must_use]
pub fn is_valid_scramble(moves: &[Move]) -> bool {
    moves.windows(2).all(|pair| pair[0].face != pair[1].face)
        && moves
            .windows(3)
            .all(|triple| allowed_after(triple[2].face, Some(triple[1].face), Some(triple[0].face)))
}

/// Hands out scrambles from one generator, avoiding any it handed out
/// recently.
#[derive(Debug)]
pub struct ScrambleGenerator {
    rng: fastrand::Rng,
    history: VecDeque<MoveSequence>,
    max_history: usize,
}

impl Default for ScrambleGenerator {
    fn default() -> Self {
        Self::new(fastrand::Rng::new())
    }
}

impl ScrambleGenerator {
    const MAX_ATTEMPTS: usize = 50;

    #[must_use]
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            history: VecDeque::new(),
            max_history: 100,
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(fastrand::Rng::with_seed(seed))
    }

    pub fn generate(&mut self, length: usize) -> MoveSequence {
        let mut scramble = generate_with(&mut self.rng, length);
        for _ in 1..Self::MAX_ATTEMPTS {
            if !self.history.contains(&scramble) {
                break;
            }
            scramble = generate_with(&mut self.rng, length);
        }

        self.history.push_back(scramble.clone());
        if self.history.len() > self.max_history {
            self.history.pop_front();
        }
        scramble
    }

    /// `count` scrambles for a session of solves.
    pub fn session(&mut self, count: usize, length: usize) -> Vec<MoveSequence> {
        (0..count).map(|_| self.generate(length)).collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown pattern `{0}`")]
pub struct UnknownPatternError(pub String);

/// Decorative patterns reachable from the solved cube with face turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Superflip,
    CubeInCube,
    FourSpots,
    SixSpots,
    Cross,
    Plus,
    Tetris,
    Anaconda,
}

impl Pattern {
    pub const ALL: [Pattern; 8] = [
        Pattern::Superflip,
        Pattern::CubeInCube,
        Pattern::FourSpots,
        Pattern::SixSpots,
        Pattern::Cross,
        Pattern::Plus,
        Pattern::Tetris,
        Pattern::Anaconda,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Pattern::Superflip => "superflip",
            Pattern::CubeInCube => "cube_in_cube",
            Pattern::FourSpots => "four_spots",
            Pattern::SixSpots => "six_spots",
            Pattern::Cross => "cross",
            Pattern::Plus => "plus",
            Pattern::Tetris => "tetris",
            Pattern::Anaconda => "anaconda",
        }
    }

    fn template(self) -> Template {
        const SUPERFLIP: Template =
            Template::new("U R2 F B R B2 R U2 L B2 R U' D' R2 F R' L B2 U2 F2");
        const CUBE_IN_CUBE: Template = Template::new("F L F U' R U F2 L2 U' L' B D' B' L2 U");
        const FOUR_SPOTS: Template = Template::new("F2 B2 R2 L2 U2 D2");
        const SIX_SPOTS: Template = Template::new("U D' R L' F B' U D'");
        const CROSS: Template = Template::new("R2 L2 U2 D2 F2 B2");
        const PLUS: Template = Template::new("R L' U D' F B'");
        const TETRIS: Template = Template::new("L R F B U D L R");
        const ANACONDA: Template = Template::new("L U B' U' R L' B R' F B' D R");

        match self {
            Pattern::Superflip => SUPERFLIP,
            Pattern::CubeInCube => CUBE_IN_CUBE,
            Pattern::FourSpots => FOUR_SPOTS,
            Pattern::SixSpots => SIX_SPOTS,
            Pattern::Cross => CROSS,
            Pattern::Plus => PLUS,
            Pattern::Tetris => TETRIS,
            Pattern::Anaconda => ANACONDA,
        }
    }

    #[must_use]
    pub fn moves(self) -> MoveSequence {
        self.template().to_sequence()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = UnknownPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Pattern::ALL
            .into_iter()
            .find(|pattern| pattern.name() == normalized)
            .ok_or_else(|| UnknownPatternError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubie::CubieState;

    #[test]
    fn test_generated_scrambles_are_valid() {
        let mut rng = fastrand::Rng::with_seed(42);
        for length in [0, 1, 2, 3, 25, 100] {
            let scramble = generate_with(&mut rng, length);
            assert_eq!(scramble.len(), length);
            assert!(is_valid_scramble(&scramble), "{scramble}");
        }
    }

    #[test]
    fn test_seeded_scrambles_repeat() {
        assert_eq!(generate_seeded(25, 7), generate_seeded(25, 7));
        assert_ne!(generate_seeded(25, 7), generate_seeded(25, 8));
    }

    #[test]
    fn test_is_valid_scramble() {
        let valid = |s: &str| is_valid_scramble(&s.parse::<MoveSequence>().unwrap());
        assert!(valid(""));
        assert!(valid("R U R' U'"));
        assert!(valid("R L U"));
        assert!(!valid("R R"));
        assert!(!valid("R L R"));
        assert!(!valid("U F F2"));
    }

    #[test]
    fn test_generator_avoids_recent_scrambles() {
        let mut generator = ScrambleGenerator::seeded(3);
        let session = generator.session(20, 2);
        for (i, scramble) in session.iter().enumerate() {
            assert!(!session[..i].contains(scramble), "{scramble}");
        }
        generator.clear_history();
        assert!(generator.history.is_empty());
    }

    #[test]
    fn test_patterns() {
        for pattern in Pattern::ALL {
            let moves = pattern.moves();
            assert!(!CubieState::from_moves(&moves).is_solved(), "{pattern}");
            assert_eq!(pattern.to_string().parse::<Pattern>(), Ok(pattern));
        }
        assert_eq!("Cube-in-cube".parse::<Pattern>(), Ok(Pattern::CubeInCube));
        assert!("checkerboard".parse::<Pattern>().is_err());

        let superflip = CubieState::from_moves(&Pattern::Superflip.moves());
        assert_eq!(superflip.edge_orientation, [1; 12]);
        assert_eq!(superflip.edge_permutation, CubieState::SOLVED.edge_permutation);
    }
}
