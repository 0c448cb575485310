use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref, str::FromStr};
use thiserror::Error;

/// The six faces, in the order facelet strings list them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn opposite(self) -> Face {
        Face::ALL[(self as usize + 3) % 6]
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    #[must_use]
    pub fn from_letter(letter: char) -> Option<Face> {
        Face::ALL.into_iter().find(|face| face.letter() == letter)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// How far a face is turned, measured clockwise while looking at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Turn {
    Clockwise = 1,
    Half = 2,
    CounterClockwise = 3,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Clockwise, Turn::Half, Turn::CounterClockwise];

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self as u8
    }

    /// `None` when the turns cancel out to nothing.
    #[must_use]
    pub const fn from_quarter_turns(quarter_turns: u8) -> Option<Turn> {
        match quarter_turns % 4 {
            1 => Some(Turn::Clockwise),
            2 => Some(Turn::Half),
            3 => Some(Turn::CounterClockwise),
            _ => None,
        }
    }

    #[must_use]
    pub const fn inverse(self) -> Turn {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::Half => Turn::Half,
            Turn::CounterClockwise => Turn::Clockwise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    pub face: Face,
    pub turn: Turn,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("Unrecognized move `{0}`")]
    UnknownMove(String),
    #[error("Wide, slice, and rotation moves are not supported: `{0}`")]
    UnsupportedMove(String),
}

impl Move {
    /// Every move in the fixed order searches enumerate them in. Ties between
    /// equally long solutions are broken by this order.
    pub const ALL: [Move; 18] = {
        let mut all = [Move::new(Face::U, Turn::Clockwise); 18];
        let mut i = 0;
        while i < 18 {
            all[i] = Move::new(Face::ALL[i / 3], Turn::ALL[i % 3]);
            i += 1;
        }
        all
    };

    #[must_use]
    pub const fn new(face: Face, turn: Turn) -> Move {
        Move { face, turn }
    }

    /// Position of the move in [`Move::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.face.index() * 3 + self.turn.quarter_turns() as usize - 1
    }

    #[must_use]
    pub const fn inverse(self) -> Move {
        Move::new(self.face, self.turn.inverse())
    }

    /// Whether the move keeps the cube inside the subgroup
    /// `<U, D, R2, L2, F2, B2>`.
    #[must_use]
    pub const fn is_g1(self) -> bool {
        matches!(self.face, Face::U | Face::D) || matches!(self.turn, Turn::Half)
    }

    /// How the animation layer should rotate the turned slab.
    #[must_use]
    pub const fn rotation(self) -> Rotation {
        let (axis, layer) = match self.face {
            Face::R => (Axis::X, 1),
            Face::L => (Axis::X, -1),
            Face::U => (Axis::Y, 1),
            Face::D => (Axis::Y, -1),
            Face::F => (Axis::Z, 1),
            Face::B => (Axis::Z, -1),
        };
        // Clockwise seen from outside the face is negative about its outward
        // normal; half turns are reported unsigned.
        let degrees = match self.turn {
            Turn::Clockwise => -90 * layer as i16,
            Turn::Half => 180,
            Turn::CounterClockwise => 90 * layer as i16,
        };
        Rotation {
            axis,
            layer,
            degrees,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turn {
            Turn::Clockwise => write!(f, "{}", self.face),
            Turn::Half => write!(f, "{}2", self.face),
            Turn::CounterClockwise => write!(f, "{}'", self.face),
        }
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(letter) = chars.next() else {
            return Err(ParseMoveError::UnknownMove(s.to_owned()));
        };
        let Some(face) = Face::from_letter(letter) else {
            let slice_wide_or_rotation = matches!(
                letter,
                'M' | 'E' | 'S' | 'x' | 'y' | 'z' | 'u' | 'r' | 'f' | 'd' | 'l' | 'b'
            );
            return Err(if slice_wide_or_rotation {
                ParseMoveError::UnsupportedMove(s.to_owned())
            } else {
                ParseMoveError::UnknownMove(s.to_owned())
            });
        };
        let turn = match chars.as_str() {
            "" | "1" => Turn::Clockwise,
            "2" | "2'" | "2’" => Turn::Half,
            "'" | "’" | "3" => Turn::CounterClockwise,
            "w" | "w2" | "w'" | "w’" => return Err(ParseMoveError::UnsupportedMove(s.to_owned())),
            _ => return Err(ParseMoveError::UnknownMove(s.to_owned())),
        };
        Ok(Move::new(face, turn))
    }
}

impl From<Move> for String {
    fn from(move_: Move) -> Self {
        move_.to_string()
    }
}

impl TryFrom<String> for Move {
    type Error = ParseMoveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One row of the move to animation table. `layer` is `1` for the slab on the
/// positive side of `axis`, `-1` for the negative side, and `degrees` is
/// signed about the positive axis using the right-hand rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rotation {
    pub axis: Axis,
    pub layer: i8,
    pub degrees: i16,
}

/// An ordered list of face turns. Solvers hand these out and never change them
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveSequence(Vec<Move>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveStats {
    pub total: usize,
    pub quarter_turns: usize,
    pub half_turns: usize,
    /// Indexed by [`Face::index`].
    pub face_counts: [usize; 6],
}

impl MoveSequence {
    #[must_use]
    pub fn new(moves: Vec<Move>) -> Self {
        Self(moves)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Move> {
        self.0
    }

    /// Concatenation: `self` first, then `other`.
    #[must_use]
    pub fn compose(&self, other: &MoveSequence) -> MoveSequence {
        self.0.iter().chain(&other.0).copied().collect()
    }

    #[must_use]
    pub fn inverse(&self) -> MoveSequence {
        self.0.iter().rev().map(|move_| move_.inverse()).collect()
    }

    /// Merges turns of the same face and drops turns that cancel. Opposite
    /// faces commute, so `R L R` merges into `R2 L`, but `R U R` is left
    /// alone.
    #[must_use]
    pub fn simplify(&self) -> MoveSequence {
        let mut out: Vec<Move> = Vec::with_capacity(self.0.len());
        for &move_ in &self.0 {
            let len = out.len();
            let target = if len >= 1 && out[len - 1].face == move_.face {
                Some(len - 1)
            } else if len >= 2
                && out[len - 1].face == move_.face.opposite()
                && out[len - 2].face == move_.face
            {
                Some(len - 2)
            } else {
                None
            };

            match target {
                Some(i) => {
                    let quarter_turns = out[i].turn.quarter_turns() + move_.turn.quarter_turns();
                    match Turn::from_quarter_turns(quarter_turns) {
                        Some(turn) => out[i].turn = turn,
                        None => {
                            out.remove(i);
                        }
                    }
                }
                None => out.push(move_),
            }
        }
        MoveSequence(out)
    }

    #[must_use]
    pub fn stats(&self) -> MoveStats {
        let mut stats = MoveStats {
            total: self.0.len(),
            ..MoveStats::default()
        };
        for move_ in &self.0 {
            stats.face_counts[move_.face.index()] += 1;
            if move_.turn == Turn::Half {
                stats.half_turns += 1;
            } else {
                stats.quarter_turns += 1;
            }
        }
        stats
    }

    /// Start indices of every occurrence of `pattern`, overlapping ones
    /// included. An empty pattern occurs nowhere.
    #[must_use]
    pub fn find_all(&self, pattern: &[Move]) -> Vec<usize> {
        if pattern.is_empty() {
            return vec![];
        }
        self.0
            .windows(pattern.len())
            .positions(|window| window == pattern)
            .collect()
    }

    /// Replaces occurrences of `pattern` scanning left to right, resuming
    /// after each replaced occurrence.
    #[must_use]
    pub fn replace_all(&self, pattern: &[Move], replacement: &[Move]) -> MoveSequence {
        if pattern.is_empty() {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.0.len());
        let mut rest = &self.0[..];
        while !rest.is_empty() {
            if rest.starts_with(pattern) {
                out.extend_from_slice(replacement);
                rest = &rest[pattern.len()..];
            } else {
                out.push(rest[0]);
                rest = &rest[1..];
            }
        }
        MoveSequence(out)
    }

    /// Formats the sequence over several lines, breaking whenever a line
    /// would exceed `line_length` characters or `moves_per_line` moves.
    #[must_use]
    pub fn format_wrapped(&self, line_length: usize, moves_per_line: usize) -> String {
        let mut lines: Vec<String> = vec![];
        let mut line = String::new();
        let mut moves_in_line = 0;
        for move_ in &self.0 {
            let token = move_.to_string();
            let extra = token.len() + usize::from(moves_in_line > 0);
            if moves_in_line > 0
                && (moves_in_line >= moves_per_line || line.len() + extra > line_length)
            {
                lines.push(std::mem::take(&mut line));
                moves_in_line = 0;
            }
            if moves_in_line > 0 {
                line.push(' ');
            }
            line.push_str(&token);
            moves_in_line += 1;
        }
        if moves_in_line > 0 {
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl Deref for MoveSequence {
    type Target = [Move];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Move> for MoveSequence {
    fn from_iter<T: IntoIterator<Item = Move>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MoveSequence {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

impl FromStr for MoveSequence {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace().map(str::parse).collect()
    }
}

const MAX_TEMPLATE_LEN: usize = 20;

/// A move sequence written in notation and parsed when the crate compiles,
/// so a typo fails the build instead of a solve.
#[derive(Clone, Copy)]
pub(crate) struct Template {
    moves: [Move; MAX_TEMPLATE_LEN],
    len: usize,
}

impl Template {
    pub(crate) const fn new(notation: &str) -> Template {
        let bytes = notation.as_bytes();
        let mut moves = [Move::new(Face::U, Turn::Clockwise); MAX_TEMPLATE_LEN];
        let mut len = 0;
        let mut i = 0;
        while i < bytes.len() {
            let face = match bytes[i] {
                b' ' => {
                    i += 1;
                    continue;
                }
                b'U' => Face::U,
                b'R' => Face::R,
                b'F' => Face::F,
                b'D' => Face::D,
                b'L' => Face::L,
                b'B' => Face::B,
                _ => panic!("unknown face in template"),
            };
            i += 1;
            let turn = if i < bytes.len() && bytes[i] == b'2' {
                i += 1;
                Turn::Half
            } else if i < bytes.len() && bytes[i] == b'\'' {
                i += 1;
                Turn::CounterClockwise
            } else {
                Turn::Clockwise
            };
            moves[len] = Move::new(face, turn);
            len += 1;
        }
        Template { moves, len }
    }

    pub(crate) fn moves(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub(crate) fn to_sequence(self) -> MoveSequence {
        MoveSequence(self.moves().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> MoveSequence {
        s.parse().unwrap()
    }

    #[test]
    fn test_move_order_and_index() {
        for (i, move_) in Move::ALL.iter().enumerate() {
            assert_eq!(move_.index(), i);
        }
        assert_eq!(Move::ALL[0].to_string(), "U");
        assert_eq!(Move::ALL[5].to_string(), "R'");
        assert_eq!(Move::ALL[16].to_string(), "B2");
    }

    #[test]
    fn test_parse_and_display_agree() {
        let text = "R U2 R' U' F2 D L' B";
        assert_eq!(seq(text).to_string(), text);
        assert_eq!(seq("  R   U’ ").to_string(), "R U'");
        assert!(seq("").is_empty());
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(
            "Rw".parse::<Move>(),
            Err(ParseMoveError::UnsupportedMove("Rw".to_owned()))
        );
        assert_eq!(
            "M2".parse::<Move>(),
            Err(ParseMoveError::UnsupportedMove("M2".to_owned()))
        );
        assert_eq!(
            "Q".parse::<Move>(),
            Err(ParseMoveError::UnknownMove("Q".to_owned()))
        );
        assert!("R U X".parse::<MoveSequence>().is_err());
    }

    #[test]
    fn test_simplify_same_face() {
        assert_eq!(seq("R R").simplify(), seq("R2"));
        assert_eq!(seq("R R2").simplify(), seq("R'"));
        assert_eq!(seq("R R'").simplify(), seq(""));
        assert_eq!(seq("R U U' R'").simplify(), seq(""));
        assert_eq!(seq("R2 R2 F").simplify(), seq("F"));
    }

    #[test]
    fn test_simplify_commuting_faces() {
        assert_eq!(seq("R L R").simplify(), seq("R2 L"));
        assert_eq!(seq("U D U'").simplify(), seq("D"));
        assert_eq!(seq("R U R").simplify(), seq("R U R"));
    }

    #[test]
    fn test_inverse() {
        assert_eq!(seq("R U2 F'").inverse(), seq("F U2 R'"));
        assert_eq!(seq("R U2 F'").compose(&seq("R U2 F'").inverse()).simplify(), seq(""));
    }

    #[test]
    fn test_stats() {
        let stats = seq("R U2 R' D2 F").stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.half_turns, 2);
        assert_eq!(stats.quarter_turns, 3);
        assert_eq!(stats.face_counts[Face::R.index()], 2);
        assert_eq!(stats.face_counts[Face::L.index()], 0);
    }

    #[test]
    fn test_find_and_replace() {
        let moves = seq("R U R' U' R U R' U'");
        assert_eq!(moves.find_all(&seq("R U")), vec![0, 4]);
        assert_eq!(moves.find_all(&seq("U' R")), vec![3]);
        assert!(moves.find_all(&seq("")).is_empty());
        assert!(seq("R").find_all(&seq("R U")).is_empty());
        assert_eq!(seq("R R R").find_all(&seq("R R")), vec![0, 1]);

        assert_eq!(moves.replace_all(&seq("R U R' U'"), &seq("F")), seq("F F"));
        assert_eq!(seq("R R R").replace_all(&seq("R R"), &seq("R2")), seq("R2 R"));
        assert_eq!(moves.replace_all(&seq(""), &seq("F")), moves);
    }

    #[test]
    fn test_templates() {
        let template = Template::new("R U2 R' U'");
        assert_eq!(template.to_sequence(), seq("R U2 R' U'"));
        assert!(Template::new("").moves().is_empty());
    }

    #[test]
    fn test_format_wrapped() {
        let moves = seq("R U R' U' R U R' U'");
        assert_eq!(moves.format_wrapped(80, 3), "R U R'\nU' R U\nR' U'");
        assert_eq!(moves.format_wrapped(6, 15), "R U R'\nU' R U\nR' U'");
        assert_eq!(seq("").format_wrapped(80, 15), "");
    }

    #[test]
    fn test_rotation_table() {
        let r = Move::new(Face::R, Turn::Clockwise).rotation();
        assert_eq!(r, Rotation { axis: Axis::X, layer: 1, degrees: -90 });
        let l = Move::new(Face::L, Turn::Clockwise).rotation();
        assert_eq!(l, Rotation { axis: Axis::X, layer: -1, degrees: 90 });
        assert_eq!(Move::new(Face::U, Turn::Half).rotation().degrees, 180);
    }

    #[test]
    fn test_g1_moves() {
        let g1 = Move::ALL.iter().filter(|move_| move_.is_g1()).join(" ");
        assert_eq!(g1, "U U2 U' R2 F2 D D2 D' L2 B2");
    }
}
