//! Random leading-space indentation, one draw per paragraph

use crate::jitter::Strength;
use rand::Rng;

/// Every indented paragraph gets at least this many spaces
pub const MIN_INDENT_SPACES: usize = 1;

#[derive(Debug, Clone, Copy)]
pub struct IndentGenerator {
    max_spaces: usize,
}

impl IndentGenerator {
    pub fn new(strength: Strength) -> Self {
        Self {
            max_spaces: strength.max_indent_spaces(),
        }
    }

    pub fn max_spaces(&self) -> usize {
        self.max_spaces
    }

    /// Leading whitespace for the next paragraph
    pub fn next_indent<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let spaces = rng.gen_range(MIN_INDENT_SPACES..=self.max_spaces);
        " ".repeat(spaces)
    }
}
