//! Random line spacing, drawn once per line and remembered

use crate::jitter::Strength;
use rand::Rng;
use std::collections::HashMap;

/// Assigns each line a spacing multiplier and keeps it.
///
/// Asking for the same line twice returns the same value; the cache is
/// never invalidated.
#[derive(Debug, Clone)]
pub struct LineSpacingGenerator {
    spacing_min: f64,
    spacing_max: f64,
    cache: HashMap<usize, f64>,
}

impl LineSpacingGenerator {
    pub fn new(strength: Strength) -> Self {
        let (spacing_min, spacing_max) = strength.line_spacing_bounds();
        Self {
            spacing_min,
            spacing_max,
            cache: HashMap::new(),
        }
    }

    /// Spacing multiplier for `line_index`
    pub fn spacing_for<R: Rng + ?Sized>(&mut self, rng: &mut R, line_index: usize) -> f64 {
        let (min, max) = (self.spacing_min, self.spacing_max);
        *self
            .cache
            .entry(line_index)
            .or_insert_with(|| rng.gen_range(min..=max))
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.spacing_min, self.spacing_max)
    }

    /// Number of lines that have been assigned a spacing
    pub fn assigned(&self) -> usize {
        self.cache.len()
    }
}
