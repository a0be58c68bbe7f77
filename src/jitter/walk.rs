//! Bounded random walks for per-character size and vertical position
//!
//! Both walks draw each value from a window that is the intersection of
//! the base window (`base ± range`), the step window (`last ± max_step`)
//! and the hard bounds. Consecutive values therefore never jump by more
//! than `max_step`, and the series wanders inside the base window.

use crate::jitter::Strength;
use rand::Rng;

/// Largest change in font size between adjacent characters, in points
pub const SIZE_MAX_STEP_PT: f64 = 0.5;
/// Smallest font size a character may be given, in points
pub const SIZE_HARD_MIN_PT: f64 = 6.0;

/// Largest change in vertical offset between adjacent characters, in points
pub const POSITION_MAX_STEP_PT: f64 = 0.5;
/// Vertical offsets stay within `±POSITION_LIMIT_PT`
pub const POSITION_LIMIT_PT: f64 = 2.5;

/// Parameters of one bounded random walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedRandomWalk {
    /// Half-width of the window around the base value
    pub range: f64,
    /// Largest allowed difference between consecutive values
    pub max_step: f64,
    pub hard_min: f64,
    pub hard_max: f64,
}

impl BoundedRandomWalk {
    pub fn new(range: f64, max_step: f64, hard_min: f64, hard_max: f64) -> Self {
        debug_assert!(hard_min <= hard_max, "walk bounds are inverted");
        Self {
            range,
            max_step,
            hard_min,
            hard_max,
        }
    }

    /// The interval the next value is drawn from.
    ///
    /// Never inverted: when the base window and the step window do not
    /// overlap, the interval collapses to the point of the step window
    /// closest to `base`.
    pub fn window(&self, last: Option<f64>, base: f64) -> (f64, f64) {
        let mut lo = self.hard_min.max(base - self.range);
        let mut hi = self.hard_max.min(base + self.range);

        let (reach_lo, reach_hi) = match last {
            Some(last) => {
                let step_lo = self.hard_min.max(last - self.max_step);
                let step_hi = self.hard_max.min(last + self.max_step);
                lo = lo.max(step_lo);
                hi = hi.min(step_hi);
                (step_lo, step_hi)
            }
            None => (self.hard_min, self.hard_max),
        };

        if lo > hi {
            let point = base
                .max(reach_lo)
                .min(reach_hi)
                .max(self.hard_min)
                .min(self.hard_max);
            return (point, point);
        }
        (lo, hi)
    }

    /// Draw the value that follows `last`
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R, last: Option<f64>, base: f64) -> f64 {
        let (lo, hi) = self.window(last, base);
        if lo == hi {
            return lo;
        }
        // Guard against float rounding at the upper edge
        rng.gen_range(lo..=hi).max(lo).min(hi)
    }
}

/// Last value produced by a walk, unset at the start of a paragraph
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WalkState {
    pub last_value: Option<f64>,
}

impl WalkState {
    fn advance<R: Rng + ?Sized>(&mut self, walk: &BoundedRandomWalk, rng: &mut R, base: f64) -> f64 {
        let value = walk.next(rng, self.last_value, base);
        self.last_value = Some(value);
        value
    }
}

/// Per-paragraph font size jitter
#[derive(Debug, Clone)]
pub struct CharacterSizeJitter {
    walk: BoundedRandomWalk,
    state: WalkState,
}

impl CharacterSizeJitter {
    pub fn new(strength: Strength) -> Self {
        Self {
            walk: BoundedRandomWalk::new(
                strength.size_range_pt(),
                SIZE_MAX_STEP_PT,
                SIZE_HARD_MIN_PT,
                f64::INFINITY,
            ),
            state: WalkState::default(),
        }
    }

    /// Size in points for the next character of a run whose size is `base_size_pt`
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R, base_size_pt: f64) -> f64 {
        self.state.advance(&self.walk, rng, base_size_pt)
    }

    pub fn state(&self) -> WalkState {
        self.state
    }
}

/// Per-paragraph vertical offset jitter, centered on the baseline
#[derive(Debug, Clone)]
pub struct CharacterPositionJitter {
    walk: BoundedRandomWalk,
    state: WalkState,
}

impl Default for CharacterPositionJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterPositionJitter {
    pub fn new() -> Self {
        Self {
            walk: BoundedRandomWalk::new(
                POSITION_LIMIT_PT,
                POSITION_MAX_STEP_PT,
                -POSITION_LIMIT_PT,
                POSITION_LIMIT_PT,
            ),
            state: WalkState::default(),
        }
    }

    /// Vertical offset in points for the next character
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.state.advance(&self.walk, rng, 0.0)
    }

    pub fn state(&self) -> WalkState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_walk_stays_bounded() {
        let walk = BoundedRandomWalk::new(1.0, 0.25, -2.0, 2.0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut last = None;

        for _ in 0..2_000 {
            let value = walk.next(&mut rng, last, 0.0);
            assert!((-2.0 - EPSILON..=2.0 + EPSILON).contains(&value));
            assert!((-1.0 - EPSILON..=1.0 + EPSILON).contains(&value));
            if let Some(previous) = last {
                let delta: f64 = value - previous;
                assert!(delta.abs() <= 0.25 + EPSILON, "step {delta} too large");
            }
            last = Some(value);
        }
    }

    #[test]
    fn test_first_value_uses_base_window() {
        let walk = BoundedRandomWalk::new(1.5, 0.5, 6.0, f64::INFINITY);
        assert_eq!(walk.window(None, 12.0), (10.5, 13.5));
        // The hard minimum cuts the base window
        assert_eq!(walk.window(None, 7.0), (6.0, 8.5));
    }

    #[test]
    fn test_disjoint_windows_collapse_to_a_point() {
        let walk = BoundedRandomWalk::new(0.6, 0.5, 6.0, f64::INFINITY);

        // Previous character was 20pt, the new run is 10pt: step toward it
        let (lo, hi) = walk.window(Some(20.0), 10.0);
        assert_eq!(lo, hi);
        assert!((lo - 19.5).abs() < EPSILON);

        // Previous character was 8pt, the new run is 30pt
        let (lo, hi) = walk.window(Some(8.0), 30.0);
        assert_eq!(lo, hi);
        assert!((lo - 8.5).abs() < EPSILON);

        // A base below the hard minimum collapses onto the minimum
        let (lo, hi) = walk.window(None, 4.0);
        assert_eq!((lo, hi), (6.0, 6.0));

        let mut rng = StdRng::seed_from_u64(1);
        assert!((walk.next(&mut rng, Some(20.0), 10.0) - 19.5).abs() < EPSILON);
    }

    #[test]
    fn test_size_jitter_adjacency_at_strength_three() {
        let strength = Strength::new(3).unwrap();
        let mut jitter = CharacterSizeJitter::new(strength);
        let mut rng = StdRng::seed_from_u64(42);
        let mut previous: Option<f64> = None;

        for _ in 0..500 {
            let size = jitter.next(&mut rng, 12.0);
            assert!(size >= SIZE_HARD_MIN_PT);
            assert!((12.0 - 1.2 - EPSILON..=12.0 + 1.2 + EPSILON).contains(&size));
            if let Some(previous) = previous {
                assert!((size - previous).abs() <= SIZE_MAX_STEP_PT + EPSILON);
            }
            previous = Some(size);
        }
        assert_eq!(jitter.state().last_value, previous);
    }

    #[test]
    fn test_size_jitter_never_below_minimum_for_small_text() {
        let mut jitter = CharacterSizeJitter::new(Strength::new(5).unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(jitter.next(&mut rng, 6.5) >= SIZE_HARD_MIN_PT);
        }
    }

    #[test]
    fn test_position_jitter_adjacency() {
        let mut jitter = CharacterPositionJitter::new();
        assert_eq!(jitter.state().last_value, None);
        let mut rng = StdRng::seed_from_u64(99);
        let mut previous: Option<f64> = None;

        for _ in 0..1_000 {
            let offset = jitter.next(&mut rng);
            assert!(offset.abs() <= POSITION_LIMIT_PT + EPSILON);
            if let Some(previous) = previous {
                assert!((offset - previous).abs() <= POSITION_MAX_STEP_PT + EPSILON);
            }
            previous = Some(offset);
        }
    }
}
