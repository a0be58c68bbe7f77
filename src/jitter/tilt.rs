//! Handwriting tilt simulation
//!
//! Real handwriting drifts: the baseline creeps up or down for a stretch of
//! characters, then the writer notices and corrects. The simulator models
//! this as a sequence of trends. Each trend eases the tilt toward a target
//! angle; when a new trend would push the opposite way, a short correction
//! trend back to zero is inserted first.

use rand::Rng;

/// Largest magnitude of a trend target, in degrees (before strength scaling)
pub const MAX_TREND_TILT: f64 = 1.5;
const MIN_TREND_TILT: f64 = 0.8;
/// Characters over which the ease toward a target completes
const EASE_SPAN: f64 = 15.0;
const MICRO_TREMOR: f64 = 0.2;
/// Below this magnitude the current tilt has no direction worth continuing
const NEUTRAL_TILT: f64 = 0.5;
const DIRECTION_CHANGE_PROBABILITY: f64 = 0.7;

/// Snapshot of the simulator between two characters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltState {
    pub current_tilt: f64,
    pub target_tilt: f64,
    /// -1, 0 (no trend yet) or +1
    pub trend_direction: i8,
    pub trend_remaining: i32,
    pub chars_since_trend_start: u32,
}

/// Per-paragraph generator of tilt angles, one per character
#[derive(Debug, Clone, Default)]
pub struct HandwritingTiltSimulator {
    state: TiltState,
    trends_started: usize,
}

impl HandwritingTiltSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TiltState {
        self.state
    }

    /// Number of trends (including corrections) begun so far
    pub fn trends_started(&self) -> usize {
        self.trends_started
    }

    /// Raw tilt in degrees for the next character.
    ///
    /// The caller scales the result by the handwriting strength.
    pub fn next_tilt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let restart_after = rng.gen_range(10..=20);
        if self.state.chars_since_trend_start >= restart_after || self.state.trend_remaining <= 0 {
            self.start_new_trend(rng);
        }

        let progress = (1.0 - f64::from(self.state.trend_remaining) / EASE_SPAN).clamp(0.0, 1.0);
        let eased = ease_in_out(progress, self.state.current_tilt, self.state.target_tilt);

        // The eased value is the baseline for the next character; the
        // tremor below is not carried forward.
        self.state.current_tilt = eased;
        self.state.chars_since_trend_start += 1;
        self.state.trend_remaining -= 1;

        eased + rng.gen_range(-MICRO_TREMOR..=MICRO_TREMOR)
    }

    fn start_new_trend<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let current = self.state.current_tilt;
        self.state.chars_since_trend_start = 0;
        self.state.trend_remaining = rng.gen_range(8..=25);

        let change_direction = rng.gen_bool(DIRECTION_CHANGE_PROBABILITY);
        self.state.trend_direction = if change_direction || current.abs() < NEUTRAL_TILT {
            if rng.gen_bool(0.5) {
                1
            } else {
                -1
            }
        } else if current > 0.0 {
            1
        } else {
            -1
        };

        self.state.target_tilt =
            f64::from(self.state.trend_direction) * rng.gen_range(MIN_TREND_TILT..=MAX_TREND_TILT);

        // Reversal: return to the baseline quickly before leaning the other way
        if current * self.state.target_tilt < 0.0 {
            self.state.trend_remaining = rng.gen_range(3..=8);
            self.state.target_tilt = 0.0;
        }

        self.trends_started += 1;
    }
}

/// Cubic ease-in-out from `start` to `end` at progress `t` in [0, 1]
fn ease_in_out(t: f64, start: f64, end: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t2 = t * t;
    let t3 = t2 * t;
    start + (end - start) * (-2.0 * t3 + 3.0 * t2)
}
