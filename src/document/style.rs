//! Cosmetic run styling that is allowed to fail
//!
//! Failures here never interrupt a conversion: the character keeps its
//! text and typeface, it just loses the cosmetic effect.

use crate::document::Run;
use thiserror::Error;
use tracing::trace;

/// Largest vertical displacement a run may carry, in half-points (1584pt)
pub const MAX_VERTICAL_POSITION_HALF_POINTS: i64 = 3168;

#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("vertical offset {0} is not a finite number")]
    NonFinite(f64),
    #[error(
        "vertical offset of {0} half-points exceeds the ±{max} limit",
        max = MAX_VERTICAL_POSITION_HALF_POINTS
    )]
    OutOfRange(i64),
}

/// Convert points to half-points, truncating toward zero
pub fn points_to_half_points(points: f64) -> Result<i32, StyleError> {
    if !points.is_finite() {
        return Err(StyleError::NonFinite(points));
    }
    let half_points = (points * 2.0).trunc() as i64;
    if half_points.abs() > MAX_VERTICAL_POSITION_HALF_POINTS {
        return Err(StyleError::OutOfRange(half_points));
    }
    // In range of i32 after the check above
    Ok(half_points as i32)
}

impl Run {
    /// Raise (positive) or lower (negative) the run by `points`.
    ///
    /// Offsets that truncate to zero half-points leave the run untouched.
    pub fn try_set_vertical_offset(&mut self, points: f64) -> Result<(), StyleError> {
        let half_points = points_to_half_points(points)?;
        if half_points != 0 {
            self.vertical_position = Some(half_points);
        }
        Ok(())
    }
}

/// Run a styling operation and discard its failure
pub fn apply_best_effort<F>(run: &mut Run, operation: F)
where
    F: FnOnce(&mut Run) -> Result<(), StyleError>,
{
    if let Err(e) = operation(run) {
        trace!("Ignoring styling failure on {:?}: {}", run.text, e);
    }
}
