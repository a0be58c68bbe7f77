//! The 1–5 intensity dial shared by every randomization effect

use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing intensity of a randomization effect.
///
/// Always within `Strength::MIN..=Strength::MAX`. Each generator maps it
/// linearly onto its own numeric parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Strength(u8);

impl Strength {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a strength, rejecting values outside 1..=5
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Human label for the dial position
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "subtle",
            2 => "weak",
            3 => "medium",
            4 => "strong",
            _ => "intense",
        }
    }

    /// Label used for the handwriting dial, whose top setting reads as
    /// "realistic" rather than "intense"
    pub fn handwriting_label(self) -> &'static str {
        if self.0 == Self::MAX {
            "realistic"
        } else {
            self.label()
        }
    }

    /// Tilt multiplier: `0.5 + s * 0.3` (0.8x at 1, 2.0x at 5)
    pub fn tilt_multiplier(self) -> f64 {
        0.5 + self.as_f64() * 0.3
    }

    /// Half-width of the character size window in points: `0.3 + s * 0.3`
    pub fn size_range_pt(self) -> f64 {
        0.3 + self.as_f64() * 0.3
    }

    /// Line spacing multiplier bounds: `(0.9 - s * 0.1, 1.1 + s * 0.1)`
    pub fn line_spacing_bounds(self) -> (f64, f64) {
        (0.9 - self.as_f64() * 0.1, 1.1 + self.as_f64() * 0.1)
    }

    /// Largest number of leading spaces: `min(5, 1 + s)`
    pub fn max_indent_spaces(self) -> usize {
        usize::from(self.0 + 1).min(5)
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Strength {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "strength must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<Strength> for u8 {
    fn from(strength: Strength) -> Self {
        strength.0
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}
