//! Which randomization effects run, and how strongly

use crate::jitter::Strength;
use serde::{Deserialize, Serialize};

/// Effect configuration for one conversion.
///
/// Built once per invocation and passed by value into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizationSettings {
    pub handwriting_enabled: bool,
    pub handwriting_strength: Strength,
    pub line_spacing_enabled: bool,
    pub line_spacing_strength: Strength,
    pub char_size_enabled: bool,
    pub char_size_strength: Strength,
    pub indent_enabled: bool,
    pub indent_strength: Strength,
}

impl Default for RandomizationSettings {
    fn default() -> Self {
        Self {
            handwriting_enabled: true,
            handwriting_strength: Strength::default(),
            line_spacing_enabled: true,
            line_spacing_strength: Strength::default(),
            char_size_enabled: true,
            char_size_strength: Strength::default(),
            indent_enabled: true,
            indent_strength: Strength::default(),
        }
    }
}

impl RandomizationSettings {
    /// Font randomization only, every other effect switched off
    pub fn fonts_only() -> Self {
        Self {
            handwriting_enabled: false,
            line_spacing_enabled: false,
            char_size_enabled: false,
            indent_enabled: false,
            ..Self::default()
        }
    }

    /// One line per enabled effect, for logs and summaries
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.handwriting_enabled {
            lines.push(format!(
                "handwriting tilt: {} ({})",
                self.handwriting_strength.get(),
                self.handwriting_strength.handwriting_label()
            ));
        }
        if self.line_spacing_enabled {
            lines.push(format!("random line spacing: {}", self.line_spacing_strength));
        }
        if self.char_size_enabled {
            lines.push(format!("random character size: {}", self.char_size_strength));
        }
        if self.indent_enabled {
            lines.push(format!("random indentation: {}", self.indent_strength));
        }
        lines
    }
}
