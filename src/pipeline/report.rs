//! Completion report of a conversion

use crate::pipeline::RandomizationSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How many typeface names are listed in the summary before eliding
const LISTED_TYPEFACES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub total_chars: usize,
    pub chars_with_typeface: usize,
    pub chars_without_typeface: usize,
    pub typefaces_used: BTreeSet<String>,
    pub handwriting_trends: usize,
    pub paragraphs_with_random_spacing: usize,
    pub chars_with_random_size: usize,
    pub paragraphs_with_random_indent: usize,
    pub settings: RandomizationSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ConversionReport {
    pub fn new(settings: RandomizationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn distinct_typefaces(&self) -> usize {
        self.typefaces_used.len()
    }

    pub(crate) fn record_typeface(&mut self, name: &str) {
        self.chars_with_typeface += 1;
        if !self.typefaces_used.contains(name) {
            self.typefaces_used.insert(name.to_string());
        }
    }

    /// Human-readable summary, one line per fact
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.output_path {
            lines.push(format!("Output file: {}", path.display()));
        }
        if let Some(finished_at) = &self.finished_at {
            lines.push(format!("Finished at: {}", finished_at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        lines.push(format!("Characters processed: {}", self.total_chars));
        lines.push(format!("Characters with a typeface: {}", self.chars_with_typeface));
        lines.push(format!("Characters without a typeface: {}", self.chars_without_typeface));
        lines.push(format!("Distinct typefaces used: {}", self.distinct_typefaces()));

        let settings = &self.settings;
        if settings.handwriting_enabled {
            lines.push(format!(
                "Handwriting tilt: {} trends (strength {})",
                self.handwriting_trends,
                settings.handwriting_strength.handwriting_label()
            ));
        }
        if settings.line_spacing_enabled {
            lines.push(format!(
                "Random line spacing: {} paragraphs (strength {})",
                self.paragraphs_with_random_spacing, settings.line_spacing_strength
            ));
        }
        if settings.char_size_enabled {
            lines.push(format!(
                "Random character size: {} characters (strength {})",
                self.chars_with_random_size, settings.char_size_strength
            ));
        }
        if settings.indent_enabled {
            lines.push(format!(
                "Random indentation: {} paragraphs (strength {})",
                self.paragraphs_with_random_indent, settings.indent_strength
            ));
        }

        if !self.typefaces_used.is_empty() {
            let listed: Vec<&str> = self
                .typefaces_used
                .iter()
                .take(LISTED_TYPEFACES)
                .map(String::as_str)
                .collect();
            let more = if self.typefaces_used.len() > LISTED_TYPEFACES {
                "..."
            } else {
                ""
            };
            lines.push(format!("Typefaces: {}{}", listed.join(", "), more));
        }
        lines
    }

    /// Write the report as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
