//! Text document model
//!
//! A document is a sequence of body blocks: paragraphs and tables whose
//! cells hold further paragraphs. Paragraphs are made of style runs, the
//! smallest unit that carries its own font, size and emphasis.
//!
//! Documents are stored as JSON. Saving goes through a temporary file in
//! the destination directory that is renamed into place, so an output file
//! either holds a complete document or does not exist.

pub mod style;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

pub use style::{apply_best_effort, StyleError};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid document: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<Run>,
    /// Line spacing as a multiple of single spacing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
}

/// A stretch of text sharing one style.
///
/// Emphasis flags are tri-state: `None` inherits from the paragraph style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_pt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    /// Raised (positive) or lowered (negative) baseline, in half-points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_position: Option<i32>,
}

impl Document {
    /// Read a document from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Document =
            serde_json::from_str(&contents).map_err(|source| DocumentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded document {:?} ({} blocks)", path, document.body.len());
        Ok(document)
    }

    /// Write the document to `path`, replacing any existing file atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let write_error = |source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staging = NamedTempFile::new_in(directory).map_err(write_error)?;
        staging.write_all(contents.as_bytes()).map_err(write_error)?;
        staging.flush().map_err(write_error)?;
        staging.persist(path).map_err(|e| write_error(e.error))?;

        debug!("Saved document to {:?}", path);
        Ok(())
    }

    /// Every paragraph in processing order: body paragraphs first, then
    /// the paragraphs of each table cell by table, row and cell
    pub fn paragraphs_mut(&mut self) -> Vec<&mut Paragraph> {
        let mut body = Vec::new();
        let mut cells = Vec::new();
        for block in &mut self.body {
            match block {
                Block::Paragraph(paragraph) => body.push(paragraph),
                Block::Table(table) => cells.extend(
                    table
                        .rows
                        .iter_mut()
                        .flat_map(|row| row.cells.iter_mut())
                        .flat_map(|cell| cell.paragraphs.iter_mut()),
                ),
            }
        }
        body.extend(cells);
        body
    }

    /// Read-only counterpart of [`Document::paragraphs_mut`]
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut body = Vec::new();
        let mut cells = Vec::new();
        for block in &self.body {
            match block {
                Block::Paragraph(paragraph) => body.push(paragraph),
                Block::Table(table) => cells.extend(
                    table
                        .rows
                        .iter()
                        .flat_map(|row| row.cells.iter())
                        .flat_map(|cell| cell.paragraphs.iter()),
                ),
            }
        }
        body.extend(cells);
        body
    }
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            line_spacing: None,
        }
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// True when the paragraph has no visible characters
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(Run::is_blank)
    }

    pub fn set_line_spacing(&mut self, multiplier: f64) {
        self.line_spacing = Some(multiplier);
    }

    /// Insert `prefix` at the start of the paragraph, in the first run
    /// when there is one
    pub fn prepend_text(&mut self, prefix: &str) {
        match self.runs.first_mut() {
            Some(first) => first.text.insert_str(0, prefix),
            None => self.runs.push(Run::new(prefix)),
        }
    }

    /// Replace the run at `index` by `replacement`, keeping the order of the
    /// surrounding runs. Returns the index just past the inserted runs.
    pub fn splice_run(&mut self, index: usize, replacement: Vec<Run>) -> usize {
        let inserted = replacement.len();
        self.runs.splice(index..=index, replacement);
        index + inserted
    }
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A run holding `text` with this run's bold/italic/underline flags
    pub fn with_emphasis_of(source: &Run, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: source.bold,
            italic: source.italic,
            underline: source.underline,
            ..Self::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
