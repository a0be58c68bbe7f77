//! Glyph coverage extraction from font files

use skrifa::{FontRef, MetadataProvider};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a single font file could not contribute coverage
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("{} does not map any characters", path.display())]
    Empty { path: PathBuf },
}

/// Answers which Unicode code points a font file can render
pub trait GlyphCoverageOracle {
    fn glyph_coverage(&self, path: &Path) -> Result<BTreeSet<u32>, CoverageError>;
}

/// Reads coverage from the font's `cmap` table
#[derive(Debug, Clone, Copy, Default)]
pub struct CmapOracle;

impl GlyphCoverageOracle for CmapOracle {
    fn glyph_coverage(&self, path: &Path) -> Result<BTreeSet<u32>, CoverageError> {
        let data = fs::read(path).map_err(|source| CoverageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let coverage = coverage_from_bytes(&data).map_err(|message| CoverageError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        if coverage.is_empty() {
            return Err(CoverageError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(coverage)
    }
}

/// Every code point mapped by the font's character map
pub fn coverage_from_bytes(data: &[u8]) -> Result<BTreeSet<u32>, String> {
    let font = FontRef::new(data).map_err(|e| format!("not a usable font: {e}"))?;
    Ok(font
        .charmap()
        .mappings()
        .map(|(codepoint, _glyph)| codepoint)
        .collect())
}
