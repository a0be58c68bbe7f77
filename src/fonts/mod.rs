//! Typeface loading and coverage queries

pub mod coverage;
pub mod oracle;

pub use coverage::{GlyphCoverageIndex, TypefaceRecord};
pub use oracle::{CmapOracle, CoverageError, GlyphCoverageOracle};
