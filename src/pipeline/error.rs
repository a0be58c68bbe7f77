//! Errors that stop a conversion

use crate::document::DocumentError;
use thiserror::Error;

/// Fewest typefaces a conversion will run with
pub const MIN_TYPEFACES: usize = 2;

/// Failures that stop a whole conversion.
///
/// Per-character and per-font problems never surface here; they are
/// counted in the report or logged.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(
        "insufficient typefaces: at least {min} are needed for character-level randomization, {loaded} loaded",
        min = MIN_TYPEFACES
    )]
    InsufficientTypefaces { loaded: usize },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("a conversion is already running")]
    Busy,
}
