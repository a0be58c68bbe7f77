//! Scrawl
pub mod core;
pub mod document;
pub mod fonts;
pub mod jitter;
pub mod logging;
pub mod pipeline;
