//! Core application functionality
//!
//! This module contains the application shell around the pipeline:
//! - CLI parsing and validation
//! - User configuration file
//! - Background conversion jobs
//! - Process-level error handling

pub mod cli;
pub mod communication;
pub mod config_file;
pub mod platform;
pub mod runner;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config_file::ConfigFile;
pub use runner::run_app;
