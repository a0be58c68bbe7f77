//! Process-level entry helpers and error handling.

use crate::core::cli::CliArgs;

/// Print an application error with its cause chain and exit with code 1.
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("Error running scrawl:");
    eprintln!("{error}");
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    eprintln!();
    eprintln!("Try running with --help for usage information.");
    std::process::exit(1);
}

/// Parse the process command line.
pub fn get_cli_args() -> CliArgs {
    use clap::Parser;
    CliArgs::parse()
}
