//! Make typed documents look handwritten.
//!
//! Every character gets its own typeface, size and baseline offset.

use scrawl::{core, logging};

fn main() {
    let cli_args = core::platform::get_cli_args();
    let log_guard = logging::init_logging();
    match core::run_app(cli_args) {
        Ok(()) => {}
        Err(error) => {
            // Flush the log file before the process exits
            drop(log_guard);
            core::platform::handle_error(error)
        }
    }
}
