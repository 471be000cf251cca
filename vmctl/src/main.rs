// External crates
use clap::Parser;
use tracing::debug;

// Internal imports
use vmctl_core::{vmctl_error, vmctl_error_hint, VmctlError};

// Local modules
mod cli;
mod commands;

use cli::Args;
use commands::execute_command;

fn main() {
    // Held until exit so the file appender flushes.
    let log_guard = vmctl_logging::init_subscriber();

    let args = Args::parse();
    debug!(command = ?args.command, debug = args.debug, "Starting vmctl");

    let code = match execute_command(args) {
        Ok(code) => code,
        Err(e) => {
            vmctl_error!("{:#}", e);
            if let Some(hint) = e.downcast_ref::<VmctlError>().and_then(VmctlError::hint) {
                vmctl_error_hint!("{}", hint);
            }
            1
        }
    };

    drop(log_guard);
    std::process::exit(code);
}
