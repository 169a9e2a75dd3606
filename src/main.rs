//! solo: run a command only if it is not already running.
//!
//! This is the main entry point for the `solo` CLI. It parses arguments,
//! runs the wrapped command under the singleton lock, and funnels every
//! outcome (success, error, or a racing signal) through a single idempotent
//! release path before exiting.

mod cli;
pub mod error;
pub mod exit_codes;
pub mod identity;
pub mod launcher;
pub mod lock;
pub mod run;
pub mod signals;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let code = match run::run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            // Short diagnostic to stderr; the exit code carries the errno.
            eprintln!("solo: {}", err);
            err.exit_code()
        }
    };

    // Same release the signal handler uses; a no-op when nothing was
    // registered or a signal got here first.
    lock::release();

    ExitCode::from(code as u8)
}
