//! CLI argument parsing for solo.
//!
//! Uses clap derive macros. The lockfile flag is only recognized ahead of
//! the first positional: once COMMAND has been seen, everything after it
//! (including a literal `-l` or `--lockfile`) belongs to the wrapped
//! command, which may legitimately take such an argument itself.

use crate::exit_codes;
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

/// solo implements a shell singleton.
///
/// By wrapping a command invocation with solo, the program is guaranteed to
/// be the only one among others wrapped with solo that is running at a given
/// time. Useful for autostarted programs in desktop environments, where a
/// logout/login cycle would otherwise start a second instance.
#[derive(Parser, Debug)]
#[command(name = "solo")]
#[command(author, version, about)]
pub struct Cli {
    /// Use LOCKFILE verbatim instead of deriving a path from COMMAND.
    #[arg(short = 'l', long = "lockfile", value_name = "LOCKFILE")]
    pub lockfile: Option<PathBuf>,

    /// Command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Parse command line arguments.
    ///
    /// Help and version requests print to stdout and exit 0. Any other
    /// parse failure prints clap's diagnostic and exits with the usage
    /// error code (1), not clap's default of 2.
    pub fn parse_args() -> Self {
        match Self::try_parse_from(std::env::args_os()) {
            Ok(cli) => cli,
            Err(err) => {
                let _ = err.print();
                let code = match err.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
                    _ => exit_codes::USAGE_ERROR,
                };
                std::process::exit(code);
            }
        }
    }
}
