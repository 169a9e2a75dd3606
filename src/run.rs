//! Orchestration of a single wrapped invocation.
//!
//! Sequence: resolve the lock identity, record it for release, install the
//! signal routing, acquire the lock, spawn the command, wait for it. Every
//! failure short-circuits back to the caller, which funnels through the
//! same idempotent release path the signal handler uses.

use crate::cli::Cli;
use crate::error::{Result, SoloError};
use crate::{identity, launcher, lock, signals};

/// Run the wrapped command under the singleton lock.
///
/// On success the child has been waited on; its own exit status is observed
/// and discarded. The caller performs the release.
pub fn run(cli: Cli) -> Result<()> {
    let program = cli
        .command
        .first()
        .ok_or_else(|| SoloError::Usage("missing COMMAND".to_string()))?;

    let identity = identity::resolve(cli.lockfile, program)?;
    lock::register_path(&identity)?;

    // Handlers go in before the lock file exists, so anything that fails
    // after this point is cleaned up even on asynchronous termination.
    signals::install()?;

    let lock_file = lock::acquire(&identity)?;
    let lock_fd = lock_file.as_raw_fd();
    lock::register_handle(lock_file);

    let mut child = launcher::spawn(&cli.command, lock_fd)?;
    launcher::wait(&mut child)?;

    Ok(())
}
