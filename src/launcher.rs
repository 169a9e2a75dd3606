//! Spawning and waiting on the wrapped command.
//!
//! The spawn and wait halves are separate functions: the child-side close of
//! the lock descriptor belongs to spawning only and has nothing to do with
//! the parent's release logic.

use crate::error::{Result, SoloError};
use std::ffi::OsString;
use std::os::unix::io::RawFd;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus};

/// Spawn the wrapped command, inheriting standard I/O.
///
/// `lock_fd` is the raw descriptor of the held lock file. It is closed in
/// the child between fork and image replacement. That close is resource
/// hygiene in the child's address space only: the advisory lock belongs to
/// the parent process and is unaffected.
///
/// Both a failed fork and a failed image replacement surface here as a
/// [`SoloError::Spawn`] carrying the OS error.
pub fn spawn(argv: &[OsString], lock_fd: RawFd) -> Result<Child> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| SoloError::Usage("missing COMMAND".to_string()))?;

    let mut command = Command::new(program);
    command.args(args);

    // SAFETY: the hook runs between fork and exec; close(2) is
    // async-signal-safe and the child uses the descriptor for nothing else.
    unsafe {
        command.pre_exec(move || {
            libc::close(lock_fd);
            Ok(())
        });
    }

    command.spawn().map_err(|source| SoloError::Spawn { source })
}

/// Block until the child terminates.
///
/// The child's exit status is returned for observation, but the wrapper
/// deliberately does not translate it into its own exit code. Only a
/// failure of the wait operation itself is an error.
pub fn wait(child: &mut Child) -> Result<ExitStatus> {
    child.wait().map_err(|source| SoloError::Wait { source })
}
