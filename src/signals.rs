//! Signal routing for asynchronous termination.
//!
//! SIGHUP, SIGINT and SIGTERM are routed into the same release path used by
//! synchronous error handling, so the unlink-before-close ordering holds no
//! matter why the process is ending. The handler performs only
//! async-signal-safe work: the release routine's atomics plus unlink(2),
//! close(2) and _exit(2).

use crate::error::{Result, SoloError};
use crate::exit_codes;
use crate::lock;
use std::io;
use std::mem;

/// Signals that trigger release-and-exit.
const TERMINATION_SIGNALS: [libc::c_int; 3] = [libc::SIGHUP, libc::SIGINT, libc::SIGTERM];

extern "C" fn handle_termination(_signal: libc::c_int) {
    lock::release();
    // SAFETY: _exit(2) is async-signal-safe.
    unsafe { libc::_exit(exit_codes::SIGNALED) };
}

/// Install handlers for the termination signals.
///
/// Called before the lock file is created, so anything failing after the
/// file exists gets cleaned up. A failing sigaction carries its OS error;
/// per the error policy that errno becomes the exit code.
pub fn install() -> Result<()> {
    for &signal in &TERMINATION_SIGNALS {
        // SAFETY: a zeroed sigaction with an empty mask and a handler
        // restricted to async-signal-safe operations.
        let result = unsafe {
            let mut action: libc::sigaction = mem::zeroed();
            action.sa_sigaction = handle_termination as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(signal, &action, std::ptr::null_mut())
        };

        if result == -1 {
            return Err(SoloError::SignalInstall {
                source: io::Error::last_os_error(),
            });
        }
    }

    Ok(())
}
