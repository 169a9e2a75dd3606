//! Lock acquisition and process-wide release state.
//!
//! `acquire` creates the lock file and takes an exclusive, non-blocking
//! advisory lock on it. The release state (identity path, raw fd, one-shot
//! flag) lives in process-wide atomics so the signal handler and the main
//! flow share a single idempotent release routine.
//!
//! # Release ordering
//!
//! Release must unlink the path before closing the handle. Closing first
//! opens a window where a second process acquires a lock on the path, after
//! which our unlink would remove a lock file that now legitimately belongs
//! to that process.

use crate::error::{Result, SoloError};
use fs2::FileExt;
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicPtr, Ordering};

/// Owner-write only, the traditional lock file mode.
const LOCK_FILE_MODE: u32 = 0o200;

/// Identity path as a C string, set once before any fallible step that must
/// clean up. Leaked into the atomic so the signal handler can unlink it.
static LOCK_PATH: AtomicPtr<libc::c_char> = AtomicPtr::new(std::ptr::null_mut());

/// Raw descriptor of the held lock file, or -1 when none is open.
static LOCK_FD: AtomicI32 = AtomicI32::new(-1);

/// One-shot guard: prevents a double release when a signal lands while the
/// main flow is already releasing (or vice versa).
static RELEASED: AtomicBool = AtomicBool::new(false);

/// An acquired lock file.
///
/// The advisory lock is held for the life of the process. Cleanup goes
/// through [`release`] (after [`register_handle`]), not through drop: the
/// unlink-before-close ordering cannot be expressed as a plain Drop impl
/// shared with the signal handler.
#[derive(Debug)]
pub struct LockFile {
    file: File,
}

impl LockFile {
    /// Raw descriptor of the lock file, for the child-side close hook.
    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

/// Create (or truncate) the lock file and take an exclusive, non-blocking
/// advisory lock on it.
///
/// Contention is reported as [`SoloError::LockContention`], distinct from
/// any other locking failure, so the caller can show the "already running"
/// diagnostic instead of a generic OS error.
pub fn acquire(path: &Path) -> Result<LockFile> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(LOCK_FILE_MODE)
        .open(path)
        .map_err(|source| SoloError::LockCreation { source })?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(LockFile { file }),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            Err(SoloError::LockContention { source: e })
        }
        Err(source) => Err(SoloError::LockAcquisition { source }),
    }
}

/// Record the identity path so release (from either caller) can unlink it.
pub fn register_path(path: &Path) -> Result<()> {
    let cstr = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| SoloError::Usage("lock path contains a NUL byte".to_string()))?;

    let prev = LOCK_PATH.swap(cstr.into_raw(), Ordering::SeqCst);
    if !prev.is_null() {
        // Only tests register more than once; reclaim the old string.
        // SAFETY: `prev` came from CString::into_raw above.
        drop(unsafe { CString::from_raw(prev) });
    }
    Ok(())
}

/// Record the held lock handle so release can close it.
///
/// Takes ownership of the descriptor; from here on the file is closed only
/// by [`release`].
pub fn register_handle(lock: LockFile) {
    LOCK_FD.store(lock.file.into_raw_fd(), Ordering::SeqCst);
}

/// Release the lock: unlink the identity path, then close the handle.
///
/// One-shot and async-signal-safe. Callable from both the main flow and the
/// signal handler without mutual exclusion; the compare-and-set guard makes
/// the second caller a no-op. Both steps are best-effort: failures are
/// ignored and never retried, and never change the already-decided exit
/// status.
pub fn release() {
    if RELEASED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    // Unlink strictly before close (see module docs).
    let path = LOCK_PATH.load(Ordering::SeqCst);
    if !path.is_null() {
        // SAFETY: the pointer came from CString::into_raw and is never
        // freed while published; unlink(2) is async-signal-safe.
        unsafe { libc::unlink(path) };
        #[cfg(test)]
        release_trace::record_unlink();
    }

    let fd = LOCK_FD.swap(-1, Ordering::SeqCst);
    if fd >= 0 {
        // SAFETY: the descriptor was taken with into_raw_fd and is closed
        // exactly once; close(2) is async-signal-safe.
        unsafe { libc::close(fd) };
        #[cfg(test)]
        release_trace::record_close();
    }
}


#[cfg(test)]
pub(crate) fn reset_for_tests() {
    RELEASED.store(false, Ordering::SeqCst);
    LOCK_FD.store(-1, Ordering::SeqCst);
    let prev = LOCK_PATH.swap(std::ptr::null_mut(), Ordering::SeqCst);
    if !prev.is_null() {
        drop(unsafe { CString::from_raw(prev) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn acquire_creates_the_lock_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");

        let lock = acquire(&path).unwrap();
        assert!(path.exists());
        assert!(lock.as_raw_fd() >= 0);
    }

    #[test]
    fn second_acquire_reports_contention() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");

        let _held = acquire(&path).unwrap();

        // flock contention applies across open file descriptions, so a
        // second open in the same process contends just like a second
        // process would.
        let err = acquire(&path).unwrap_err();
        assert!(matches!(err, SoloError::LockContention { .. }));
        assert_eq!(err.to_string(), "another instance is already running");
        assert!(err.exit_code() > 0);
    }

    #[test]
    fn lock_is_reacquirable_after_drop() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");

        let held = acquire(&path).unwrap();
        drop(held);

        let reacquired = acquire(&path);
        assert!(reacquired.is_ok());
    }

    #[test]
    fn create_failure_is_lock_creation_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no-such-dir").join("lock");

        let err = acquire(&path).unwrap_err();
        assert!(matches!(err, SoloError::LockCreation { .. }));
        assert_eq!(err.exit_code(), libc::ENOENT);
    }

    #[test]
    #[serial]
    fn release_unlinks_the_registered_path() {
        reset_for_tests();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");

        let lock = acquire(&path).unwrap();
        register_path(&path).unwrap();
        register_handle(lock);
        assert!(path.exists());

        release();
        assert!(!path.exists());
    }

    #[test]
    #[serial]
    fn release_unlinks_strictly_before_closing() {
        reset_for_tests();
        release_trace::reset();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");

        let lock = acquire(&path).unwrap();
        register_path(&path).unwrap();
        register_handle(lock);

        release();

        let (unlink, close) = release_trace::stamps();
        assert!(unlink > 0, "release never unlinked the path");
        assert!(close > 0, "release never closed the handle");
        assert!(
            unlink < close,
            "unlink (stamp {}) must precede close (stamp {})",
            unlink,
            close
        );
    }

    #[test]
    #[serial]
    fn release_is_one_shot() {
        reset_for_tests();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");

        let lock = acquire(&path).unwrap();
        register_path(&path).unwrap();
        register_handle(lock);
        release();
        assert!(!path.exists());

        // Recreate the file; a second release must not touch it.
        std::fs::write(&path, b"").unwrap();
        release();
        assert!(path.exists());
    }

    #[test]
    #[serial]
    fn release_without_registration_is_a_no_op() {
        reset_for_tests();
        release();
    }

    #[test]
    #[serial]
    fn release_with_path_but_no_handle_still_unlinks() {
        reset_for_tests();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solo-lock-test");
        std::fs::write(&path, b"").unwrap();

        register_path(&path).unwrap();
        release();
        assert!(!path.exists());
    }

    #[test]
    #[serial]
    fn nul_byte_in_path_is_rejected() {
        reset_for_tests();
        use std::ffi::OsStr;
        let weird = Path::new(OsStr::from_bytes(b"/tmp/bad\0path"));
        let err = register_path(weird).unwrap_err();
        assert!(matches!(err, SoloError::Usage(_)));
    }
}
