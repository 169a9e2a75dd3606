//! Exit code constants for the solo CLI.
//!
//! - 0: success (the child was waited on; its own exit status is
//!   deliberately not propagated)
//! - 1: usage error, unresolved lock directory, or signal-triggered exit
//! - otherwise: the raw OS errno of the failing lock or process operation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, no usable lock directory, invalid command name.
pub const USAGE_ERROR: i32 = 1;

/// Status used when a termination signal routes through the release path.
pub const SIGNALED: i32 = 1;
