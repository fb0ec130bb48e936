//! Stable exit codes for `jade-assist` commands.

/// Command succeeded and every check passed.
pub const OK: i32 = 0;
/// Command failed: settings could not be resolved, a file could not be read, or
/// arguments were invalid.
pub const INVALID: i32 = 1;
/// A check ran to completion and reported failures.
pub const CHECK_FAILED: i32 = 2;
