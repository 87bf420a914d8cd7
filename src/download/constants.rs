//! Constants for the download module (timeouts, file naming).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Suffix appended to the destination path while a transfer is in progress.
pub const TEMP_SUFFIX: &str = ".tmp";
