//! Centralized default constants for the NeuroScan client.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// SERVICE
// =============================================================================

/// Default origin of the inference service. Also used to absolutize
/// root-relative asset paths returned in results.
pub const SERVICE_URL: &str = "http://localhost:8000";

/// Timeout for scan uploads (seconds). Sized for large multipart bodies.
pub const UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Timeout for unary requests (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum accepted scan size in bytes (10 MiB).
pub const MAX_SCAN_SIZE_BYTES: u64 = 10 * 1024 * 1024;

// =============================================================================
// HISTORY
// =============================================================================

/// File name of the durable scan history list.
pub const HISTORY_FILE: &str = "scan_history.json";

// =============================================================================
// TRANSFER
// =============================================================================

/// Chunk size for streamed uploads with progress reporting.
pub const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Override for the service origin.
pub const ENV_BASE_URL: &str = "NEUROSCAN_BASE_URL";

/// Override for the upload timeout (seconds).
pub const ENV_UPLOAD_TIMEOUT_SECS: &str = "NEUROSCAN_UPLOAD_TIMEOUT_SECS";

/// Override for the unary request timeout (seconds).
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "NEUROSCAN_REQUEST_TIMEOUT_SECS";

/// Path to a TOML config file, checked before the default location.
pub const ENV_CONFIG_PATH: &str = "NEUROSCAN_CONFIG";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_size_limit_is_ten_mib() {
        assert_eq!(MAX_SCAN_SIZE_BYTES, 10 * 1024 * 1024);
        assert_eq!(MAX_SCAN_SIZE_BYTES, 10_485_760);
    }

    #[test]
    fn test_default_url_is_localhost() {
        assert!(SERVICE_URL.starts_with("http://"));
        assert!(SERVICE_URL.contains("localhost"));
    }

    #[test]
    fn test_timeouts_are_thirty_seconds() {
        assert_eq!(UPLOAD_TIMEOUT_SECS, 30);
        assert_eq!(REQUEST_TIMEOUT_SECS, 30);
    }
}
