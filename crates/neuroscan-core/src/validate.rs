//! Pre-upload validation gate.
//!
//! Rejects non-image and oversized files before any network activity. Pure
//! and synchronous; no storage access.

use crate::defaults::MAX_SCAN_SIZE_BYTES;
use crate::error::ValidationError;
use crate::models::ScanSubmission;

/// Validate a candidate scan upload.
///
/// The MIME type must begin with `image/` and the payload must not exceed
/// [`MAX_SCAN_SIZE_BYTES`]. A payload exactly at the limit is accepted.
pub fn validate_scan(mime_type: &str, size_bytes: u64) -> Result<(), ValidationError> {
    if !mime_type.starts_with("image/") {
        return Err(ValidationError::InvalidType(mime_type.to_string()));
    }

    if size_bytes > MAX_SCAN_SIZE_BYTES {
        return Err(ValidationError::TooLarge {
            size_bytes,
            limit_bytes: MAX_SCAN_SIZE_BYTES,
        });
    }

    Ok(())
}

/// Admit exactly one file from a multi-file drop.
///
/// Extra files are discarded silently; dropping several files is not an
/// error, only the first is considered.
pub fn first_admitted(files: Vec<ScanSubmission>) -> Option<ScanSubmission> {
    files.into_iter().next()
}
