//! Error types for the NeuroScan client.
//!
//! The taxonomy separates "the file never left the machine"
//! ([`ValidationError`]), "the server answered with an error"
//! ([`TransferError::Failed`]) and "no response arrived at all"
//! ([`TransferError::Unreachable`]) so callers can word user-facing
//! messages accordingly. All variants are `Clone` so terminal submission
//! states can carry the error that produced them.

use thiserror::Error;

/// Result type alias using the NeuroScan client's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection produced by the pre-upload validation gate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The file is not an image.
    #[error("Invalid file type {0:?}: an image is required")]
    InvalidType(String),

    /// The file exceeds the upload size limit.
    #[error("File is too large: {size_bytes} bytes exceeds the {limit_bytes} byte limit")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
}

/// Failure of a single HTTP exchange with the inference service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    /// No response was received (connection failure or timeout).
    #[error("No response from server: {0}")]
    Unreachable(String),

    /// The server responded with an error status. `detail` carries the
    /// server-provided message when the body contained one.
    #[error("Server returned {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Failed { status: u16, detail: Option<String> },

    /// The server responded successfully but the body violated the wire
    /// contract.
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
}

/// Top-level error for pipeline operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The submission was rejected before any network activity.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The upload step failed.
    #[error("Upload failed: {0}")]
    Upload(TransferError),

    /// The result retrieval step failed.
    #[error("Result retrieval failed: {0}")]
    Retrieval(TransferError),

    /// Caller misuse (e.g. an empty scan id).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// True if the failure means the service never answered, so retrying
    /// later is reasonable.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Error::Upload(TransferError::Unreachable(_))
                | Error::Retrieval(TransferError::Unreachable(_))
        )
    }

    /// The server-provided detail message, when one was received.
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Error::Upload(TransferError::Failed { detail, .. })
            | Error::Retrieval(TransferError::Failed { detail, .. }) => detail.as_deref(),
            _ => None,
        }
    }
}
