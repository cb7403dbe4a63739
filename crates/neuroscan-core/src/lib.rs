//! # neuroscan-core
//!
//! Core types, errors, and validation for the NeuroScan client.
//!
//! This crate provides:
//! - The error taxonomy shared by every pipeline step
//! - The data model (submissions, predictions, results, history entries)
//! - Centralized default constants
//! - The pre-upload validation gate
//!
//! No network or storage access happens here; the transfer and persistence
//! layers live in `neuroscan-client`.

pub mod defaults;
pub mod error;
pub mod models;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, Result, TransferError, ValidationError};
pub use models::{
    Classification, ClassificationMeta, Gender, HistoryEntry, PatientInfo, Prediction,
    ScanResult, ScanSubmission,
};
pub use validate::{first_admitted, validate_scan};
