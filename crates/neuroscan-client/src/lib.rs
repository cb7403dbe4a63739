//! # neuroscan-client
//!
//! Scan submission and result retrieval pipeline for the NeuroScan
//! inference service.
//!
//! This crate provides:
//! - Transfer client for the upload/result/classification endpoints
//! - Normalization of raw server payloads into the canonical result shape
//! - Durable, append-only local scan history behind a pluggable store
//! - The submission controller state machine observed by the UI layer
//! - Configuration from TOML files or `NEUROSCAN_*` environment variables
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use neuroscan_client::{
//!     ClientConfig, FileHistoryStore, ScanSubmission, SubmissionController, TransferClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> neuroscan_client::Result<()> {
//!     let config = ClientConfig::from_env();
//!     let history = Arc::new(FileHistoryStore::new("scan_history.json"));
//!     let controller = SubmissionController::new(TransferClient::new(config), history);
//!
//!     let data = std::fs::read("scan.jpg").expect("readable scan file");
//!     let scan = ScanSubmission::new("scan.jpg", "image/jpeg", data);
//!     let scan_id = controller.submit(scan).await?;
//!     let result = controller.fetch_result(&scan_id).await?;
//!     println!("{}: {:.0}%", result.prediction.classification, result.prediction.confidence * 100.0);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod history;
pub mod middleware;
pub mod normalize;
pub mod submission;
pub mod transfer;

// Re-export core types
pub use neuroscan_core::*;

pub use config::{ClientConfig, ConfigError, ConfigResult};
pub use history::{FileHistoryStore, HistoryStore, MemoryHistoryStore, StoreError, StoreResult};
pub use middleware::{RequestObserver, RequestOutcome, TracingObserver};
pub use normalize::normalize;
pub use submission::{SubmissionController, SubmissionState};
pub use transfer::TransferClient;
