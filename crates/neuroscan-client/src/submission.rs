//! Submission lifecycle state machine.
//!
//! One controller drives one submission at a time through
//! `Idle → Validating → Uploading → AwaitingResult → Succeeded | Failed`.
//! The only suspension points are the network calls; validation,
//! normalization, and history access run synchronously between them, so
//! subscribers observe transitions in strict order.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use neuroscan_core::{
    validate_scan, Error, HistoryEntry, Result, ScanResult, ScanSubmission,
};

use crate::history::HistoryStore;
use crate::normalize::normalize;
use crate::transfer::TransferClient;

/// Broadcast buffer for state transitions. A full submission produces at
/// most six, so subscribers that poll at all never lag out.
const TRANSITION_BUFFER: usize = 32;

/// Lifecycle of a single scan submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    /// No submission in flight.
    #[default]
    Idle,
    /// The file is being checked by the validation gate.
    Validating,
    /// The multipart upload is in flight.
    Uploading,
    /// The upload was accepted; the result can now be fetched.
    AwaitingResult { scan_id: String },
    /// Terminal: the normalized result is available.
    Succeeded { result: ScanResult },
    /// Terminal: the submission failed at some step.
    Failed { error: Error },
}

impl SubmissionState {
    /// True for `Succeeded` and `Failed`; a new submission starts a fresh
    /// lifecycle from `Idle`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Uploading => "uploading",
            Self::AwaitingResult { .. } => "awaiting_result",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Orchestrates validation, transfer, normalization, and history for one
/// scan at a time.
pub struct SubmissionController {
    client: TransferClient,
    history: Arc<dyn HistoryStore>,
    current: Mutex<SubmissionState>,
    events: broadcast::Sender<SubmissionState>,
}

impl SubmissionController {
    pub fn new(client: TransferClient, history: Arc<dyn HistoryStore>) -> Self {
        let (events, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            client,
            history,
            current: Mutex::new(SubmissionState::Idle),
            events,
        }
    }

    /// Subscribe to state transitions. Each receiver sees every transition
    /// emitted after it subscribed, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionState> {
        self.events.subscribe()
    }

    /// The most recent state.
    pub fn state(&self) -> SubmissionState {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Validate and upload a scan, returning the server-assigned scan id.
    ///
    /// Begins a fresh lifecycle: any previous terminal state is discarded.
    /// A validation rejection fails the submission before any network
    /// activity. On success the controller is left in `AwaitingResult`;
    /// call [`fetch_result`](Self::fetch_result) to finish the lifecycle.
    #[instrument(skip(self, submission), fields(subsystem = "client", component = "submission", op = "submit", file = %submission.file_name))]
    pub async fn submit(&self, submission: ScanSubmission) -> Result<String> {
        self.transition(SubmissionState::Idle);
        self.transition(SubmissionState::Validating);

        if let Err(rejection) = validate_scan(&submission.mime_type, submission.size_bytes()) {
            let error = Error::Validation(rejection);
            self.transition(SubmissionState::Failed {
                error: error.clone(),
            });
            return Err(error);
        }

        self.transition(SubmissionState::Uploading);
        match self.client.upload(&submission).await {
            Ok(scan_id) => {
                info!(scan_id = %scan_id, "Scan uploaded");
                self.transition(SubmissionState::AwaitingResult {
                    scan_id: scan_id.clone(),
                });
                Ok(scan_id)
            }
            Err(error) => {
                self.transition(SubmissionState::Failed {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Fetch and normalize the result for an uploaded scan.
    ///
    /// On success the result is appended to history (best-effort: a store
    /// failure is logged and does not affect the returned value or the
    /// transition to `Succeeded`).
    #[instrument(skip(self), fields(subsystem = "client", component = "submission", op = "fetch_result", scan_id = %scan_id))]
    pub async fn fetch_result(&self, scan_id: &str) -> Result<ScanResult> {
        match self.fetch_inner(scan_id).await {
            Ok(result) => {
                self.record_history(&result);
                self.transition(SubmissionState::Succeeded {
                    result: result.clone(),
                });
                Ok(result)
            }
            Err(error) => {
                self.transition(SubmissionState::Failed {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// All locally recorded scan summaries, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.list()
    }

    async fn fetch_inner(&self, scan_id: &str) -> Result<ScanResult> {
        let raw = self.client.get_result(scan_id).await?;
        normalize(raw, self.client.config().origin()).map_err(Error::Retrieval)
    }

    fn record_history(&self, result: &ScanResult) {
        if let Err(error) = self.history.append(HistoryEntry::from_result(result)) {
            warn!(
                scan_id = %result.id,
                error = %error,
                "Failed to record scan history"
            );
        }
    }

    fn transition(&self, next: SubmissionState) {
        tracing::debug!(state = next.label(), "Submission state");
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = next.clone();
        // No subscribers is fine; the state is still queryable via state()
        let _ = self.events.send(next);
    }
}
