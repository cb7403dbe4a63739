//! HTTP transfer client for the inference service.
//!
//! One failed attempt surfaces to the caller; no retries are performed
//! here. Retrying a non-idempotent multipart upload could submit the same
//! scan twice, so retry policy belongs to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::stream;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use neuroscan_core::defaults::PROGRESS_CHUNK_BYTES;
use neuroscan_core::{ClassificationMeta, Error, Result, ScanSubmission, TransferError};

use crate::config::ClientConfig;
use crate::middleware::{RequestObserver, RequestOutcome, TracingObserver};

/// Client for the scan upload and result retrieval endpoints.
pub struct TransferClient {
    client: Client,
    config: ClientConfig,
    observers: Vec<Arc<dyn RequestObserver>>,
}

/// Success body of the upload endpoint. Extra fields are ignored.
#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    scan_id: Option<String>,
}

/// Error body shape used by the service for rejected requests.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

impl TransferClient {
    /// Create a client with the default tracing observer.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_observers(config, vec![Arc::new(TracingObserver)])
    }

    /// Create a client with an explicit observer chain.
    pub fn with_observers(config: ClientConfig, observers: Vec<Arc<dyn RequestObserver>>) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            observers,
        }
    }

    /// Connection settings in use, including the origin used to absolutize
    /// relative image URLs.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload a scan and return the server-assigned scan id.
    #[instrument(skip(self, submission), fields(subsystem = "client", component = "transfer", op = "upload", file = %submission.file_name, size = submission.size_bytes()))]
    pub async fn upload(&self, submission: &ScanSubmission) -> Result<String> {
        let part = Part::bytes(submission.data.clone());
        self.upload_inner(submission, part).await
    }

    /// Upload a scan, reporting cumulative `(bytes_sent, bytes_total)`
    /// after each transmitted chunk. Progress is advisory only.
    #[instrument(skip(self, submission, progress), fields(subsystem = "client", component = "transfer", op = "upload", file = %submission.file_name, size = submission.size_bytes()))]
    pub async fn upload_with_progress(
        &self,
        submission: &ScanSubmission,
        progress: impl Fn(u64, u64) + Send + Sync + 'static,
    ) -> Result<String> {
        let part = progress_part(&submission.data, progress);
        self.upload_inner(submission, part).await
    }

    async fn upload_inner(&self, submission: &ScanSubmission, file_part: Part) -> Result<String> {
        let url = format!("{}/upload-scan/", self.config.origin());
        let start = Instant::now();

        let file_part = file_part
            .file_name(submission.file_name.clone())
            .mime_str(&submission.mime_type)
            .map_err(|e| {
                Error::InvalidArgument(format!(
                    "MIME type {:?} is not well-formed: {e}",
                    submission.mime_type
                ))
            })?;

        let mut form = Form::new().part("file", file_part);
        if let Some(info) = &submission.patient_info {
            let encoded = serde_json::to_string(info)
                .map_err(|e| Error::InvalidArgument(format!("patient info: {e}")))?;
            form = form.text("patientInfo", encoded);
        }

        self.notify_request("POST", &url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(self.config.upload_timeout_secs))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                let failure = send_failure(error);
                self.notify_response("POST", &url, &RequestOutcome::Failed(failure.to_string()));
                return Err(Error::Upload(failure));
            }
        };

        let status = response.status();
        self.notify_response("POST", &url, &RequestOutcome::Status(status.as_u16()));

        if !status.is_success() {
            return Err(Error::Upload(status_failure(response).await));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            Error::Upload(TransferError::MalformedResponse(format!(
                "upload response: {e}"
            )))
        })?;

        match body.scan_id {
            Some(scan_id) if !scan_id.is_empty() => {
                debug!(
                    scan_id = %scan_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Upload complete"
                );
                Ok(scan_id)
            }
            _ => Err(Error::Upload(TransferError::MalformedResponse(
                "upload response carries no scan id".to_string(),
            ))),
        }
    }

    /// Fetch the raw result payload for a scan.
    ///
    /// The payload is returned untouched; normalization is a separate step.
    #[instrument(skip(self), fields(subsystem = "client", component = "transfer", op = "get_result", scan_id = %scan_id))]
    pub async fn get_result(&self, scan_id: &str) -> Result<serde_json::Value> {
        if scan_id.is_empty() {
            return Err(Error::InvalidArgument(
                "scan id must not be empty".to_string(),
            ));
        }

        let url = format!("{}/scan-results/{}", self.config.origin(), scan_id);
        let response = self.send_get(&url).await.map_err(Error::Retrieval)?;

        response.json().await.map_err(|e| {
            Error::Retrieval(TransferError::MalformedResponse(format!(
                "result payload: {e}"
            )))
        })
    }

    /// List the diagnostic categories the service can assign.
    #[instrument(skip(self), fields(subsystem = "client", component = "transfer", op = "list_classifications"))]
    pub async fn list_classifications(&self) -> Result<Vec<ClassificationMeta>> {
        let url = format!("{}/classifications/", self.config.origin());
        let response = self.send_get(&url).await.map_err(Error::Retrieval)?;

        // The contract requires a sequence; any other shape is a protocol
        // violation, not an empty catalog.
        response.json::<Vec<ClassificationMeta>>().await.map_err(|e| {
            Error::Retrieval(TransferError::MalformedResponse(format!(
                "expected a classification array: {e}"
            )))
        })
    }

    async fn send_get(&self, url: &str) -> std::result::Result<reqwest::Response, TransferError> {
        let start = Instant::now();
        self.notify_request("GET", url);

        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                let failure = send_failure(error);
                self.notify_response("GET", url, &RequestOutcome::Failed(failure.to_string()));
                return Err(failure);
            }
        };

        let status = response.status();
        self.notify_response("GET", url, &RequestOutcome::Status(status.as_u16()));

        if !status.is_success() {
            return Err(status_failure(response).await);
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(duration_ms = elapsed, "Request complete");
        if elapsed > 5000 {
            warn!(duration_ms = elapsed, slow = true, "Slow service response");
        }
        Ok(response)
    }

    fn notify_request(&self, method: &str, url: &str) {
        for observer in &self.observers {
            observer.on_request(method, url);
        }
    }

    fn notify_response(&self, method: &str, url: &str, outcome: &RequestOutcome) {
        for observer in &self.observers {
            observer.on_response(method, url, outcome);
        }
    }
}

/// Classify a send error. Any failure of `send()` means no usable response
/// arrived, whether the connection was refused or the deadline passed.
fn send_failure(error: reqwest::Error) -> TransferError {
    if error.is_timeout() {
        TransferError::Unreachable(format!("request timed out: {error}"))
    } else {
        TransferError::Unreachable(error.to_string())
    }
}

/// Turn an error-status response into a `Failed`, salvaging the server's
/// `detail` message when the body carries one.
async fn status_failure(response: reqwest::Response) -> TransferError {
    let status = response.status().as_u16();
    let detail = match response.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail),
        Err(_) => None,
    };
    TransferError::Failed { status, detail }
}

/// Build a streamed multipart part that reports progress per chunk.
fn progress_part(data: &[u8], progress: impl Fn(u64, u64) + Send + Sync + 'static) -> Part {
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = data
        .chunks(PROGRESS_CHUNK_BYTES)
        .map(Bytes::copy_from_slice)
        .collect();

    let mut sent: u64 = 0;
    let body = stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        progress(sent, total);
        Ok::<Bytes, std::convert::Infallible>(chunk)
    }));

    Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
}
