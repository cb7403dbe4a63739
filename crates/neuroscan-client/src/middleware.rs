//! Request/response observation middleware.
//!
//! Observers are composed explicitly at [`TransferClient`] construction
//! time rather than attached to a process-wide client. They see every
//! request and its terminal outcome but cannot alter either.
//!
//! [`TransferClient`]: crate::transfer::TransferClient

use tracing::{debug, warn};

/// Terminal outcome of one HTTP round-trip, as seen by observers.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// A response arrived with this status code.
    Status(u16),
    /// No response arrived.
    Failed(String),
}

/// Hook invoked around every request the transfer client issues.
pub trait RequestObserver: Send + Sync {
    /// Called immediately before the request is sent.
    fn on_request(&self, method: &str, url: &str);

    /// Called once the request has resolved, successfully or not.
    fn on_response(&self, method: &str, url: &str, outcome: &RequestOutcome);
}

/// Default observer: structured request logs via `tracing`.
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, method: &str, url: &str) {
        debug!(component = "transfer", method, url, "request start");
    }

    fn on_response(&self, method: &str, url: &str, outcome: &RequestOutcome) {
        match outcome {
            RequestOutcome::Status(status) if *status < 400 => {
                debug!(component = "transfer", method, url, status, "request complete");
            }
            RequestOutcome::Status(status) => {
                warn!(component = "transfer", method, url, status, "request rejected");
            }
            RequestOutcome::Failed(error) => {
                warn!(component = "transfer", method, url, error = %error, "request failed");
            }
        }
    }
}
