//! Normalization of raw result payloads.
//!
//! This is the single point where "what the server actually sent" becomes
//! "what the rest of the system may assume". Downstream consumers trust the
//! post-normalization invariants — absolute `image_url`, float
//! `confidence` — and perform no further defensive checks.

use std::collections::BTreeMap;

use serde::Deserialize;

use neuroscan_core::{Classification, PatientInfo, Prediction, ScanResult, TransferError};

/// Minimal required shape of a result payload. Field names follow the wire
/// (`imageUrl`, `patientInfo`); anything absent fails deserialization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    id: String,
    timestamp: String,
    image_url: String,
    prediction: RawPrediction,
    #[serde(default)]
    patient_info: Option<PatientInfo>,
}

#[derive(Deserialize)]
struct RawPrediction {
    classification: Classification,
    /// Arrives as either a JSON number or its decimal-string encoding.
    confidence: serde_json::Value,
    probabilities: BTreeMap<String, f64>,
}

/// Reshape a raw server payload into the canonical [`ScanResult`].
///
/// Total over any payload with the minimal required shape; a missing
/// required field, or a `confidence` that parses to neither number nor
/// numeric string, is [`TransferError::MalformedResponse`]. Idempotent:
/// normalizing an already-normalized result is a fixpoint.
pub fn normalize(
    raw: serde_json::Value,
    origin: &str,
) -> std::result::Result<ScanResult, TransferError> {
    let raw: RawResult = serde_json::from_value(raw)
        .map_err(|e| TransferError::MalformedResponse(format!("result payload: {e}")))?;

    let confidence = coerce_confidence(&raw.prediction.confidence)?;

    Ok(ScanResult {
        id: raw.id,
        timestamp: raw.timestamp,
        image_url: absolutize(raw.image_url, origin),
        prediction: Prediction {
            classification: raw.prediction.classification,
            confidence,
            probabilities: raw.prediction.probabilities,
        },
        patient_info: raw.patient_info,
    })
}

/// Accept a confidence sent as a number or as its string encoding. A string
/// that fails to parse is a protocol violation, never a silent default.
fn coerce_confidence(value: &serde_json::Value) -> std::result::Result<f64, TransferError> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
            TransferError::MalformedResponse(format!("confidence {n} is not representable"))
        }),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            TransferError::MalformedResponse(format!("confidence {s:?} is not numeric"))
        }),
        other => Err(TransferError::MalformedResponse(format!(
            "confidence has unexpected type: {other}"
        ))),
    }
}

/// Root-relative paths are rewritten against the service origin; absolute
/// URLs and data URIs pass through unchanged.
fn absolutize(image_url: String, origin: &str) -> String {
    if image_url.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), image_url)
    } else {
        image_url
    }
}
