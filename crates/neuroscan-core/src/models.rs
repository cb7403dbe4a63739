//! Data model for scan submissions, predictions, and history.
//!
//! Wire-facing types serialize with the service's camelCase field names
//! (`imageUrl`, `patientInfo`). [`ScanResult`] instances obtained from the
//! client are already normalized: `image_url` is absolute and `confidence`
//! is a float, so consumers need no defensive checks of their own.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic category assigned by the inference service.
///
/// The label set is open: a response can carry a label this client does not
/// know yet, which is preserved verbatim as [`Classification::Other`] and
/// rendered under its raw key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Classification {
    Glioma,
    Meningioma,
    Pituitary,
    NoTumor,
    /// An unrecognized label, passed through unchanged.
    Other(String),
}

impl Classification {
    /// Wire representation of the label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Glioma => "glioma",
            Self::Meningioma => "meningioma",
            Self::Pituitary => "pituitary",
            Self::NoTumor => "no_tumor",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Classification {
    fn from(label: String) -> Self {
        match label.as_str() {
            "glioma" => Self::Glioma,
            "meningioma" => Self::Meningioma,
            "pituitary" => Self::Pituitary,
            "no_tumor" => Self::NoTumor,
            _ => Self::Other(label),
        }
    }
}

impl From<Classification> for String {
    fn from(classification: Classification) -> Self {
        classification.as_str().to_string()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient gender as accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Optional free-form patient metadata attached to a submission.
///
/// Has no identity of its own; it is always embedded in a submission or a
/// result. Unset fields are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A scan picked by the user, not yet transmitted.
///
/// Exists only client-side: dropped after the upload succeeds or validation
/// rejects it.
#[derive(Debug, Clone)]
pub struct ScanSubmission {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub patient_info: Option<PatientInfo>,
}

impl ScanSubmission {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
            patient_info: None,
        }
    }

    pub fn with_patient_info(mut self, info: PatientInfo) -> Self {
        self.patient_info = Some(info);
        self
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Prediction attached to a scan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub classification: Classification,
    /// In [0, 1] once normalized.
    pub confidence: f64,
    /// Per-label probabilities. The label set is open; unknown labels are
    /// kept under their raw key.
    pub probabilities: BTreeMap<String, f64>,
}

/// The canonical server-confirmed record for one scan.
///
/// Created by the remote service and immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Opaque server-assigned identifier.
    pub id: String,
    /// ISO-8601 timestamp, as sent by the server.
    pub timestamp: String,
    /// Absolute URL of the stored scan image.
    pub image_url: String,
    pub prediction: Prediction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_info: Option<PatientInfo>,
}

/// Durable denormalized projection of a [`ScanResult`], retained locally
/// after each successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: String,
    pub classification: Classification,
    pub confidence: f64,
}

impl HistoryEntry {
    /// Project a normalized result into its history form.
    pub fn from_result(result: &ScanResult) -> Self {
        Self {
            id: result.id.clone(),
            timestamp: result.timestamp.clone(),
            classification: result.prediction.classification.clone(),
            confidence: result.prediction.confidence,
        }
    }
}

/// Catalog row describing one diagnostic category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMeta {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_known_labels_round_trip() {
        for (label, variant) in [
            ("glioma", Classification::Glioma),
            ("meningioma", Classification::Meningioma),
            ("pituitary", Classification::Pituitary),
            ("no_tumor", Classification::NoTumor),
        ] {
            assert_eq!(Classification::from(label.to_string()), variant);
            assert_eq!(variant.as_str(), label);
        }
    }

    #[test]
    fn test_classification_unknown_label_preserved() {
        let c = Classification::from("astrocytoma".to_string());
        assert_eq!(c, Classification::Other("astrocytoma".to_string()));
        assert_eq!(c.as_str(), "astrocytoma");
        assert_eq!(c.to_string(), "astrocytoma");
    }

    #[test]
    fn test_classification_serde_uses_wire_strings() {
        let json = serde_json::to_string(&Classification::NoTumor).unwrap();
        assert_eq!(json, "\"no_tumor\"");

        let parsed: Classification = serde_json::from_str("\"glioma\"").unwrap();
        assert_eq!(parsed, Classification::Glioma);

        let parsed: Classification = serde_json::from_str("\"mystery\"").unwrap();
        assert_eq!(parsed, Classification::Other("mystery".to_string()));
    }

    #[test]
    fn test_patient_info_omits_unset_fields() {
        let info = PatientInfo {
            age: Some(54),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({ "age": 54 }));
    }

    #[test]
    fn test_patient_info_gender_lowercase() {
        let info = PatientInfo {
            id: Some("P-104".to_string()),
            gender: Some(Gender::Female),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["gender"], "female");

        let back: PatientInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_scan_result_uses_camel_case_field_names() {
        let result = ScanResult {
            id: "abc123".to_string(),
            timestamp: "2026-02-10T12:00:00".to_string(),
            image_url: "http://localhost:8000/uploads/abc123.jpg".to_string(),
            prediction: Prediction {
                classification: Classification::Glioma,
                confidence: 0.91,
                probabilities: BTreeMap::from([
                    ("glioma".to_string(), 0.91),
                    ("no_tumor".to_string(), 0.04),
                ]),
            },
            patient_info: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("image_url").is_none());
        assert!(json.get("patientInfo").is_none());

        let back: ScanResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_history_entry_from_result() {
        let result = ScanResult {
            id: "abc123".to_string(),
            timestamp: "2026-02-10T12:00:00".to_string(),
            image_url: "http://localhost:8000/uploads/abc123.jpg".to_string(),
            prediction: Prediction {
                classification: Classification::Meningioma,
                confidence: 0.73,
                probabilities: BTreeMap::new(),
            },
            patient_info: Some(PatientInfo::default()),
        };

        let entry = HistoryEntry::from_result(&result);
        assert_eq!(entry.id, "abc123");
        assert_eq!(entry.timestamp, "2026-02-10T12:00:00");
        assert_eq!(entry.classification, Classification::Meningioma);
        assert_eq!(entry.confidence, 0.73);
    }

    #[test]
    fn test_scan_submission_size() {
        let submission = ScanSubmission::new("scan.jpg", "image/jpeg", vec![0u8; 2048]);
        assert_eq!(submission.size_bytes(), 2048);
        assert!(submission.patient_info.is_none());

        let submission = submission.with_patient_info(PatientInfo {
            notes: Some("follow-up".to_string()),
            ..Default::default()
        });
        assert!(submission.patient_info.is_some());
    }

    #[test]
    fn test_classification_meta_deserialization() {
        let json = r#"{"id": "glioma", "name": "Glioma", "description": "Starts in glial cells of brain or spine"}"#;
        let meta: ClassificationMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.id, "glioma");
        assert_eq!(meta.name, "Glioma");
    }
}
