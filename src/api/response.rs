//! API response envelope
//!
//! Every endpoint answers with the same shape:
//! `{status, message, data, metadata: {version, timestamp}}`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response metadata: service version and UTC wall-clock timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub timestamp: String,
}

impl Metadata {
    /// Metadata for the current instant
    pub fn now() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    pub message: String,
    pub data: Value,
    pub metadata: Metadata,
}

impl Envelope {
    /// Success envelope with a data payload
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
            metadata: Metadata::now(),
        }
    }

    /// Error envelope; data is always null
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: Value::Null,
            metadata: Metadata::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = Envelope::success(
            "batch processed",
            json!({"inserted": "2 rows", "rejected": "1 rows"}),
        );
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["inserted"], "2 rows");
        assert_eq!(value["metadata"]["version"], env!("CARGO_PKG_VERSION"));
        // Timestamp format: YYYY-MM-DD HH:MM:SS
        let ts = value["metadata"]["timestamp"].as_str().unwrap();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }

    #[test]
    fn test_error_envelope_has_null_data() {
        let envelope = Envelope::error("Table 'invoices' is not registered");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["status"], "error");
        assert!(value["data"].is_null());
    }
}
