//! Wire DTOs for the Transkit API.
//!
//! # Design
//! Field names are the service's wire contract and are kept lowercase with
//! no separators. Response fields default when absent so a sparse server
//! reply still decodes. `consumedquota` is flattened into the transcription
//! responses by composition with `ConsumedQuota`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Consumed quota counter, reported on every metered call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedQuota {
    #[serde(rename = "consumedquota", default)]
    pub consumed_quota: i64,
}

/// Body of a synchronous transcription request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineTranscriptionRequest {
    /// Base64-encoded audio bytes.
    pub audio: String,
    pub pipeline: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One recognized word with its timing, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineWord {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnlineTranscriptionResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<OnlineWord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub quota: ConsumedQuota,
}

/// Body of an asynchronous transcription request.
///
/// `config` is caller-opaque JSON and is left out of the body entirely when
/// unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineTranscriptionRequest {
    pub pipeline: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineTranscriptionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub quota: ConsumedQuota,
}

/// Structured error attached to a failed offline job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub module: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineTranscriptionStatusResponse {
    /// Server-defined job status code.
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub message: String,
    /// Result artifact location, once the job has produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OfflineError>,
}

impl OfflineTranscriptionStatusResponse {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn online_request_uses_wire_names_and_keeps_tag_order() {
        let req = OnlineTranscriptionRequest {
            audio: "AA==".to_string(),
            pipeline: "p".to_string(),
            tags: vec!["x".to_string(), "y".to_string()],
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({"audio": "AA==", "pipeline": "p", "tags": ["x", "y"]}));
    }

    #[test]
    fn online_request_without_tags_emits_empty_array() {
        let req = OnlineTranscriptionRequest {
            audio: "AA==".to_string(),
            pipeline: "p".to_string(),
            tags: Vec::new(),
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["tags"], json!([]));
    }

    #[test]
    fn offline_request_omits_unset_config() {
        let req = OfflineTranscriptionRequest {
            pipeline: "p".to_string(),
            url: "https://a.example/a.wav".to_string(),
            config: None,
            tags: Vec::new(),
        };
        let text = serde_json::to_string(&req).unwrap();
        assert!(!text.contains("config"));
    }

    #[test]
    fn online_response_flattens_quota() {
        let resp: OnlineTranscriptionResponse = serde_json::from_str(
            r#"{"text":"kaixo","words":[{"word":"kaixo","start":0.1,"length":0.4,"confidence":0.9}],"consumedquota":12,"extra":true}"#,
        )
        .unwrap();
        assert_eq!(resp.text, "kaixo");
        assert_eq!(resp.quota.consumed_quota, 12);
        let words = resp.words.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "kaixo");
        assert!(resp.error.is_none());
    }

    #[test]
    fn online_response_distinguishes_empty_error_from_absent() {
        let resp: OnlineTranscriptionResponse =
            serde_json::from_str(r#"{"text":"","error":"","consumedquota":1}"#).unwrap();
        assert_eq!(resp.error.as_deref(), Some(""));
    }

    #[test]
    fn offline_response_serializes_quota_at_top_level() {
        let resp = OfflineTranscriptionResponse {
            id: "job-1".to_string(),
            quota: ConsumedQuota { consumed_quota: 7 },
        };
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body, json!({"id": "job-1", "consumedquota": 7}));
    }

    #[test]
    fn status_without_error_is_not_failed() {
        let resp: OfflineTranscriptionStatusResponse =
            serde_json::from_str(r#"{"status":1,"message":"queued"}"#).unwrap();
        assert!(!resp.is_failed());
        assert!(resp.url.is_none());
    }
}
