// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama generate endpoint.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// JSON schema constraining the output, when structured decoding is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    pub stream: bool,
}

/// Response body for a non-streaming generate call.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub model: String,
    pub response: String,
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_format_when_none() {
        let request = GenerateRequest {
            model: "llama3.1".into(),
            prompt: "hello".into(),
            format: None,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("format").is_none());
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn request_serializes_format_schema() {
        let request = GenerateRequest {
            model: "llama3.1".into(),
            prompt: "hello".into(),
            format: Some(serde_json::json!({"type": "object"})),
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"]["type"], "object");
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let body = r#"{"model": "llama3.1", "response": "hi", "done": true}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.response, "hi");
        assert!(parsed.total_duration.is_none());
        assert!(parsed.eval_count.is_none());
    }
}
