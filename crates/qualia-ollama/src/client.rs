// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama generate API.
//!
//! Provides [`OllamaClient`], the [`LanguageModel`] implementation used in
//! production. One request, one network call: retry and backoff belong to
//! the caller, so a transport failure surfaces immediately as
//! [`QualiaError::Transport`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use qualia_config::model::OllamaConfig;
use qualia_core::types::{ModelRequest, ModelResponse};
use qualia_core::{LanguageModel, QualiaError};

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse};

/// Path of the non-streaming generate endpoint.
const GENERATE_PATH: &str = "/api/generate";

/// HTTP client for an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
}

impl OllamaClient {
    /// Creates a new client from configuration.
    pub fn new(config: &OllamaConfig) -> Result<Self, QualiaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QualiaError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.model.clone(),
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, QualiaError> {
        let url = format!("{}{GENERATE_PATH}", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| QualiaError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "generate response received");

        let body = response.text().await.map_err(|e| QualiaError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!("Ollama API error ({status}): {}", api_err.error)
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(QualiaError::transport(message));
        }

        serde_json::from_str(&body).map_err(|e| QualiaError::Transport {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, QualiaError> {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model
        };

        let wire = GenerateRequest {
            model,
            prompt: request.prompt,
            format: request.format,
            stream: false,
        };

        let response = self.generate(&wire).await?;
        Ok(ModelResponse {
            text: response.response,
            model: response.model,
        })
    }
}
