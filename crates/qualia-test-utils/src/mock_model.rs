// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language model for deterministic testing.
//!
//! `ScriptedModel` implements `LanguageModel` with pre-configured responses,
//! enabling fast, CI-runnable tests without a model backend. Responses are
//! popped from a FIFO queue; every received request is recorded for
//! assertion.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use qualia_core::types::{ModelRequest, ModelResponse};
use qualia_core::{LanguageModel, QualiaError};

/// A mock model backend that returns scripted responses.
///
/// When the queue is empty, a default "mock response" text is returned.
/// Transport failures can be injected for the next N requests.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ModelRequest>>,
    fail_requests: Mutex<u32>,
}

impl ScriptedModel {
    /// Creates a mock model with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fail_requests: Mutex::new(0),
        }
    }

    /// Creates a mock model pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
            fail_requests: Mutex::new(0),
        }
    }

    /// Adds a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Makes the next `count` requests fail with a transport error.
    pub async fn fail_next(&self, count: u32) {
        *self.fail_requests.lock().await = count;
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, QualiaError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        {
            let mut fail = self.fail_requests.lock().await;
            if *fail > 0 {
                *fail -= 1;
                return Err(QualiaError::transport("injected transport failure"));
            }
        }

        let text = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string());

        Ok(ModelResponse { text, model })
    }
}
