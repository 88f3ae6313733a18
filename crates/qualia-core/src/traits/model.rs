// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model backend trait.

use async_trait::async_trait;

use crate::error::QualiaError;
use crate::types::{ModelRequest, ModelResponse};

/// A text-generation backend.
///
/// One request, one network call, raw text back. No internal retry:
/// backoff, if wanted, belongs to the caller.
#[async_trait]
pub trait LanguageModel {
    /// Executes a single completion request.
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, QualiaError>;
}
