// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contextual-data trait for stage-specific prompt enrichment.

use async_trait::async_trait;

use crate::error::QualiaError;
use crate::types::{Contact, Stage};

/// Supplies optional extra context appended to a stage prompt: the matched
/// product's full description, the next available appointment slots, and
/// the like.
#[async_trait]
pub trait ContextSource {
    /// Returns extra context for the given contact and stage, or `None`
    /// when the stage needs nothing beyond the conversation itself.
    async fn stage_context(
        &self,
        contact: &Contact,
        stage: Stage,
    ) -> Result<Option<String>, QualiaError>;
}
