// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavior-configuration trait.

use async_trait::async_trait;

use crate::error::QualiaError;
use crate::types::BehaviorDocument;

/// Source of the active behavior document.
///
/// Exactly one document is active at a time; the engine never writes back.
#[async_trait]
pub trait BehaviorSource {
    /// Returns the currently active behavior document.
    async fn active_document(&self) -> Result<BehaviorDocument, QualiaError>;
}
