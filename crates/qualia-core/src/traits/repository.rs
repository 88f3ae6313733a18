// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository trait over the external document store.

use async_trait::async_trait;

use crate::error::QualiaError;
use crate::types::{Contact, ContactId, ContactPatch, ConversationMessage};

/// Read/write access to contact and message records.
///
/// The store itself (schemas, transactions, indexing) lives outside this
/// engine; implementations are expected to provide atomic per-document
/// updates. No cross-entity transactions are required.
#[async_trait]
pub trait ConversationRepository {
    /// Fetches a contact by id.
    async fn contact(&self, id: &ContactId) -> Result<Contact, QualiaError>;

    /// Applies a partial update to a contact.
    ///
    /// Flag milestones in the patch are set true; absent fields are left
    /// untouched.
    async fn update_contact(&self, id: &ContactId, patch: ContactPatch)
        -> Result<(), QualiaError>;

    /// Returns the most recent text messages for a contact, chronological
    /// ascending, deduplicated by platform message id, capped to `limit`.
    async fn recent_messages(
        &self,
        id: &ContactId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, QualiaError>;

    /// Appends a message to the contact's history.
    ///
    /// A message whose id is already present is ignored (webhook
    /// redelivery). Inbound messages also refresh the contact's
    /// last-message bookkeeping.
    async fn append_message(
        &self,
        id: &ContactId,
        message: ConversationMessage,
    ) -> Result<(), QualiaError>;
}
