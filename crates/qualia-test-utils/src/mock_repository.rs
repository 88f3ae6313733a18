// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation repository for deterministic testing.
//!
//! `InMemoryRepository` implements `ConversationRepository` over plain
//! `HashMap`s, honoring the same contracts as a real store: message
//! deduplication by platform id, chronological ascending history capped to
//! the requested limit, text-kind filtering, and last-message bookkeeping.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use qualia_core::types::{
    Contact, ContactId, ContactPatch, ConversationMessage, MessageKind, Sender,
};
use qualia_core::{ConversationRepository, QualiaError};

/// An in-memory contact/message store for tests.
pub struct InMemoryRepository {
    contacts: Mutex<HashMap<ContactId, Contact>>,
    messages: Mutex<HashMap<ContactId, Vec<ConversationMessage>>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(HashMap::new()),
            messages: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds a contact.
    pub async fn insert_contact(&self, contact: Contact) {
        self.contacts
            .lock()
            .await
            .insert(contact.id.clone(), contact);
    }

    /// Snapshot of a contact's current state, for assertions.
    pub async fn contact_snapshot(&self, id: &ContactId) -> Option<Contact> {
        self.contacts.lock().await.get(id).cloned()
    }

    /// All stored messages for a contact, unfiltered, for assertions.
    pub async fn messages_for(&self, id: &ContactId) -> Vec<ConversationMessage> {
        self.messages.lock().await.get(id).cloned().unwrap_or_default()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryRepository {
    async fn contact(&self, id: &ContactId) -> Result<Contact, QualiaError> {
        self.contacts
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| {
                QualiaError::storage(std::io::Error::other(format!(
                    "contact not found: {}",
                    id.0
                )))
            })
    }

    async fn update_contact(
        &self,
        id: &ContactId,
        patch: ContactPatch,
    ) -> Result<(), QualiaError> {
        let mut contacts = self.contacts.lock().await;
        let contact = contacts.get_mut(id).ok_or_else(|| {
            QualiaError::storage(std::io::Error::other(format!(
                "contact not found: {}",
                id.0
            )))
        })?;

        for flag in patch.flags {
            contact.flags.set(flag);
        }
        if let Some(display_name) = patch.display_name {
            contact.display_name = display_name;
        }
        if let Some(interest) = patch.interest_product {
            contact.interest_product = interest;
        }
        if let Some(case_summary) = patch.case_summary {
            contact.case_summary = Some(case_summary);
        }
        if let Some(case_info) = patch.case_info {
            contact.case_info = Some(case_info);
        }
        Ok(())
    }

    async fn recent_messages(
        &self,
        id: &ContactId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, QualiaError> {
        let messages = self.messages.lock().await;
        let mut history: Vec<ConversationMessage> = messages
            .get(id)
            .map(|all| {
                all.iter()
                    .filter(|m| m.kind == MessageKind::Text)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        history.sort_by_key(|m| m.timestamp);
        if history.len() > limit {
            history.drain(..history.len() - limit);
        }
        Ok(history)
    }

    async fn append_message(
        &self,
        id: &ContactId,
        message: ConversationMessage,
    ) -> Result<(), QualiaError> {
        let mut messages = self.messages.lock().await;
        let entry = messages.entry(id.clone()).or_default();
        // Webhook redelivery: a known message id is silently ignored.
        if entry.iter().any(|m| m.id == message.id) {
            return Ok(());
        }

        if message.sender == Sender::Contact {
            let mut contacts = self.contacts.lock().await;
            if let Some(contact) = contacts.get_mut(id) {
                contact.last_message = Some(message.text.clone());
                contact.last_message_at = Some(message.timestamp);
            }
        }

        entry.push(message);
        Ok(())
    }
}
