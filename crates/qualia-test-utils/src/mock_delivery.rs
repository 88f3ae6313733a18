// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording delivery collaborator for tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use qualia_core::types::{ChannelKind, ContactId};
use qualia_core::{QualiaError, ReplyDelivery};

/// One delivered reply, as captured by [`RecordingDelivery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredReply {
    pub contact: ContactId,
    pub channel: ChannelKind,
    pub text: String,
}

/// A delivery collaborator that records every reply instead of sending it.
///
/// Failure injection makes `deliver_reply` reject until cleared.
pub struct RecordingDelivery {
    sent: Mutex<Vec<DeliveredReply>>,
    failing: Mutex<bool>,
}

impl RecordingDelivery {
    /// Creates a recorder with no captured replies.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
        }
    }

    /// All replies delivered so far, in order.
    pub async fn sent(&self) -> Vec<DeliveredReply> {
        self.sent.lock().await.clone()
    }

    /// Number of replies delivered so far.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Toggles failure injection.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }
}

impl Default for RecordingDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyDelivery for RecordingDelivery {
    async fn deliver_reply(
        &self,
        contact: &ContactId,
        channel: ChannelKind,
        text: &str,
    ) -> Result<(), QualiaError> {
        if *self.failing.lock().await {
            return Err(QualiaError::Delivery {
                message: "injected delivery failure".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(DeliveredReply {
            contact: contact.clone(),
            channel,
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_replies_in_order() {
        let delivery = RecordingDelivery::new();
        let contact = ContactId("c1".to_string());

        delivery
            .deliver_reply(&contact, ChannelKind::WhatsApp, "first")
            .await
            .unwrap();
        delivery
            .deliver_reply(&contact, ChannelKind::WhatsApp, "second")
            .await
            .unwrap();

        let sent = delivery.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, "first");
        assert_eq!(sent[1].text, "second");
    }

    #[tokio::test]
    async fn failure_injection_rejects_until_cleared() {
        let delivery = RecordingDelivery::new();
        let contact = ContactId("c1".to_string());

        delivery.set_failing(true).await;
        let err = delivery
            .deliver_reply(&contact, ChannelKind::Telegram, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, QualiaError::Delivery { .. }));
        assert_eq!(delivery.sent_count().await, 0);

        delivery.set_failing(false).await;
        delivery
            .deliver_reply(&contact, ChannelKind::Telegram, "ok")
            .await
            .unwrap();
        assert_eq!(delivery.sent_count().await, 1);
    }
}
