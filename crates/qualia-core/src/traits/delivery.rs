// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery trait.

use async_trait::async_trait;

use crate::error::QualiaError;
use crate::types::{ChannelKind, ContactId};

/// Hands a finished reply to the platform-specific send API.
///
/// Success means the platform accepted the message. Retrying rejected
/// sends is the delivery collaborator's concern, not this engine's.
#[async_trait]
pub trait ReplyDelivery {
    /// Delivers `text` to the contact on the given channel.
    async fn deliver_reply(
        &self,
        contact: &ContactId,
        channel: ChannelKind,
        text: &str,
    ) -> Result<(), QualiaError>;
}
