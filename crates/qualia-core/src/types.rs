// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the debouncer, resolver, assembler, and model client.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Stable unique identifier for a contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub String);

/// Platform-provided unique identifier for a message.
///
/// Used to deduplicate webhook redeliveries in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Messaging platform a conversation runs on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ChannelKind {
    WhatsApp,
    Instagram,
    Messenger,
    Telegram,
}

/// Prompt stages of the qualification funnel.
///
/// Stage labels double as the values the model may propose in the
/// `suggestedStage` response field, so Display/FromStr round-trip exactly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Stage {
    NewContact,
    TriageInProgress,
    SummaryVerifier,
    SummaryValidation,
    SummaryIncorporationValidation,
    UrgencyValidation,
    NameValidation,
    BookingValidation,
    StandardService,
}

/// Boolean qualification milestones persisted on a contact.
///
/// Milestones are monotonic: this engine only ever sets them true.
/// Resetting a funnel is an administrative action outside this core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelFlags {
    pub greeted: bool,
    pub summary_requested: bool,
    pub summary_confirmed: bool,
    pub urgency_resolved: bool,
    pub scheduling_offered: bool,
    pub booking_offered: bool,
    pub booking_confirmed: bool,
}

/// Names of the individual funnel milestones, for patch-style updates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum FunnelFlag {
    Greeted,
    SummaryRequested,
    SummaryConfirmed,
    UrgencyResolved,
    SchedulingOffered,
    BookingOffered,
    BookingConfirmed,
}

impl FunnelFlags {
    /// Sets the named milestone to true.
    pub fn set(&mut self, flag: FunnelFlag) {
        match flag {
            FunnelFlag::Greeted => self.greeted = true,
            FunnelFlag::SummaryRequested => self.summary_requested = true,
            FunnelFlag::SummaryConfirmed => self.summary_confirmed = true,
            FunnelFlag::UrgencyResolved => self.urgency_resolved = true,
            FunnelFlag::SchedulingOffered => self.scheduling_offered = true,
            FunnelFlag::BookingOffered => self.booking_offered = true,
            FunnelFlag::BookingConfirmed => self.booking_confirmed = true,
        }
    }

    /// Reads the named milestone.
    pub fn get(&self, flag: FunnelFlag) -> bool {
        match flag {
            FunnelFlag::Greeted => self.greeted,
            FunnelFlag::SummaryRequested => self.summary_requested,
            FunnelFlag::SummaryConfirmed => self.summary_confirmed,
            FunnelFlag::UrgencyResolved => self.urgency_resolved,
            FunnelFlag::SchedulingOffered => self.scheduling_offered,
            FunnelFlag::BookingOffered => self.booking_offered,
            FunnelFlag::BookingConfirmed => self.booking_confirmed,
        }
    }
}

/// The product a contact has shown interest in, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductInterest {
    /// No interest recorded yet.
    #[default]
    Unset,
    /// The contact was probed but no concrete product could be determined.
    Unknown,
    /// A concrete product name.
    Named(String),
}

/// A CRM contact as seen by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub channel: ChannelKind,
    /// Channel address: phone number or platform handle.
    pub address: String,
    pub display_name: String,
    pub flags: FunnelFlags,
    pub interest_product: ProductInterest,
    pub case_summary: Option<String>,
    pub case_info: Option<String>,
    /// Last inbound text, kept for freshness display. Never used for ordering.
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// Inbound, from the contact.
    Contact,
    /// Outbound, from this system.
    Assistant,
}

/// Payload kind of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Text,
    Media,
    Other,
}

/// One entry in a contact's append-only message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub kind: MessageKind,
}

/// Partial update applied to a contact after a successful reply.
///
/// Empty by default; the orchestrator stages flag transitions and extracted
/// fields here and commits the whole patch in one repository call.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub flags: Vec<FunnelFlag>,
    pub display_name: Option<String>,
    pub interest_product: Option<ProductInterest>,
    pub case_summary: Option<String>,
    pub case_info: Option<String>,
}

impl ContactPatch {
    /// True when the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
            && self.display_name.is_none()
            && self.interest_product.is_none()
            && self.case_summary.is_none()
            && self.case_info.is_none()
    }
}

/// The active behavior document: persona plus per-stage instructions.
///
/// Read-only to this engine; exactly one document is active at a time.
#[derive(Debug, Clone)]
pub struct BehaviorDocument {
    /// Persona and ground rules prepended to every prompt.
    pub base_prompt: String,
    /// Free-text instructions per stage.
    pub stage_instructions: HashMap<Stage, String>,
}

impl BehaviorDocument {
    /// Instructions for a stage, if the document defines any.
    pub fn instructions_for(&self, stage: Stage) -> Option<&str> {
        self.stage_instructions.get(&stage).map(String::as_str)
    }
}

/// A single request to the text-generation backend.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub prompt: String,
    /// Optional JSON schema the backend should constrain its output to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
}

/// Raw response from the text-generation backend.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn stage_labels_round_trip() {
        for stage in Stage::iter() {
            let label = stage.to_string();
            let parsed = Stage::from_str(&label).expect("label should parse back");
            assert_eq!(stage, parsed);
        }
    }

    #[test]
    fn funnel_flags_default_all_false() {
        let flags = FunnelFlags::default();
        for flag in FunnelFlag::iter() {
            assert!(!flags.get(flag), "{flag} should default to false");
        }
    }

    #[test]
    fn funnel_flags_set_get_round_trip() {
        for flag in FunnelFlag::iter() {
            let mut flags = FunnelFlags::default();
            flags.set(flag);
            assert!(flags.get(flag), "{flag} should read back true after set");
            // Setting one flag must not touch the others.
            for other in FunnelFlag::iter().filter(|f| *f != flag) {
                assert!(!flags.get(other), "{other} should stay false");
            }
        }
    }

    #[test]
    fn contact_patch_default_is_empty() {
        assert!(ContactPatch::default().is_empty());

        let patch = ContactPatch {
            flags: vec![FunnelFlag::Greeted],
            ..ContactPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn product_interest_defaults_to_unset() {
        assert_eq!(ProductInterest::default(), ProductInterest::Unset);
    }

    #[test]
    fn model_request_format_omitted_when_none() {
        let request = ModelRequest {
            model: "test-model".into(),
            prompt: "hello".into(),
            format: None,
        };
        let json = serde_json::to_value(&request).expect("should serialize");
        assert!(json.get("format").is_none());
    }
}
