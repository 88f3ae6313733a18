// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static behavior and context sources for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use strum::IntoEnumIterator;

use qualia_core::types::{BehaviorDocument, Contact, Stage};
use qualia_core::{BehaviorSource, ContextSource, QualiaError};

/// A behavior source serving one fixed document.
pub struct StaticBehavior {
    document: BehaviorDocument,
}

impl StaticBehavior {
    /// Wraps an explicit document.
    pub fn new(document: BehaviorDocument) -> Self {
        Self { document }
    }

    /// A demo document with an instruction line for every stage.
    pub fn demo() -> Self {
        let mut stage_instructions = HashMap::new();
        for stage in Stage::iter() {
            stage_instructions.insert(stage, format!("Demo instructions for stage {stage}."));
        }
        Self::new(BehaviorDocument {
            base_prompt: "You are a helpful sales assistant for a demo business.".to_string(),
            stage_instructions,
        })
    }
}

#[async_trait]
impl BehaviorSource for StaticBehavior {
    async fn active_document(&self) -> Result<BehaviorDocument, QualiaError> {
        Ok(self.document.clone())
    }
}

/// A context source returning the same snippet for every stage.
pub struct StaticContext {
    context: Option<String>,
}

impl StaticContext {
    /// Always returns `context` (or nothing, when `None`).
    pub fn new(context: Option<String>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ContextSource for StaticContext {
    async fn stage_context(
        &self,
        _contact: &Contact,
        _stage: Stage,
    ) -> Result<Option<String>, QualiaError> {
        Ok(self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qualia_core::types::{ChannelKind, ContactId, FunnelFlags, ProductInterest};

    fn contact_stub() -> Contact {
        Contact {
            id: ContactId("c1".to_string()),
            channel: ChannelKind::WhatsApp,
            address: String::new(),
            display_name: String::new(),
            flags: FunnelFlags::default(),
            interest_product: ProductInterest::Unset,
            case_summary: None,
            case_info: None,
            last_message: None,
            last_message_at: None,
        }
    }

    #[tokio::test]
    async fn demo_document_covers_every_stage() {
        let behavior = StaticBehavior::demo();
        let document = behavior.active_document().await.unwrap();
        for stage in Stage::iter() {
            assert!(
                document.instructions_for(stage).is_some(),
                "{stage} missing from demo document"
            );
        }
    }

    #[tokio::test]
    async fn static_context_returns_configured_snippet() {
        let source = StaticContext::new(Some("Slots: Mon 10:00, Tue 14:00".to_string()));
        let context = source
            .stage_context(&contact_stub(), Stage::NameValidation)
            .await
            .unwrap();
        assert_eq!(context.as_deref(), Some("Slots: Mon 10:00, Tue 14:00"));

        let empty = StaticContext::new(None);
        let context = empty
            .stage_context(&contact_stub(), Stage::NameValidation)
            .await
            .unwrap();
        assert!(context.is_none());
    }
}
