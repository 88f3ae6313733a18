// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply orchestration: the debounced job that turns a coalesced message
//! burst into one model-backed reply.
//!
//! Sequence per fired job: fetch contact -> resolve stage -> assemble
//! prompt(s) -> invoke model -> extract the structured answer -> deliver
//! the reply -> commit the contact patch. Flag milestones are committed
//! only after extraction AND delivery both succeed; any transport failure
//! aborts the job with nothing written, and the next inbound message
//! re-arms the funnel from the unchanged persisted flags.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use qualia_config::model::QualiaConfig;
use qualia_core::types::{
    BehaviorDocument, ChannelKind, Contact, ContactId, ContactPatch, ConversationMessage,
    MessageId, MessageKind, ModelRequest, ProductInterest, Sender, Stage,
};
use qualia_core::{
    BehaviorSource, ContextSource, ConversationRepository, LanguageModel, QualiaError,
    ReplyDelivery,
};
use qualia_prompt::{build_prompt, extract, Extracted, ResponseShape, StageResponse};

use crate::debounce::{DebounceKey, MessageDebouncer};
use crate::funnel::{resolve_stage, StageDecision};

/// Result of one fired orchestrator job.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// A reply was extracted, delivered, and the contact patch committed.
    Replied {
        stage: Stage,
        reply: String,
        /// True when a terminal booking validation decided a booking should
        /// be created; acting on it is the external booking collaborator's
        /// job.
        booking_requested: bool,
    },
    /// No funnel rule matched the contact's milestones; no model call made.
    NoStage,
    /// A validation stage returned output missing a mandatory field; the
    /// batch was dropped without committing anything.
    DiscardedMalformed { stage: Stage },
}

/// Steps of the verify-then-validate chain run for compound stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainStep {
    AwaitingVerification,
    AwaitingValidation,
    Committed,
    Rejected,
}

/// Coordinates the debouncer, the stage funnel, prompt assembly, the model
/// backend, and outbound delivery for every contact.
///
/// Cheap to clone; all collaborators are shared behind `Arc`s, including
/// the debounce registry.
#[derive(Clone)]
pub struct Orchestrator {
    repository: Arc<dyn ConversationRepository + Send + Sync>,
    behavior: Arc<dyn BehaviorSource + Send + Sync>,
    model: Arc<dyn LanguageModel + Send + Sync>,
    delivery: Arc<dyn ReplyDelivery + Send + Sync>,
    context: Option<Arc<dyn ContextSource + Send + Sync>>,
    debouncer: Arc<MessageDebouncer>,
    config: QualiaConfig,
}

impl Orchestrator {
    /// Creates a new orchestrator with its own debounce registry.
    pub fn new(
        repository: Arc<dyn ConversationRepository + Send + Sync>,
        behavior: Arc<dyn BehaviorSource + Send + Sync>,
        model: Arc<dyn LanguageModel + Send + Sync>,
        delivery: Arc<dyn ReplyDelivery + Send + Sync>,
        config: QualiaConfig,
    ) -> Self {
        Self {
            repository,
            behavior,
            model,
            delivery,
            context: None,
            debouncer: Arc::new(MessageDebouncer::new()),
            config,
        }
    }

    /// Attaches an optional context source for stage-specific prompt
    /// enrichment.
    pub fn with_context_source(
        mut self,
        context: Arc<dyn ContextSource + Send + Sync>,
    ) -> Self {
        self.context = Some(context);
        self
    }

    /// The debounce registry, for host-level peek/cancel.
    pub fn debouncer(&self) -> &MessageDebouncer {
        &self.debouncer
    }

    /// Handles one inbound message: persists it and (re)arms the debounce
    /// timer for the contact's conversation.
    ///
    /// The scheduled job captures this message as the current message, so
    /// for a burst the last message is the one the prompt centers on.
    pub async fn on_inbound(
        &self,
        contact_id: ContactId,
        channel: ChannelKind,
        message: ConversationMessage,
    ) -> Result<(), QualiaError> {
        self.repository
            .append_message(&contact_id, message.clone())
            .await?;

        let key = DebounceKey {
            contact: contact_id.clone(),
            channel,
        };
        let delay = Duration::from_millis(self.config.engine.debounce_ms);
        let this = self.clone();

        self.debouncer
            .schedule_after(key, delay, move || async move {
                this.process(contact_id, channel, message).await.map(|_| ())
            })
            .await;

        Ok(())
    }

    /// Runs the full pipeline for one coalesced burst.
    ///
    /// `current` is the triggering message; history is re-read from the
    /// repository so the job always sees the state at fire time, not at
    /// schedule time.
    pub async fn process(
        &self,
        contact_id: ContactId,
        channel: ChannelKind,
        current: ConversationMessage,
    ) -> Result<EngineOutcome, QualiaError> {
        let contact = self.repository.contact(&contact_id).await?;

        let Some(decision) = resolve_stage(&contact.flags) else {
            warn!(
                contact = %contact_id.0,
                flags = ?contact.flags,
                "no stage matches this contact's milestones; skipping model call"
            );
            return Ok(EngineOutcome::NoStage);
        };

        debug!(
            contact = %contact_id.0,
            channel = %channel,
            stage = %decision.stage,
            "stage resolved"
        );

        let doc = self.behavior.active_document().await?;
        let mut history = self
            .repository
            .recent_messages(&contact_id, self.config.engine.history_limit)
            .await?;
        // The triggering message is the current message, not history.
        if history.last().is_some_and(|m| m.id == current.id) {
            history.pop();
        }

        let mut patch = ContactPatch::default();
        let mut booking_requested = false;

        let reply = if let Some(validation_stage) = decision.chained_validation {
            self.run_summary_chain(
                &contact,
                &doc,
                &history,
                &current,
                decision,
                validation_stage,
                &mut patch,
            )
            .await?
        } else {
            self.run_single_stage(
                &contact,
                &doc,
                &history,
                &current,
                decision,
                &mut patch,
                &mut booking_requested,
            )
            .await?
        };

        let Some(reply) = reply else {
            return Ok(EngineOutcome::DiscardedMalformed {
                stage: decision.stage,
            });
        };

        self.delivery
            .deliver_reply(&contact_id, channel, &reply)
            .await?;

        // Extraction and delivery both succeeded; now, and only now,
        // record the outbound message and commit the staged patch.
        let outbound = ConversationMessage {
            id: MessageId(Uuid::new_v4().to_string()),
            text: reply.clone(),
            timestamp: Utc::now(),
            sender: Sender::Assistant,
            kind: MessageKind::Text,
        };
        self.repository.append_message(&contact_id, outbound).await?;
        if !patch.is_empty() {
            self.repository.update_contact(&contact_id, patch).await?;
        }

        info!(
            contact = %contact_id.0,
            channel = %channel,
            stage = %decision.stage,
            booking_requested = booking_requested,
            "reply delivered"
        );

        Ok(EngineOutcome::Replied {
            stage: decision.stage,
            reply,
            booking_requested,
        })
    }

    /// One model call for a non-chained stage, applying the stage's
    /// extracted fields to the patch. Returns the reply to deliver, or
    /// `None` when the batch must be dropped.
    #[allow(clippy::too_many_arguments)]
    async fn run_single_stage(
        &self,
        contact: &Contact,
        doc: &BehaviorDocument,
        history: &[ConversationMessage],
        current: &ConversationMessage,
        decision: StageDecision,
        patch: &mut ContactPatch,
        booking_requested: &mut bool,
    ) -> Result<Option<String>, QualiaError> {
        let stage = decision.stage;
        let shape = ResponseShape::for_stage(stage);
        let extra = self.stage_context(contact, stage).await?;

        let (raw, extracted) = self
            .invoke_stage(doc, stage, history, current, extra.as_deref())
            .await?;

        let response = match extracted {
            Ok(Extracted { response, .. }) => response,
            Err(e) if shape.is_reply_only() => {
                // Documented fallback: for plain conversational stages the
                // whole raw text serves as the reply.
                warn!(
                    stage = %stage,
                    error = %e,
                    "model output not parseable; using raw text as reply"
                );
                if let Some(flag) = decision.commit {
                    patch.flags.push(flag);
                }
                return Ok(Some(raw.trim().to_string()));
            }
            Err(e) => {
                warn!(
                    stage = %stage,
                    error = %e,
                    "validation stage returned malformed output; dropping batch"
                );
                return Ok(None);
            }
        };

        if let Some(flag) = decision.commit {
            patch.flags.push(flag);
        }

        let reply = match response {
            StageResponse::Conversational {
                suggested_stage,
                reply,
            } => {
                if let Some(suggested) = suggested_stage {
                    debug!(stage = %stage, suggested = %suggested, "model suggested next stage");
                }
                reply
            }
            StageResponse::Urgency { urgent, reply } => {
                patch.case_info = Some(format!(
                    "urgency: {}",
                    if urgent { "high" } else { "normal" }
                ));
                reply
            }
            StageResponse::Name { name, reply } => {
                let name = name.trim();
                if !name.is_empty() {
                    patch.display_name = Some(name.to_string());
                }
                reply
            }
            StageResponse::SummaryIncorporation {
                interest,
                product,
                switch_product,
                reply,
            } => {
                let new_interest = if interest {
                    product
                        .map(ProductInterest::Named)
                        .unwrap_or(ProductInterest::Unknown)
                } else {
                    ProductInterest::Unknown
                };
                // An already-named interest is only replaced when the model
                // says the contact wants to switch.
                let keep_existing = matches!(contact.interest_product, ProductInterest::Named(_))
                    && !switch_product;
                if !keep_existing {
                    patch.interest_product = Some(new_interest);
                }
                reply
            }
            StageResponse::Booking { book, reply } => {
                *booking_requested = book;
                reply
            }
            StageResponse::SummaryDraft { .. } | StageResponse::SummaryDecision { .. } => {
                return Err(QualiaError::Internal(
                    "verifier stages must run through the validation chain".into(),
                ));
            }
        };

        Ok(Some(reply))
    }

    /// The explicit two-step chain for compound stages: a verifier prompt
    /// produces a candidate value, then a distinct validation prompt
    /// decides whether to accept it and advance the milestone. The reply is
    /// sent either way; only acceptance commits.
    #[allow(clippy::too_many_arguments)]
    async fn run_summary_chain(
        &self,
        contact: &Contact,
        doc: &BehaviorDocument,
        history: &[ConversationMessage],
        current: &ConversationMessage,
        decision: StageDecision,
        validation_stage: Stage,
        patch: &mut ContactPatch,
    ) -> Result<Option<String>, QualiaError> {
        let mut step = ChainStep::AwaitingVerification;
        let mut summary = String::new();
        let mut reply = String::new();

        loop {
            match step {
                ChainStep::AwaitingVerification => {
                    let extra = self.stage_context(contact, decision.stage).await?;
                    let (_, extracted) = self
                        .invoke_stage(doc, decision.stage, history, current, extra.as_deref())
                        .await?;
                    match extracted {
                        Ok(Extracted {
                            response: StageResponse::SummaryDraft { summary: s, reply: r },
                            ..
                        }) => {
                            summary = s;
                            reply = r;
                            step = ChainStep::AwaitingValidation;
                        }
                        Ok(_) => {
                            return Err(QualiaError::Internal(
                                "verifier stage decoded into an unexpected shape".into(),
                            ));
                        }
                        Err(e) => {
                            warn!(
                                stage = %decision.stage,
                                error = %e,
                                "summary verifier returned malformed output; dropping batch"
                            );
                            return Ok(None);
                        }
                    }
                }
                ChainStep::AwaitingValidation => {
                    let candidate = format!("Candidate case summary under review:\n{summary}");
                    let (_, extracted) = self
                        .invoke_stage(doc, validation_stage, history, current, Some(&candidate))
                        .await?;
                    match extracted {
                        Ok(Extracted {
                            response: StageResponse::SummaryDecision { accepted },
                            ..
                        }) => {
                            step = if accepted {
                                ChainStep::Committed
                            } else {
                                ChainStep::Rejected
                            };
                        }
                        Ok(_) => {
                            return Err(QualiaError::Internal(
                                "validation stage decoded into an unexpected shape".into(),
                            ));
                        }
                        Err(e) => {
                            warn!(
                                stage = %validation_stage,
                                error = %e,
                                "summary validation returned malformed output; dropping batch"
                            );
                            return Ok(None);
                        }
                    }
                }
                ChainStep::Committed => {
                    if let Some(flag) = decision.commit {
                        patch.flags.push(flag);
                    }
                    patch.case_summary = Some(summary);
                    return Ok(Some(reply));
                }
                ChainStep::Rejected => {
                    debug!(
                        stage = %decision.stage,
                        "candidate summary rejected; replying without advancing"
                    );
                    return Ok(Some(reply));
                }
            }
        }
    }

    /// One model round for a stage: assemble the prompt, invoke the
    /// backend, attempt extraction. Transport errors propagate; extraction
    /// errors are returned for the caller to interpret per stage.
    async fn invoke_stage(
        &self,
        doc: &BehaviorDocument,
        stage: Stage,
        history: &[ConversationMessage],
        current: &ConversationMessage,
        extra_context: Option<&str>,
    ) -> Result<(String, Result<Extracted, QualiaError>), QualiaError> {
        let shape = ResponseShape::for_stage(stage);
        let prompt = build_prompt(doc, stage, shape, history, current, extra_context);
        let format = self
            .config
            .ollama
            .constrained_decoding
            .then(|| shape.json_schema());

        let response = self
            .model
            .complete(ModelRequest {
                model: self.config.ollama.model.clone(),
                prompt,
                format,
            })
            .await?;

        let extracted = extract(&response.text, shape);
        Ok((response.text, extracted))
    }

    async fn stage_context(
        &self,
        contact: &Contact,
        stage: Stage,
    ) -> Result<Option<String>, QualiaError> {
        match &self.context {
            Some(source) => source.stage_context(contact, stage).await,
            None => Ok(None),
        }
    }
}
