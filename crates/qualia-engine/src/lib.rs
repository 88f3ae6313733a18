// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for Qualia.
//!
//! The engine is the orchestration core between webhook ingestion and
//! outbound delivery:
//! - [`debounce::MessageDebouncer`] coalesces rapid inbound bursts into a
//!   single job per conversation
//! - [`funnel::resolve_stage`] decides which stage prompt a contact's
//!   milestones call for next
//! - [`orchestrator::Orchestrator`] runs the fired job: prompt assembly,
//!   model invocation, structured extraction, delivery, and the atomic
//!   flag commit

pub mod debounce;
pub mod funnel;
pub mod orchestrator;

pub use debounce::{DebounceKey, DebouncePending, MessageDebouncer, DEFAULT_DEBOUNCE};
pub use funnel::{resolve_stage, StageDecision};
pub use orchestrator::{EngineOutcome, Orchestrator};
