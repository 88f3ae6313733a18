// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the conversation engine.
//!
//! Everything the engine talks to — persistence, behavior configuration,
//! outbound delivery, the model backend, contextual data — is consumed
//! through one of these narrow `#[async_trait]` interfaces.

pub mod behavior;
pub mod context;
pub mod delivery;
pub mod model;
pub mod repository;

// Re-export all traits at the traits module level for convenience.
pub use behavior::BehaviorSource;
pub use context::ContextSource;
pub use delivery::ReplyDelivery;
pub use model::LanguageModel;
pub use repository::ConversationRepository;
