// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Qualia unit and integration tests.
//!
//! In-memory implementations of every collaborator trait: a repository
//! with real dedup/cap/ordering semantics, a scripted model, a recording
//! delivery sink, and static behavior/context sources.

pub mod behavior;
pub mod mock_delivery;
pub mod mock_model;
pub mod mock_repository;

pub use behavior::{StaticBehavior, StaticContext};
pub use mock_delivery::{DeliveredReply, RecordingDelivery};
pub use mock_model::ScriptedModel;
pub use mock_repository::InMemoryRepository;
