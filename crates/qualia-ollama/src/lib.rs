// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama backend for the Qualia conversation engine.
//!
//! Implements the [`qualia_core::LanguageModel`] trait over the Ollama
//! non-streaming generate endpoint.

pub mod client;
pub mod types;

pub use client::OllamaClient;
