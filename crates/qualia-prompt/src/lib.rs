// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly and structured-response extraction.
//!
//! The two pure halves of a model exchange: [`assembler::build_prompt`]
//! turns a behavior document, a resolved stage, and conversation history
//! into the final prompt string; [`extract::extract`] recovers the typed
//! JSON answer the stage expects from the model's free-text output.

pub mod assembler;
pub mod extract;
pub mod shape;

pub use assembler::{build_prompt, HISTORY_CAP};
pub use extract::{extract, Extracted};
pub use shape::{FieldKind, FieldSpec, ResponseShape, StageResponse};
