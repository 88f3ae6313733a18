// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic prompt assembly for stage prompts.
//!
//! A prompt is a single string built in fixed section order: persona,
//! stage instructions, output-contract block, history, current message,
//! optional extra context. The assembler performs no I/O and is
//! referentially transparent: identical inputs yield a byte-identical
//! string, which keeps it unit-testable in isolation.

use strum::IntoEnumIterator;

use qualia_core::types::{BehaviorDocument, ConversationMessage, Sender, Stage};

use crate::shape::{FieldKind, ResponseShape};

/// Maximum history entries a prompt renders. Truncation happens upstream in
/// the repository fetch; the assembler only trusts it.
pub const HISTORY_CAP: usize = 10;

/// Builds the full prompt for one stage invocation.
pub fn build_prompt(
    doc: &BehaviorDocument,
    stage: Stage,
    shape: ResponseShape,
    history: &[ConversationMessage],
    current: &ConversationMessage,
    extra_context: Option<&str>,
) -> String {
    debug_assert!(
        history.len() <= HISTORY_CAP,
        "history must be pre-truncated to {HISTORY_CAP} entries"
    );

    let mut prompt = String::new();

    // 1. Persona and ground rules.
    prompt.push_str(doc.base_prompt.trim());
    prompt.push_str("\n\n");

    // 2. Stage instructions.
    prompt.push_str(&format!("## Expected behavior for stage {stage}\n"));
    prompt.push_str(doc.instructions_for(stage).unwrap_or("").trim());
    prompt.push_str("\n\n");

    // 3. Output contract: valid stage labels plus the exact JSON shape.
    prompt.push_str("## Output format\n");
    prompt.push_str("Stages you may suggest: ");
    let labels: Vec<String> = Stage::iter().map(|s| s.to_string()).collect();
    prompt.push_str(&labels.join(", "));
    prompt.push_str(".\n");
    prompt.push_str(
        "Answer with ONLY a JSON object, no prose before or after, containing exactly these fields: ",
    );
    prompt.push_str(&field_list(shape));
    prompt.push_str(".\n\n");

    // 4. History, most-recent-last.
    prompt.push_str("## Conversation so far\n");
    if history.is_empty() {
        prompt.push_str("(no prior messages)\n");
    } else {
        for message in history {
            prompt.push_str(&format!(
                "{}: {}\n",
                role_label(message.sender),
                message.text
            ));
        }
    }
    prompt.push('\n');

    // 5. The current message, labeled distinctly from history.
    prompt.push_str("## Current message from the contact\n");
    prompt.push_str(&current.text);
    prompt.push('\n');

    // 6. Optional extra context under its own label.
    if let Some(extra) = extra_context {
        prompt.push_str("\n## Additional context\n");
        prompt.push_str(extra.trim());
        prompt.push('\n');
    }

    sanitize(&prompt)
}

/// Human-readable field list for the output-contract block.
fn field_list(shape: ResponseShape) -> String {
    let parts: Vec<String> = shape
        .fields()
        .iter()
        .map(|f| {
            let kind = match f.kind {
                FieldKind::String => "string",
                FieldKind::Boolean => "boolean",
            };
            format!("\"{}\" ({kind})", f.name)
        })
        .collect();
    parts.join(", ")
}

fn role_label(sender: Sender) -> &'static str {
    match sender {
        Sender::Contact => "Contact",
        Sender::Assistant => "Assistant",
    }
}

/// Replaces control characters other than newline with spaces.
///
/// Inbound text arrives from webhooks and may carry carriage returns, tabs,
/// or worse; the prompt contract allows newlines only.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() && c != '\n' { ' ' } else { c })
        .collect()
}
