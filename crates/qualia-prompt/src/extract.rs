// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured-response extraction from free-text model output.
//!
//! Models answer over an unreliable free-text channel: the JSON object we
//! asked for may arrive wrapped in markdown fences, prefixed with prose, or
//! not at all. [`extract`] locates the first balanced `{...}` region
//! (preferring the inside of a fenced code block), parses it strictly, and
//! validates it against the stage's [`ResponseShape`]. All failures are
//! typed [`QualiaError::MalformedResponse`] values; nothing here panics on
//! any input.

use serde_json::{Map, Value};

use qualia_core::QualiaError;

use crate::shape::{ResponseShape, StageResponse};

/// A successfully extracted stage response.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// The response decoded into the stage's expected variant.
    pub response: StageResponse,
    /// The full parsed object, extra fields preserved verbatim.
    pub fields: Map<String, Value>,
}

/// Extracts and validates a stage response from raw model output.
///
/// Steps: trim, locate the first balanced `{...}` region (inside the first
/// fenced code block when one exists, anywhere otherwise), parse with
/// serde_json, check that every required field of `shape` is present, and
/// decode into the shape's variant.
pub fn extract(raw: &str, shape: ResponseShape) -> Result<Extracted, QualiaError> {
    let trimmed = raw.trim();

    let region = fenced_object(trimmed)
        .or_else(|| balanced_object(trimmed))
        .ok_or_else(|| QualiaError::malformed("no JSON object found in model output"))?;

    let value: Value = serde_json::from_str(region)
        .map_err(|e| QualiaError::malformed(format!("invalid JSON: {e}")))?;
    let map = match value {
        Value::Object(map) => map,
        _ => return Err(QualiaError::malformed("top-level JSON value is not an object")),
    };

    for name in shape.required_fields() {
        if !map.contains_key(name) {
            return Err(QualiaError::malformed(format!(
                "required field `{name}` is missing"
            )));
        }
    }

    let response = shape.decode(&map)?;
    Ok(Extracted {
        response,
        fields: map,
    })
}

/// First balanced object inside the first fenced code block, if any.
///
/// Handles both tagged (```json) and untagged fences; an unterminated fence
/// is scanned to end of input.
fn fenced_object(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip the optional language tag line.
    let body = match after.find('\n') {
        Some(i) if !after[..i].contains('{') => &after[i + 1..],
        _ => after,
    };
    let end = body.find("```").unwrap_or(body.len());
    balanced_object(&body[..end])
}

/// First balanced `{...}` region in `text`, string- and escape-aware.
///
/// Braces inside JSON string literals do not affect nesting depth.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
