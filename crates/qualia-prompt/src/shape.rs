// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-stage response shapes.
//!
//! Every stage prompt instructs the model to answer with a single JSON
//! object, but different stages expect different fields. [`ResponseShape`]
//! is the closed table of those expectations: which fields are required,
//! what the matching JSON schema looks like, and how a parsed object decodes
//! into the [`StageResponse`] tagged union.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use qualia_core::types::Stage;
use qualia_core::QualiaError;

/// JSON type of a response field, for prompt text and schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
}

impl FieldKind {
    fn schema_type(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
        }
    }
}

/// One required field of a response shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// The JSON object shape a stage expects back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Plain conversational turn: `suggestedStage` + `reply`.
    Conversational,
    /// Candidate case summary plus the reply that presents it.
    SummaryDraft,
    /// Accept-or-reject verdict on a candidate summary.
    SummaryDecision,
    /// Compound incorporation verdict: interest, product, switch, reply.
    SummaryIncorporation,
    /// Urgency verdict plus reply.
    Urgency,
    /// Extracted contact name plus reply.
    Name,
    /// Whether to create a booking, plus reply.
    Booking,
}

impl ResponseShape {
    /// The shape a given stage's prompt asks for.
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::NewContact | Stage::TriageInProgress | Stage::StandardService => {
                ResponseShape::Conversational
            }
            Stage::SummaryVerifier => ResponseShape::SummaryDraft,
            Stage::SummaryValidation => ResponseShape::SummaryDecision,
            Stage::SummaryIncorporationValidation => ResponseShape::SummaryIncorporation,
            Stage::UrgencyValidation => ResponseShape::Urgency,
            Stage::NameValidation => ResponseShape::Name,
            Stage::BookingValidation => ResponseShape::Booking,
        }
    }

    /// Required fields, in the order they are listed in the prompt.
    pub fn fields(&self) -> &'static [FieldSpec] {
        const CONVERSATIONAL: &[FieldSpec] = &[
            field("suggestedStage", FieldKind::String),
            field("reply", FieldKind::String),
        ];
        const SUMMARY_DRAFT: &[FieldSpec] = &[
            field("summary", FieldKind::String),
            field("reply", FieldKind::String),
        ];
        const SUMMARY_DECISION: &[FieldSpec] = &[field("switch", FieldKind::Boolean)];
        const SUMMARY_INCORPORATION: &[FieldSpec] = &[
            field("interest", FieldKind::Boolean),
            field("product", FieldKind::String),
            field("switch", FieldKind::Boolean),
            field("reply", FieldKind::String),
        ];
        const URGENCY: &[FieldSpec] = &[
            field("urgent", FieldKind::Boolean),
            field("reply", FieldKind::String),
        ];
        const NAME: &[FieldSpec] = &[
            field("name", FieldKind::String),
            field("reply", FieldKind::String),
        ];
        const BOOKING: &[FieldSpec] = &[
            field("book", FieldKind::Boolean),
            field("reply", FieldKind::String),
        ];
        match self {
            ResponseShape::Conversational => CONVERSATIONAL,
            ResponseShape::SummaryDraft => SUMMARY_DRAFT,
            ResponseShape::SummaryDecision => SUMMARY_DECISION,
            ResponseShape::SummaryIncorporation => SUMMARY_INCORPORATION,
            ResponseShape::Urgency => URGENCY,
            ResponseShape::Name => NAME,
            ResponseShape::Booking => BOOKING,
        }
    }

    /// Names of the required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields().iter().map(|f| f.name)
    }

    /// Whether a response of this shape carries a user-facing `reply` that
    /// can fall back to raw model text when extraction fails.
    pub fn is_reply_only(&self) -> bool {
        matches!(self, ResponseShape::Conversational)
    }

    /// JSON schema for backend-constrained decoding of this shape.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for spec in self.fields() {
            properties.insert(
                spec.name.to_string(),
                json!({ "type": spec.kind.schema_type() }),
            );
        }
        let required: Vec<&str> = self.fields().iter().map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Decodes a parsed JSON object into this shape's response variant.
    ///
    /// Callers have already checked field presence; this enforces field
    /// types, tolerating `"true"`/`"false"` strings where a boolean is
    /// expected.
    pub fn decode(&self, map: &Map<String, Value>) -> Result<StageResponse, QualiaError> {
        match self {
            ResponseShape::Conversational => Ok(StageResponse::Conversational {
                suggested_stage: str_field(map, "suggestedStage")
                    .ok()
                    .and_then(|s| Stage::from_str(s).ok()),
                reply: str_field(map, "reply")?.to_string(),
            }),
            ResponseShape::SummaryDraft => Ok(StageResponse::SummaryDraft {
                summary: str_field(map, "summary")?.to_string(),
                reply: str_field(map, "reply")?.to_string(),
            }),
            ResponseShape::SummaryDecision => Ok(StageResponse::SummaryDecision {
                accepted: bool_field(map, "switch")?,
            }),
            ResponseShape::SummaryIncorporation => Ok(StageResponse::SummaryIncorporation {
                interest: bool_field(map, "interest")?,
                product: str_field(map, "product").ok().and_then(non_empty),
                switch_product: bool_field(map, "switch")?,
                reply: str_field(map, "reply")?.to_string(),
            }),
            ResponseShape::Urgency => Ok(StageResponse::Urgency {
                urgent: bool_field(map, "urgent")?,
                reply: str_field(map, "reply")?.to_string(),
            }),
            ResponseShape::Name => Ok(StageResponse::Name {
                name: str_field(map, "name")?.to_string(),
                reply: str_field(map, "reply")?.to_string(),
            }),
            ResponseShape::Booking => Ok(StageResponse::Booking {
                book: bool_field(map, "book")?,
                reply: str_field(map, "reply")?.to_string(),
            }),
        }
    }
}

/// A stage response decoded into its expected variant.
#[derive(Debug, Clone, PartialEq)]
pub enum StageResponse {
    Conversational {
        /// The stage the model proposes next. Unknown labels decode to None.
        suggested_stage: Option<Stage>,
        reply: String,
    },
    SummaryDraft {
        summary: String,
        reply: String,
    },
    SummaryDecision {
        accepted: bool,
    },
    SummaryIncorporation {
        interest: bool,
        product: Option<String>,
        switch_product: bool,
        reply: String,
    },
    Urgency {
        urgent: bool,
        reply: String,
    },
    Name {
        name: String,
        reply: String,
    },
    Booking {
        book: bool,
        reply: String,
    },
}

impl StageResponse {
    /// The user-facing reply carried by this response, if the variant has one.
    pub fn reply(&self) -> Option<&str> {
        match self {
            StageResponse::Conversational { reply, .. }
            | StageResponse::SummaryDraft { reply, .. }
            | StageResponse::SummaryIncorporation { reply, .. }
            | StageResponse::Urgency { reply, .. }
            | StageResponse::Name { reply, .. }
            | StageResponse::Booking { reply, .. } => Some(reply),
            StageResponse::SummaryDecision { .. } => None,
        }
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, name: &str) -> Result<&'a str, QualiaError> {
    map.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| QualiaError::malformed(format!("field `{name}` is not a string")))
}

fn bool_field(map: &Map<String, Value>, name: &str) -> Result<bool, QualiaError> {
    match map.get(name) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(QualiaError::malformed(format!(
            "field `{name}` is not a boolean"
        ))),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
