// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Qualia configuration system.

use qualia_config::load_config_from_str;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_qualia_config() {
    let toml = r#"
[engine]
debounce_ms = 5000
history_limit = 6
log_level = "debug"

[ollama]
base_url = "http://ollama.internal:11434"
model = "qwen2.5"
timeout_secs = 30
constrained_decoding = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.engine.debounce_ms, 5000);
    assert_eq!(config.engine.history_limit, 6);
    assert_eq!(config.engine.log_level, "debug");
    assert_eq!(config.ollama.base_url, "http://ollama.internal:11434");
    assert_eq!(config.ollama.model, "qwen2.5");
    assert_eq!(config.ollama.timeout_secs, 30);
    assert!(!config.ollama.constrained_decoding);
}

/// Empty input falls back to compiled defaults for every field.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should deserialize");
    assert_eq!(config.engine.debounce_ms, 10_000);
    assert_eq!(config.engine.history_limit, 10);
    assert_eq!(config.ollama.base_url, "http://localhost:11434");
    assert!(config.ollama.constrained_decoding);
}

/// A partial section keeps defaults for the fields it omits.
#[test]
fn partial_section_keeps_defaults() {
    let toml = r#"
[engine]
debounce_ms = 2500
"#;

    let config = load_config_from_str(toml).expect("partial TOML should deserialize");
    assert_eq!(config.engine.debounce_ms, 2500);
    assert_eq!(config.engine.history_limit, 10);
    assert_eq!(config.engine.log_level, "info");
}

/// Unknown keys are rejected rather than silently ignored.
#[test]
fn unknown_field_is_rejected() {
    let toml = r#"
[engine]
debounce_milliseconds = 5000
"#;

    let result = load_config_from_str(toml);
    assert!(result.is_err(), "unknown key should fail extraction");
}

/// Unknown sections are rejected as well.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "123:ABC"
"#;

    let result = load_config_from_str(toml);
    assert!(result.is_err(), "unknown section should fail extraction");
}
