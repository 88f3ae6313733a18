// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./qualia.toml` > `~/.config/qualia/qualia.toml`
//! > `/etc/qualia/qualia.toml` with environment variable overrides via the
//! `QUALIA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::QualiaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/qualia/qualia.toml` (system-wide)
/// 3. `~/.config/qualia/qualia.toml` (user XDG config)
/// 4. `./qualia.toml` (local directory)
/// 5. `QUALIA_*` environment variables
pub fn load_config() -> Result<QualiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QualiaConfig::default()))
        .merge(Toml::file("/etc/qualia/qualia.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("qualia/qualia.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("qualia.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<QualiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QualiaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QualiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QualiaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `QUALIA_ENGINE_DEBOUNCE_MS` must map to
/// `engine.debounce_ms`, not `engine.debounce.ms`.
fn env_provider() -> Env {
    Env::prefixed("QUALIA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("ollama_", "ollama.", 1);
        mapped.into()
    })
}
