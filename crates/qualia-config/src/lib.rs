// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Qualia conversation engine.
//!
//! TOML files merged in XDG order with `QUALIA_*` environment overrides,
//! all sections optional with compiled defaults.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{EngineConfig, OllamaConfig, QualiaConfig};
