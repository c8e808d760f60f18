// ABOUTME: Configuration command for nourish-cli
// ABOUTME: Prints the validated personalization configuration and engine runtime settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use nourish_engine::config::{EngineConfig, PersonalizationConfig};
use serde_json::json;

use crate::helpers::display::print_json;

/// Print the effective configuration
///
/// Fails when `NOURISH_*` overrides do not validate, instead of silently
/// falling back to defaults as the engine does.
pub fn show(pretty: bool) -> Result<()> {
    let personalization = PersonalizationConfig::load()?;
    let engine = EngineConfig::from_env();
    print_json(
        &json!({
            "personalization": personalization,
            "engine": engine,
        }),
        pretty,
    )
}
