// ABOUTME: Configuration management module for engine runtime settings
// ABOUTME: Algorithm tuning lives in nourish-intelligence; this module covers the async facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the Nourish engine
//!
//! - **Engine**: lookup and lock timeouts, save retries, profile cache age
//! - Algorithm tuning (weights, decay, benchmarks) is [`PersonalizationConfig`]

/// Engine runtime configuration
pub mod engine;

pub use engine::EngineConfig;
pub use nourish_intelligence::PersonalizationConfig;
