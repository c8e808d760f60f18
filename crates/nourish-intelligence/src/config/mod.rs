// ABOUTME: Configuration module for nourish-intelligence crate
// ABOUTME: Re-exports personalization configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Personalization configuration (learning, scoring, challenges, tracking)
pub mod intelligence;

pub use intelligence::PersonalizationConfig;
