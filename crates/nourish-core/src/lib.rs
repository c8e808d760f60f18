// ABOUTME: Core types and constants for the Nourish personalization engine
// ABOUTME: Foundation crate with error handling, domain models, and tuning constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nourish Core
//!
//! Foundation crate providing shared types and constants for the Nourish
//! personalization engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `EngineError`, `ErrorCode` and the `AppResult` alias
//! - **constants**: Default tuning values organized by component
//! - **models**: Meal events, candidate foods, profiles, challenges and recommendations

/// Unified error handling with stable error codes
pub mod errors;

/// Default tuning values organized by component
pub mod constants;

/// Core data models (`MealEvent`, `PreferenceProfile`, `ChallengeDefinition`, etc.)
pub mod models;
