// ABOUTME: Main library entry point for the Nourish personalization engine
// ABOUTME: Wires the personalization algorithms to injected storage and candidate lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nourish Engine
//!
//! Personalization for a nutrition-tracking application. The engine learns eating
//! preferences from logged meals, ranks candidate foods, generates improvement
//! challenges from behavioral gaps and tracks challenge progress as meals arrive.
//!
//! ## Architecture
//!
//! - **nourish-core**: domain models, `EngineError`, tuning constants
//! - **nourish-intelligence**: pure learner, analyzer, scorer, generator, tracker
//! - **this crate**: the async [`engine::PersonalizationEngine`] facade, storage
//!   traits with an in-memory implementation, candidate lookup with timeout
//!   fallback, logging setup and dataset replay
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nourish_engine::candidates::StaticCandidateSource;
//! use nourish_engine::engine::PersonalizationEngine;
//! use nourish_engine::storage::memory::InMemoryStore;
//!
//! # async fn run() {
//! let store = Arc::new(InMemoryStore::new());
//! let source = Arc::new(StaticCandidateSource::new(Vec::new()));
//! let engine = PersonalizationEngine::new(store, source);
//! let user_id = uuid::Uuid::new_v4();
//! let challenges = engine.generate_challenges(user_id).await;
//! # let _ = challenges;
//! # }
//! ```

/// Candidate food lookup with bounded timeouts and last-good fallback
pub mod candidates;

/// Engine runtime configuration from environment
pub mod config;

/// The personalization facade
pub mod engine;

/// Logging configuration and structured logging setup
pub mod logging;

/// JSON dataset replay through the engine
pub mod replay;

/// Storage seams and the in-memory implementation
pub mod storage;

pub use nourish_core::errors::{AppResult, EngineError, ErrorCode};
pub use nourish_core::models;
pub use nourish_intelligence::PersonalizationConfig;
