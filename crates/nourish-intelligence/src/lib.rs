// ABOUTME: Personalization algorithms for the Nourish engine
// ABOUTME: Preference learning, behavior analysis, candidate scoring, challenges and progress tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nourish Intelligence
//!
//! The synchronous engines behind the personalization facade. Every engine is a
//! plain struct holding its configuration section; none of them perform I/O.
//!
//! ## Modules
//!
//! - **config**: Validated configuration with environment overrides
//! - **`preference_learner`**: Meal history to `PreferenceProfile`
//! - **`behavior_analyzer`**: Meal history to `BehavioralAggregates`
//! - **`candidate_scorer`**: Ranks candidate foods against a profile
//! - **`challenge_generator`**: Behavioral gaps to challenge definitions
//! - **`progress_tracker`**: Idempotent challenge progress updates

/// Personalization configuration
pub mod config;

/// Behavioral metrics over a trailing window
pub mod behavior_analyzer;
/// Candidate food scoring and ranking
pub mod candidate_scorer;
/// Personalized challenge generation
pub mod challenge_generator;
/// Preference profile learning
pub mod preference_learner;
/// Challenge progress tracking
pub mod progress_tracker;

pub use behavior_analyzer::{BehaviorAnalyzer, BehavioralAggregates};
pub use candidate_scorer::CandidateScorer;
pub use challenge_generator::{ChallengeGenerator, DimensionGap};
pub use config::PersonalizationConfig;
pub use preference_learner::PreferenceLearner;
pub use progress_tracker::ProgressTracker;
