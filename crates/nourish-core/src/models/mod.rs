// ABOUTME: Core data models and types for the Nourish personalization engine
// ABOUTME: Re-exports MealEvent, CandidateItem, PreferenceProfile, challenge and recommendation types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! The data structures shared by every engine component.
//!
//! ## Design Principles
//!
//! - **Immutable inputs**: meal events and candidate foods are never mutated by the engine
//! - **Explicit semantics**: challenge kinds are tagged variants fixed at creation
//! - **Serializable**: all models round-trip through JSON for storage and replay
//!
//! ## Core Models
//!
//! - `MealEvent`: a single logged meal
//! - `CandidateItem`: a reference food that can be recommended
//! - `PreferenceProfile`: learned per-user preferences
//! - `ChallengeDefinition` / `ChallengeProgress`: challenges and their day-bucketed progress
//! - `Recommendation`: a scored candidate with its explanation

mod challenge;
mod event;
mod food;
mod profile;
mod recommendation;

// Meal events
pub use event::{ChallengeId, EventId, FoodId, MealEvent, MealType, Nutrient, Nutrients, UserId};

// Reference foods
pub use food::{CandidateFilter, CandidateItem, DietaryRestriction, HealthConstraint, HealthTag};

// Learned preferences
pub use profile::{ConfidenceBand, MacroRatio, PreferenceProfile};

// Challenges
pub use challenge::{
    AdherenceRule, ChallengeDefinition, ChallengeDifficulty, ChallengeDimension, ChallengeKind,
    ChallengeProgress, ChallengeProgressDelta, ChallengeStatus, DailyProgress,
};

// Recommendations
pub use recommendation::{
    Ranking, RankingOutcome, Recommendation, RecommendationContext, ScoreBreakdown, ScoreFactor,
};
