// ABOUTME: Candidate scoring configuration for food recommendations
// ABOUTME: Configures sub-score weights, neutral values, result size and health thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Candidate Scoring Configuration
//!
//! Weights of the five normalized sub-scores and the constants used when a profile
//! or item carries no signal for a factor.

use nourish_core::constants::scoring;
use nourish_core::models::ScoreFactor;
use serde::{Deserialize, Serialize};

/// Candidate scorer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weights of the sub-scores
    pub weights: ScoringWeights,
    /// Thresholds and neutral values
    pub thresholds: ScoringThresholds,
}

/// Weights for the scoring factors; must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Cuisine alignment weight
    pub cuisine: f64,
    /// Macro alignment weight
    pub macro_alignment: f64,
    /// Meal context fit weight
    pub context: f64,
    /// Health compatibility weight
    pub health: f64,
    /// Variety bonus weight
    pub variety: f64,
}

impl ScoringWeights {
    /// Weight of one factor
    #[must_use]
    pub const fn weight(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::CuisineAlignment => self.cuisine,
            ScoreFactor::MacroAlignment => self.macro_alignment,
            ScoreFactor::ContextFit => self.context,
            ScoreFactor::HealthCompatibility => self.health,
            ScoreFactor::VarietyBonus => self.variety,
        }
    }

    /// Sum of all weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cuisine + self.macro_alignment + self.context + self.health + self.variety
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cuisine: scoring::CUISINE_WEIGHT,
            macro_alignment: scoring::MACRO_WEIGHT,
            context: scoring::CONTEXT_WEIGHT,
            health: scoring::HEALTH_WEIGHT,
            variety: scoring::VARIETY_WEIGHT,
        }
    }
}

/// Scoring thresholds and neutral values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringThresholds {
    /// Context fit for items not tagged for the meal
    pub context_mismatch_score: f64,
    /// Sub-score when there is no signal
    pub neutral_subscore: f64,
    /// Recommendations returned by default
    pub default_top_k: usize,
    /// Days of history treated as "recent" for the variety bonus
    pub recent_food_lookback_days: i64,
    /// Protein per serving satisfying a high-protein preference (g)
    pub high_protein_g: f64,
    /// Fiber per serving satisfying a high-fiber preference (g)
    pub high_fiber_g: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            context_mismatch_score: scoring::CONTEXT_MISMATCH_SCORE,
            neutral_subscore: scoring::NEUTRAL_SUBSCORE,
            default_top_k: scoring::DEFAULT_TOP_K,
            recent_food_lookback_days: scoring::RECENT_FOOD_LOOKBACK_DAYS,
            high_protein_g: scoring::HIGH_PROTEIN_G,
            high_fiber_g: scoring::HIGH_FIBER_G,
        }
    }
}
