// ABOUTME: Personalization configuration for preference learning, scoring, and challenges
// ABOUTME: Orchestrates domain-specific configs and provides unified validation and loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Personalization Configuration Module
//!
//! Provides type-safe, validated configuration for every personalization engine.
//!
//! # Module Structure
//!
//! - `learner` - Learning window, recency decay and confidence
//! - `scoring` - Candidate scoring weights and thresholds
//! - `challenges` - Benchmarks, steps, caps and rewards for generated challenges
//! - `tracking` - Challenge completion threshold
//!
//! Every value can be overridden with a `NOURISH_*` environment variable.

pub mod challenges;
pub mod error;
pub mod learner;
pub mod scoring;
pub mod tracking;

pub use challenges::{
    ChallengeBenchmarks, ChallengeBounds, ChallengeConfig, ChallengePoints, StepBounds,
};
pub use error::ConfigError;
pub use learner::LearnerConfig;
pub use scoring::{ScoringConfig, ScoringThresholds, ScoringWeights};
pub use tracking::TrackingConfig;

use serde::{Deserialize, Serialize};
use std::env;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Tolerance when checking that scoring weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Global configuration singleton
static PERSONALIZATION_CONFIG: OnceLock<PersonalizationConfig<true>> = OnceLock::new();

/// Main personalization configuration container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizationConfig<const VALIDATED: bool = false> {
    /// Configuration for the preference learner
    pub learner: LearnerConfig,
    /// Configuration for the candidate scorer
    pub scoring: ScoringConfig,
    /// Configuration for behavioral aggregation and challenge generation
    pub challenges: ChallengeConfig,
    /// Configuration for the progress tracker
    pub tracking: TrackingConfig,
    #[serde(skip)]
    _phantom: PhantomData<()>,
}

impl PersonalizationConfig<true> {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        PERSONALIZATION_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load personalization config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from defaults and environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first range, weight or ordering violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_learner()?;
        self.validate_scoring()?;
        self.validate_challenges()?;

        let pct = self.tracking.completion_threshold_pct;
        if !(pct > 0.0 && pct <= 100.0) {
            return Err(ConfigError::ValueOutOfRange(
                "completion_threshold_pct must be in (0, 100]",
            ));
        }
        Ok(())
    }

    fn validate_learner(&self) -> Result<(), ConfigError> {
        let learner = &self.learner;
        if !(learner.decay_per_day > 0.0 && learner.decay_per_day <= 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "decay_per_day must be in (0, 1]",
            ));
        }
        if learner.window_days < 1 {
            return Err(ConfigError::ValueOutOfRange(
                "learner window_days must be at least 1",
            ));
        }
        if learner.min_days_for_confidence == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "min_days_for_confidence must be at least 1",
            ));
        }
        Ok(())
    }

    fn validate_scoring(&self) -> Result<(), ConfigError> {
        let weights = &self.scoring.weights;
        let all_non_negative = [
            weights.cuisine,
            weights.macro_alignment,
            weights.context,
            weights.health,
            weights.variety,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0);
        if !all_non_negative {
            return Err(ConfigError::InvalidWeights(
                "Scoring weights must be finite and non-negative",
            ));
        }
        if (weights.total() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights("Scoring weights must sum to 1.0"));
        }

        let thresholds = &self.scoring.thresholds;
        if !(0.0..=1.0).contains(&thresholds.context_mismatch_score)
            || !(0.0..=1.0).contains(&thresholds.neutral_subscore)
        {
            return Err(ConfigError::ValueOutOfRange(
                "Neutral and mismatch sub-scores must be in [0, 1]",
            ));
        }
        if thresholds.default_top_k == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "default_top_k must be at least 1",
            ));
        }
        if thresholds.recent_food_lookback_days < 0 {
            return Err(ConfigError::ValueOutOfRange(
                "recent_food_lookback_days must not be negative",
            ));
        }
        Ok(())
    }

    fn validate_challenges(&self) -> Result<(), ConfigError> {
        let ch = &self.challenges;
        if ch.aggregate_window_days < 1 || ch.challenge_window_days < 1 {
            return Err(ConfigError::ValueOutOfRange(
                "Challenge windows must be at least 1 day",
            ));
        }
        if ch.max_active_challenges == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_active_challenges must be at least 1",
            ));
        }
        if !(ch.improvement_step_fraction > 0.0 && ch.improvement_step_fraction <= 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "improvement_step_fraction must be in (0, 1]",
            ));
        }

        let bench = &ch.benchmarks;
        if bench.protein_g <= 0.0
            || bench.fiber_g <= 0.0
            || bench.variety_foods <= 0.0
            || bench.calorie_target_kcal <= 0.0
        {
            return Err(ConfigError::ValueOutOfRange(
                "Benchmarks must be positive",
            ));
        }
        if !(bench.consistency_ratio > 0.0 && bench.consistency_ratio <= 1.0)
            || !(bench.calorie_adherence_ratio > 0.0 && bench.calorie_adherence_ratio <= 1.0)
        {
            return Err(ConfigError::ValueOutOfRange(
                "Ratio benchmarks must be in (0, 1]",
            ));
        }
        if !(bench.calorie_tolerance_pct > 0.0 && bench.calorie_tolerance_pct < 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "calorie_tolerance_pct must be in (0, 1)",
            ));
        }

        let bounds = &ch.bounds;
        if ![
            bounds.protein,
            bounds.fiber,
            bounds.consistency,
            bounds.variety,
            bounds.calorie_adherence,
        ]
        .iter()
        .all(StepBounds::is_ordered)
        {
            return Err(ConfigError::InvalidRange(
                "Step and target bounds must satisfy min <= max",
            ));
        }
        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Learner overrides
        Self::apply_env_var("NOURISH_LEARNER_WINDOW_DAYS", &mut self.learner.window_days)?;
        Self::apply_env_var(
            "NOURISH_LEARNER_DECAY_PER_DAY",
            &mut self.learner.decay_per_day,
        )?;
        Self::apply_env_var(
            "NOURISH_LEARNER_MIN_DAYS",
            &mut self.learner.min_days_for_confidence,
        )?;

        // Scoring overrides
        let weights = &mut self.scoring.weights;
        Self::apply_env_var("NOURISH_SCORING_WEIGHT_CUISINE", &mut weights.cuisine)?;
        Self::apply_env_var("NOURISH_SCORING_WEIGHT_MACRO", &mut weights.macro_alignment)?;
        Self::apply_env_var("NOURISH_SCORING_WEIGHT_CONTEXT", &mut weights.context)?;
        Self::apply_env_var("NOURISH_SCORING_WEIGHT_HEALTH", &mut weights.health)?;
        Self::apply_env_var("NOURISH_SCORING_WEIGHT_VARIETY", &mut weights.variety)?;
        Self::apply_env_var(
            "NOURISH_SCORING_TOP_K",
            &mut self.scoring.thresholds.default_top_k,
        )?;
        Self::apply_env_var(
            "NOURISH_SCORING_RECENT_LOOKBACK_DAYS",
            &mut self.scoring.thresholds.recent_food_lookback_days,
        )?;

        // Challenge overrides
        let ch = &mut self.challenges;
        Self::apply_env_var(
            "NOURISH_CHALLENGE_AGGREGATE_WINDOW_DAYS",
            &mut ch.aggregate_window_days,
        )?;
        Self::apply_env_var("NOURISH_CHALLENGE_WINDOW_DAYS", &mut ch.challenge_window_days)?;
        Self::apply_env_var("NOURISH_CHALLENGE_MAX_ACTIVE", &mut ch.max_active_challenges)?;
        Self::apply_env_var("NOURISH_CHALLENGE_MIN_LOGGED_DAYS", &mut ch.min_logged_days)?;
        Self::apply_env_var(
            "NOURISH_CHALLENGE_STEP_FRACTION",
            &mut ch.improvement_step_fraction,
        )?;
        Self::apply_env_var("NOURISH_BENCHMARK_PROTEIN_G", &mut ch.benchmarks.protein_g)?;
        Self::apply_env_var("NOURISH_BENCHMARK_FIBER_G", &mut ch.benchmarks.fiber_g)?;
        Self::apply_env_var(
            "NOURISH_BENCHMARK_CONSISTENCY",
            &mut ch.benchmarks.consistency_ratio,
        )?;
        Self::apply_env_var(
            "NOURISH_BENCHMARK_VARIETY_FOODS",
            &mut ch.benchmarks.variety_foods,
        )?;
        Self::apply_env_var(
            "NOURISH_BENCHMARK_CALORIE_ADHERENCE",
            &mut ch.benchmarks.calorie_adherence_ratio,
        )?;
        Self::apply_env_var(
            "NOURISH_CALORIE_TARGET_KCAL",
            &mut ch.benchmarks.calorie_target_kcal,
        )?;
        Self::apply_env_var(
            "NOURISH_CALORIE_TOLERANCE_PCT",
            &mut ch.benchmarks.calorie_tolerance_pct,
        )?;

        // Tracking overrides
        Self::apply_env_var(
            "NOURISH_TRACKING_COMPLETION_PCT",
            &mut self.tracking.completion_threshold_pct,
        )?;

        Ok(self)
    }
}

impl Default for PersonalizationConfig<true> {
    fn default() -> Self {
        Self {
            learner: LearnerConfig::default(),
            scoring: ScoringConfig::default(),
            challenges: ChallengeConfig::default(),
            tracking: TrackingConfig::default(),
            _phantom: PhantomData,
        }
    }
}
