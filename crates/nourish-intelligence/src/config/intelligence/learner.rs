// ABOUTME: Preference learner configuration for recency weighting and confidence
// ABOUTME: Configures the learning window, per-day decay and days required for full confidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nourish_core::constants::learner;
use serde::{Deserialize, Serialize};

/// Preference learner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Trailing window of history considered (days)
    pub window_days: i64,
    /// Multiplicative weight applied per day of event age, in `(0, 1]`
    pub decay_per_day: f64,
    /// Distinct logged days at which confidence reaches 1.0
    pub min_days_for_confidence: u32,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            window_days: learner::DEFAULT_WINDOW_DAYS,
            decay_per_day: learner::DEFAULT_DECAY_PER_DAY,
            min_days_for_confidence: learner::DEFAULT_MIN_DAYS_FOR_CONFIDENCE,
        }
    }
}
