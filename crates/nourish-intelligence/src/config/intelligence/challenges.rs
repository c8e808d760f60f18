// ABOUTME: Challenge generation configuration for personalized improvement challenges
// ABOUTME: Configures benchmarks, step and target bounds, windows, caps and point rewards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Challenge Generation Configuration
//!
//! Benchmarks define what "good" looks like for each behavioral dimension. A challenge
//! target moves the user a bounded step from the observed value toward the benchmark.

use nourish_core::constants::challenges;
use nourish_core::models::ChallengeDimension;
use serde::{Deserialize, Serialize};

/// Challenge generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Aggregation window for behavioral metrics (days)
    pub aggregate_window_days: i64,
    /// Length of a generated challenge (days)
    pub challenge_window_days: i64,
    /// Maximum concurrently active challenges
    pub max_active_challenges: usize,
    /// Logged days below which onboarding challenges are issued
    pub min_logged_days: u32,
    /// Share of the gap to benchmark used as the improvement step
    pub improvement_step_fraction: f64,
    /// Benchmarks per dimension
    pub benchmarks: ChallengeBenchmarks,
    /// Step and target bounds per dimension
    pub bounds: ChallengeBounds,
    /// Point rewards per dimension
    pub points: ChallengePoints,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            aggregate_window_days: challenges::AGGREGATE_WINDOW_DAYS,
            challenge_window_days: challenges::CHALLENGE_WINDOW_DAYS,
            max_active_challenges: challenges::MAX_ACTIVE_CHALLENGES,
            min_logged_days: challenges::MIN_LOGGED_DAYS,
            improvement_step_fraction: challenges::IMPROVEMENT_STEP_FRACTION,
            benchmarks: ChallengeBenchmarks::default(),
            bounds: ChallengeBounds::default(),
            points: ChallengePoints::default(),
        }
    }
}

/// Healthy reference values per dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeBenchmarks {
    /// Average daily protein (g)
    pub protein_g: f64,
    /// Average daily fiber (g)
    pub fiber_g: f64,
    /// Share of window days with a logged meal
    pub consistency_ratio: f64,
    /// Distinct foods over the aggregation window
    pub variety_foods: f64,
    /// Share of logged days within calorie tolerance
    pub calorie_adherence_ratio: f64,
    /// Daily calorie target (kcal)
    pub calorie_target_kcal: f64,
    /// Accepted relative deviation from the calorie target
    pub calorie_tolerance_pct: f64,
}

impl Default for ChallengeBenchmarks {
    fn default() -> Self {
        Self {
            protein_g: challenges::PROTEIN_BENCHMARK_G,
            fiber_g: challenges::FIBER_BENCHMARK_G,
            consistency_ratio: challenges::CONSISTENCY_BENCHMARK_RATIO,
            variety_foods: challenges::VARIETY_BENCHMARK_FOODS,
            calorie_adherence_ratio: challenges::CALORIE_ADHERENCE_BENCHMARK_RATIO,
            calorie_target_kcal: challenges::CALORIE_TARGET_KCAL,
            calorie_tolerance_pct: challenges::CALORIE_TOLERANCE_PCT,
        }
    }
}

/// Step and target limits of one dimension, in the unit of its daily or window target
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepBounds {
    /// Smallest improvement step
    pub min_step: f64,
    /// Largest improvement step
    pub max_step: f64,
    /// Lowest sane target
    pub min_target: f64,
    /// Highest sane target
    pub max_target: f64,
}

impl StepBounds {
    /// Bounds with the given step and target ranges
    #[must_use]
    pub const fn new(min_step: f64, max_step: f64, min_target: f64, max_target: f64) -> Self {
        Self {
            min_step,
            max_step,
            min_target,
            max_target,
        }
    }

    /// Whether both ranges are ordered and non-negative
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.min_step >= 0.0 && self.min_step <= self.max_step && self.min_target <= self.max_target
    }
}

/// Step bounds per dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeBounds {
    /// Daily protein target (g)
    pub protein: StepBounds,
    /// Daily fiber target (g)
    pub fiber: StepBounds,
    /// Days to log in a challenge window
    pub consistency: StepBounds,
    /// Distinct foods in a challenge window
    pub variety: StepBounds,
    /// Adherent days in a challenge window
    pub calorie_adherence: StepBounds,
}

impl ChallengeBounds {
    /// Bounds for a dimension; onboarding uses consistency bounds
    #[must_use]
    pub const fn for_dimension(&self, dimension: ChallengeDimension) -> StepBounds {
        match dimension {
            ChallengeDimension::Protein => self.protein,
            ChallengeDimension::Fiber => self.fiber,
            ChallengeDimension::Consistency | ChallengeDimension::Onboarding => self.consistency,
            ChallengeDimension::Variety => self.variety,
            ChallengeDimension::CalorieAdherence => self.calorie_adherence,
        }
    }
}

impl Default for ChallengeBounds {
    fn default() -> Self {
        Self {
            protein: StepBounds::new(5.0, 20.0, 30.0, 200.0),
            fiber: StepBounds::new(2.0, 8.0, 10.0, 50.0),
            consistency: StepBounds::new(1.0, 2.0, 3.0, 7.0),
            variety: StepBounds::new(1.0, 3.0, 3.0, 15.0),
            calorie_adherence: StepBounds::new(1.0, 2.0, 3.0, 7.0),
        }
    }
}

/// Points awarded on completion per dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengePoints {
    /// Protein challenge reward
    pub protein: u32,
    /// Fiber challenge reward
    pub fiber: u32,
    /// Consistency challenge reward
    pub consistency: u32,
    /// Variety challenge reward
    pub variety: u32,
    /// Calorie adherence challenge reward
    pub calorie_adherence: u32,
    /// Onboarding challenge reward
    pub onboarding: u32,
}

impl ChallengePoints {
    /// Reward for a dimension
    #[must_use]
    pub const fn for_dimension(&self, dimension: ChallengeDimension) -> u32 {
        match dimension {
            ChallengeDimension::Protein => self.protein,
            ChallengeDimension::Fiber => self.fiber,
            ChallengeDimension::Consistency => self.consistency,
            ChallengeDimension::Variety => self.variety,
            ChallengeDimension::CalorieAdherence => self.calorie_adherence,
            ChallengeDimension::Onboarding => self.onboarding,
        }
    }
}

impl Default for ChallengePoints {
    fn default() -> Self {
        Self {
            protein: challenges::PROTEIN_POINTS,
            fiber: challenges::FIBER_POINTS,
            consistency: challenges::CONSISTENCY_POINTS,
            variety: challenges::VARIETY_POINTS,
            calorie_adherence: challenges::ADHERENCE_POINTS,
            onboarding: challenges::ONBOARDING_POINTS,
        }
    }
}
