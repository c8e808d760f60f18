// ABOUTME: Constants module with component-separated organization
// ABOUTME: Default tuning values for learning, scoring, challenges, and progress tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Defaults for every heuristic the engine uses. These are starting points, not
//! rigorously derived values, so each one is also exposed through the intelligence
//! configuration and can be overridden from the environment.

/// Energy density of macronutrients
pub mod energy {
    /// Kilocalories per gram of protein
    pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
    /// Kilocalories per gram of carbohydrate
    pub const KCAL_PER_G_CARBS: f64 = 4.0;
    /// Kilocalories per gram of fat
    pub const KCAL_PER_G_FAT: f64 = 9.0;
}

/// Preference learning defaults
pub mod learner {
    /// Trailing history window considered by the learner
    pub const DEFAULT_WINDOW_DAYS: i64 = 60;
    /// Per-day multiplicative recency decay
    pub const DEFAULT_DECAY_PER_DAY: f64 = 0.98;
    /// Distinct logged days needed for full confidence
    pub const DEFAULT_MIN_DAYS_FOR_CONFIDENCE: u32 = 30;
    /// Neutral protein share of energy
    pub const NEUTRAL_PROTEIN_RATIO: f64 = 0.20;
    /// Neutral carbohydrate share of energy
    pub const NEUTRAL_CARBS_RATIO: f64 = 0.50;
    /// Neutral fat share of energy
    pub const NEUTRAL_FAT_RATIO: f64 = 0.30;
}

/// Confidence band boundaries
pub mod confidence {
    /// Lower bound of the "building" band
    pub const BUILDING_THRESHOLD: f64 = 0.2;
    /// Lower bound of the "good" band
    pub const GOOD_THRESHOLD: f64 = 0.5;
    /// Lower bound of the "excellent" band
    pub const EXCELLENT_THRESHOLD: f64 = 0.8;
}

/// Candidate scoring defaults
pub mod scoring {
    /// Weight of cuisine alignment
    pub const CUISINE_WEIGHT: f64 = 0.30;
    /// Weight of macro alignment
    pub const MACRO_WEIGHT: f64 = 0.20;
    /// Weight of meal context fit
    pub const CONTEXT_WEIGHT: f64 = 0.20;
    /// Weight of health compatibility
    pub const HEALTH_WEIGHT: f64 = 0.15;
    /// Weight of the variety bonus
    pub const VARIETY_WEIGHT: f64 = 0.15;
    /// Context fit for items not tagged for the requested meal
    pub const CONTEXT_MISMATCH_SCORE: f64 = 0.3;
    /// Sub-score used when the profile or item carries no signal
    pub const NEUTRAL_SUBSCORE: f64 = 0.5;
    /// Default number of recommendations returned
    pub const DEFAULT_TOP_K: usize = 10;
    /// Lookback for "recently eaten" foods
    pub const RECENT_FOOD_LOOKBACK_DAYS: i64 = 14;
    /// Protein per serving treated as high protein (g)
    pub const HIGH_PROTEIN_G: f64 = 15.0;
    /// Fiber per serving treated as high fiber (g)
    pub const HIGH_FIBER_G: f64 = 5.0;
}

/// Challenge generation defaults
pub mod challenges {
    /// Aggregation window for behavioral metrics
    pub const AGGREGATE_WINDOW_DAYS: i64 = 30;
    /// Challenge duration
    pub const CHALLENGE_WINDOW_DAYS: i64 = 7;
    /// Maximum concurrently active challenges per user
    pub const MAX_ACTIVE_CHALLENGES: usize = 3;
    /// Logged days below which onboarding challenges are issued
    pub const MIN_LOGGED_DAYS: u32 = 3;
    /// Share of the gap to benchmark added to the observed value
    pub const IMPROVEMENT_STEP_FRACTION: f64 = 0.2;

    /// Benchmark average daily protein (g)
    pub const PROTEIN_BENCHMARK_G: f64 = 100.0;
    /// Benchmark average daily fiber (g)
    pub const FIBER_BENCHMARK_G: f64 = 25.0;
    /// Benchmark share of days with at least one logged meal
    pub const CONSISTENCY_BENCHMARK_RATIO: f64 = 0.8;
    /// Benchmark distinct foods over the aggregation window
    pub const VARIETY_BENCHMARK_FOODS: f64 = 20.0;
    /// Benchmark share of logged days within calorie tolerance
    pub const CALORIE_ADHERENCE_BENCHMARK_RATIO: f64 = 0.8;
    /// Daily calorie target used for adherence
    pub const CALORIE_TARGET_KCAL: f64 = 2000.0;
    /// Accepted relative deviation from the calorie target
    pub const CALORIE_TOLERANCE_PCT: f64 = 0.10;

    /// Points for a protein challenge
    pub const PROTEIN_POINTS: u32 = 150;
    /// Points for a fiber challenge
    pub const FIBER_POINTS: u32 = 100;
    /// Points for a logging consistency challenge
    pub const CONSISTENCY_POINTS: u32 = 120;
    /// Points for a variety challenge
    pub const VARIETY_POINTS: u32 = 130;
    /// Points for a calorie adherence challenge
    pub const ADHERENCE_POINTS: u32 = 200;
    /// Points for an onboarding challenge
    pub const ONBOARDING_POINTS: u32 = 50;
}

/// Engine runtime defaults
pub mod runtime {
    /// Budget for a candidate lookup (milliseconds)
    pub const LOOKUP_TIMEOUT_MS: u64 = 2_000;
    /// Budget for acquiring a per-user lock (milliseconds)
    pub const USER_LOCK_TIMEOUT_MS: u64 = 5_000;
    /// Attempts for a versioned progress save
    pub const MAX_SAVE_ATTEMPTS: u32 = 3;
    /// Cached profiles older than this are recomputed (seconds)
    pub const PROFILE_MAX_AGE_SECS: i64 = 3_600;
    /// Candidate pools kept for timeout fallback
    pub const CANDIDATE_CACHE_CAPACITY: usize = 64;
}
