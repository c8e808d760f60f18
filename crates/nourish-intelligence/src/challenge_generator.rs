// ABOUTME: Challenge generator turning behavioral gaps into personalized challenges
// ABOUTME: Ranks dimensions by deficiency and instantiates bounded, deterministic templates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Challenge Generator
//!
//! Compares a user's [`BehavioralAggregates`] with configured benchmarks. The
//! normalized deficiency of each dimension is `max(0, (benchmark - observed) / benchmark)`.
//! Dimensions are ranked by deficiency (ties by fixed priority: protein, consistency,
//! variety, calorie adherence, fiber) and the top ones become challenges, up to the
//! active-challenge cap.
//!
//! A target moves the user a bounded step toward the benchmark:
//! `target = clip(observed + clip(fraction * gap, min_step, max_step), min_target, max_target)`.
//!
//! Users with too few logged days get onboarding challenges instead. Generation is
//! deterministic: challenge ids derive from user, dimension and window start.

use crate::behavior_analyzer::BehavioralAggregates;
use crate::config::intelligence::{ChallengeConfig, PersonalizationConfig, StepBounds};
use chrono::{DateTime, Duration, Utc};
use nourish_core::models::{
    AdherenceRule, ChallengeDefinition, ChallengeDifficulty, ChallengeDimension, ChallengeKind,
    Nutrient, UserId,
};
use std::collections::HashSet;
use tracing::debug;

/// Dimensions evaluated for personalized challenges
const SCORED_DIMENSIONS: [ChallengeDimension; 5] = [
    ChallengeDimension::Protein,
    ChallengeDimension::Consistency,
    ChallengeDimension::Variety,
    ChallengeDimension::CalorieAdherence,
    ChallengeDimension::Fiber,
];

/// Gap between observed behavior and benchmark on one dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionGap {
    /// Dimension
    pub dimension: ChallengeDimension,
    /// Observed value, in the benchmark's unit
    pub observed: f64,
    /// Benchmark value
    pub benchmark: f64,
    /// Normalized deficiency in `[0, 1]`
    pub deficiency: f64,
}

/// Generates personalized challenge definitions
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    config: ChallengeConfig,
}

impl Default for ChallengeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeGenerator {
    /// Create a generator using the global configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PersonalizationConfig::global().challenges.clone(),
        }
    }

    /// Create with custom configuration
    #[must_use]
    pub const fn with_config(config: ChallengeConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Gaps of every scored dimension, most deficient first
    #[must_use]
    pub fn rank_gaps(&self, aggregates: &BehavioralAggregates) -> Vec<DimensionGap> {
        let mut gaps: Vec<DimensionGap> = SCORED_DIMENSIONS
            .iter()
            .map(|dimension| {
                let (observed, benchmark) = self.observed_and_benchmark(*dimension, aggregates);
                DimensionGap {
                    dimension: *dimension,
                    observed,
                    benchmark,
                    deficiency: deficiency(observed, benchmark),
                }
            })
            .collect();
        gaps.sort_by(|a, b| {
            b.deficiency
                .total_cmp(&a.deficiency)
                .then_with(|| a.dimension.priority().cmp(&b.dimension.priority()))
        });
        gaps
    }

    /// New challenges for a user given its aggregates and active challenges
    ///
    /// Never returns more than the remaining active-challenge slots, and never a
    /// challenge for a dimension an active challenge already covers.
    #[must_use]
    pub fn generate(
        &self,
        aggregates: &BehavioralAggregates,
        active: &[ChallengeDefinition],
        now: DateTime<Utc>,
    ) -> Vec<ChallengeDefinition> {
        let slots = self.config.max_active_challenges.saturating_sub(active.len());
        if slots == 0 {
            debug!(user_id = %aggregates.user_id, "Active challenge cap reached");
            return Vec::new();
        }

        let starts_at = window_start(now);
        let active_ids: HashSet<_> = active.iter().map(|c| c.challenge_id).collect();
        let covered: HashSet<ChallengeDimension> = active
            .iter()
            .map(|c| c.dimension)
            .filter(|d| *d != ChallengeDimension::Onboarding)
            .collect();

        let candidates = if aggregates.is_insufficient(self.config.min_logged_days) {
            self.onboarding(aggregates, starts_at, now)
        } else {
            self.rank_gaps(aggregates)
                .into_iter()
                .filter(|gap| gap.deficiency > 0.0)
                .map(|gap| self.instantiate(aggregates.user_id, gap, starts_at, now))
                .collect()
        };

        let generated: Vec<ChallengeDefinition> = candidates
            .into_iter()
            .filter(|c| !covered.contains(&c.dimension) && !active_ids.contains(&c.challenge_id))
            .take(slots)
            .collect();

        for challenge in &generated {
            debug!(
                user_id = %challenge.user_id,
                challenge_id = %challenge.challenge_id,
                dimension = %challenge.dimension,
                target = challenge.target_value,
                "Generated challenge"
            );
        }
        generated
    }

    fn observed_and_benchmark(
        &self,
        dimension: ChallengeDimension,
        aggregates: &BehavioralAggregates,
    ) -> (f64, f64) {
        let bench = &self.config.benchmarks;
        match dimension {
            ChallengeDimension::Protein => (aggregates.avg_daily_protein_g, bench.protein_g),
            ChallengeDimension::Fiber => (aggregates.avg_daily_fiber_g, bench.fiber_g),
            ChallengeDimension::Consistency | ChallengeDimension::Onboarding => {
                (aggregates.logging_consistency_ratio, bench.consistency_ratio)
            }
            ChallengeDimension::Variety => {
                (aggregates.distinct_food_count as f64, bench.variety_foods)
            }
            ChallengeDimension::CalorieAdherence => (
                aggregates.calorie_adherent_day_ratio,
                bench.calorie_adherence_ratio,
            ),
        }
    }

    /// Build the challenge for one dimension gap
    fn instantiate(
        &self,
        user_id: UserId,
        gap: DimensionGap,
        starts_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ChallengeDefinition {
        let window_days = self.config.challenge_window_days;
        let days = window_days as f64;
        let bounds = self.config.bounds.for_dimension(gap.dimension);
        let difficulty = ChallengeDifficulty::from_deficiency(gap.deficiency);
        let mut challenge = self.blank(user_id, gap.dimension, "", starts_at, now);
        challenge.difficulty = difficulty;

        match gap.dimension {
            ChallengeDimension::Protein | ChallengeDimension::Fiber => {
                let nutrient = if gap.dimension == ChallengeDimension::Protein {
                    Nutrient::Protein
                } else {
                    Nutrient::Fiber
                };
                let daily = self.step_target(gap.observed, gap.benchmark, bounds).round();
                let total = daily * days;
                challenge.kind = ChallengeKind::NutrientTarget { nutrient };
                challenge.unit = nutrient.unit().to_owned();
                challenge.target_value = total;
                challenge.daily_target = Some(daily);
                challenge.baseline_value = gap.observed;
                if nutrient == Nutrient::Protein {
                    challenge.title = "Protein Power Week".to_owned();
                    challenge.description = format!(
                        "Eat {daily:.0} g of protein per day, {total:.0} g over the next {window_days} days"
                    );
                } else {
                    challenge.title = "Fiber Focus".to_owned();
                    challenge.description = format!(
                        "Reach {total:.0} g of fiber over the next {window_days} days ({daily:.0} g per day)"
                    );
                }
            }
            ChallengeDimension::Consistency | ChallengeDimension::Onboarding => {
                let target =
                    self.day_count_target(gap.observed * days, gap.benchmark * days, bounds);
                challenge.kind = ChallengeKind::ConsistencyStreak;
                challenge.unit = "days".to_owned();
                challenge.target_value = target;
                challenge.baseline_value = gap.observed * days;
                challenge.title = format!("{target:.0}-Day Logging Streak");
                challenge.description = format!(
                    "Log at least one meal on {target:.0} of the next {window_days} days"
                );
            }
            ChallengeDimension::Variety => {
                let scale = days / self.config.aggregate_window_days.max(1) as f64;
                let observed = gap.observed * scale;
                let target = self
                    .step_target(observed, gap.benchmark * scale, bounds)
                    .ceil();
                challenge.kind = ChallengeKind::VarietyCount;
                challenge.unit = "foods".to_owned();
                challenge.target_value = target;
                challenge.baseline_value = observed;
                challenge.title = "Food Explorer Challenge".to_owned();
                challenge.description = format!(
                    "Try {target:.0} different foods in the next {window_days} days"
                );
            }
            ChallengeDimension::CalorieAdherence => {
                let bench = &self.config.benchmarks;
                let target =
                    self.day_count_target(gap.observed * days, gap.benchmark * days, bounds);
                challenge.kind = ChallengeKind::GoalAdherence {
                    nutrient: Nutrient::Calories,
                    rule: AdherenceRule::Within {
                        tolerance_pct: bench.calorie_tolerance_pct,
                    },
                };
                challenge.unit = "days".to_owned();
                challenge.target_value = target;
                challenge.daily_target = Some(bench.calorie_target_kcal);
                challenge.baseline_value = gap.observed * days;
                challenge.title = "Calorie Balance".to_owned();
                challenge.description = format!(
                    "Stay within {:.0}% of {:.0} kcal on {target:.0} of the next {window_days} days",
                    bench.calorie_tolerance_pct * 100.0,
                    bench.calorie_target_kcal
                );
            }
        }
        challenge
    }

    /// Starter challenges for users with little history
    fn onboarding(
        &self,
        aggregates: &BehavioralAggregates,
        starts_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeDefinition> {
        let user_id = aggregates.user_id;
        let window_days = self.config.challenge_window_days;
        let points = self.config.points.onboarding;

        let log_days = f64::from(self.config.min_logged_days.max(1)).min(window_days as f64);
        let mut logging =
            self.blank(user_id, ChallengeDimension::Onboarding, "log-days", starts_at, now);
        logging.kind = ChallengeKind::ConsistencyStreak;
        logging.unit = "days".to_owned();
        logging.target_value = log_days;
        logging.points_reward = points;
        logging.title = "Getting Started: Log Your Meals".to_owned();
        logging.description = format!(
            "Log at least one meal on {log_days:.0} of the next {window_days} days"
        );

        let try_foods = self.config.bounds.variety.min_target.max(1.0);
        let mut explorer =
            self.blank(user_id, ChallengeDimension::Onboarding, "try-foods", starts_at, now);
        explorer.kind = ChallengeKind::VarietyCount;
        explorer.unit = "foods".to_owned();
        explorer.target_value = try_foods;
        explorer.points_reward = points;
        explorer.title = "Getting Started: Explore Foods".to_owned();
        explorer.description = format!(
            "Try {try_foods:.0} different foods in the next {window_days} days"
        );

        let (observed, benchmark) =
            self.observed_and_benchmark(ChallengeDimension::Protein, aggregates);
        let protein = self.instantiate(
            user_id,
            DimensionGap {
                dimension: ChallengeDimension::Protein,
                observed,
                benchmark,
                deficiency: deficiency(observed, benchmark),
            },
            starts_at,
            now,
        );

        vec![logging, explorer, protein]
    }

    /// Definition skeleton with id, window and reward filled in
    fn blank(
        &self,
        user_id: UserId,
        dimension: ChallengeDimension,
        discriminator: &str,
        starts_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ChallengeDefinition {
        ChallengeDefinition {
            challenge_id: ChallengeDefinition::deterministic_id(
                user_id,
                dimension,
                starts_at,
                discriminator,
            ),
            user_id,
            kind: ChallengeKind::ConsistencyStreak,
            dimension,
            title: String::new(),
            description: String::new(),
            difficulty: ChallengeDifficulty::Easy,
            unit: String::new(),
            target_value: 0.0,
            daily_target: None,
            baseline_value: 0.0,
            points_reward: self.config.points.for_dimension(dimension),
            starts_at,
            ends_at: starts_at + Duration::days(self.config.challenge_window_days),
            created_at: now,
        }
    }

    /// `clip(observed + clip(fraction * gap, min_step, max_step), min_target, max_target)`
    fn step_target(&self, observed: f64, benchmark: f64, bounds: StepBounds) -> f64 {
        let gap = (benchmark - observed).max(0.0);
        let step = (self.config.improvement_step_fraction * gap)
            .clamp(bounds.min_step, bounds.max_step);
        (observed + step).clamp(bounds.min_target, bounds.max_target)
    }

    /// Step target for day counts, rounded up and capped at the window length
    fn day_count_target(&self, observed: f64, benchmark: f64, bounds: StepBounds) -> f64 {
        let window = self.config.challenge_window_days as f64;
        self.step_target(observed, benchmark, bounds)
            .ceil()
            .min(window)
    }
}

/// `max(0, (benchmark - observed) / benchmark)`, capped at 1
fn deficiency(observed: f64, benchmark: f64) -> f64 {
    if benchmark <= 0.0 {
        return 0.0;
    }
    ((benchmark - observed) / benchmark).clamp(0.0, 1.0)
}

/// Challenges start at the beginning of the current UTC day
fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}
