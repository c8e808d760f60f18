// ABOUTME: Behavior analyzer aggregating meal history into behavioral metrics
// ABOUTME: Computes logging consistency, meal timing, daily nutrient averages, variety and adherence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Behavioral aggregation over a trailing window, the input of challenge generation.

use crate::config::intelligence::{ChallengeConfig, PersonalizationConfig};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use nourish_core::models::{AdherenceRule, FoodId, MealEvent, MealType, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Behavioral metrics of one user over a trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAggregates {
    /// User the metrics describe
    pub user_id: UserId,
    /// Window length (days)
    pub window_days: i64,
    /// Inclusive window start
    pub window_start: DateTime<Utc>,
    /// Inclusive window end (the analysis time)
    pub window_end: DateTime<Utc>,
    /// Distinct days with at least one event
    pub logged_days: u32,
    /// Events in the window
    pub total_meals: usize,
    /// Average daily protein over logged days (g)
    pub avg_daily_protein_g: f64,
    /// Average daily calories over logged days (kcal)
    pub avg_daily_calories: f64,
    /// Average daily fiber over logged days (g)
    pub avg_daily_fiber_g: f64,
    /// `logged_days / window_days`
    pub logging_consistency_ratio: f64,
    /// `total_meals / logged_days`
    pub avg_meals_per_day: f64,
    /// Per main meal, `1 - stddev(hour of day) / 24`; 0 when the meal is never logged
    #[serde(default)]
    pub meal_timing_consistency: BTreeMap<MealType, f64>,
    /// Distinct cuisines eaten
    pub distinct_cuisine_count: usize,
    /// Distinct foods eaten
    pub distinct_food_count: usize,
    /// Logged days within tolerance of the calorie target
    pub calorie_adherent_days: u32,
    /// `calorie_adherent_days / logged_days`
    pub calorie_adherent_day_ratio: f64,
}

impl BehavioralAggregates {
    /// Whether the user has logged too little to personalize challenges
    #[must_use]
    pub const fn is_insufficient(&self, min_logged_days: u32) -> bool {
        self.logged_days < min_logged_days
    }
}

/// Hour-of-day windows of the main meals, inclusive
const MEAL_HOUR_WINDOWS: [(MealType, u32, u32); 3] = [
    (MealType::Breakfast, 6, 10),
    (MealType::Lunch, 11, 14),
    (MealType::Dinner, 17, 21),
];

#[derive(Default)]
struct DayTotals {
    calories: f64,
    protein_g: f64,
    fiber_g: f64,
}

/// Aggregates meal history into [`BehavioralAggregates`]
#[derive(Debug, Clone)]
pub struct BehaviorAnalyzer {
    config: ChallengeConfig,
}

impl Default for BehaviorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorAnalyzer {
    /// Create an analyzer using the global configuration
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

    /// Earliest timestamp aggregated at `now`
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.config.aggregate_window_days)
    }

    /// Aggregate the events of `user_id` in `[now - window, now]`
    #[must_use]
    pub fn analyze(
        &self,
        user_id: UserId,
        events: &[MealEvent],
        now: DateTime<Utc>,
    ) -> BehavioralAggregates {
        let window_start = self.window_start(now);
        let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
        let mut cuisines: BTreeSet<String> = BTreeSet::new();
        let mut foods: BTreeSet<&FoodId> = BTreeSet::new();
        let mut total_meals = 0_usize;
        let mut hours: Vec<f64> = Vec::new();

        for event in events
            .iter()
            .filter(|e| e.user_id == user_id && e.timestamp >= window_start && e.timestamp <= now)
        {
            total_meals += 1;
            let totals = days.entry(event.day()).or_default();
            totals.calories += event.nutrients.calories;
            totals.protein_g += event.nutrients.protein_g;
            totals.fiber_g += event.nutrients.fiber_g;
            if let Some(cuisine) = event.cuisine_key() {
                cuisines.insert(cuisine);
            }
            foods.insert(&event.food_id);
            let time = event.timestamp;
            hours.push(f64::from(time.hour()) + f64::from(time.minute()) / 60.0);
        }

        let logged_days = u32::try_from(days.len()).unwrap_or(u32::MAX);
        let day_count = days.len().max(1) as f64;
        let average = |f: fn(&DayTotals) -> f64| days.values().map(f).sum::<f64>() / day_count;

        let bench = &self.config.benchmarks;
        let rule = AdherenceRule::Within {
            tolerance_pct: bench.calorie_tolerance_pct,
        };
        let calorie_adherent_days = u32::try_from(
            days.values()
                .filter(|d| rule.is_met(d.calories, bench.calorie_target_kcal))
                .count(),
        )
        .unwrap_or(u32::MAX);

        BehavioralAggregates {
            user_id,
            window_days: self.config.aggregate_window_days,
            window_start,
            window_end: now,
            logged_days,
            total_meals,
            avg_daily_protein_g: average(|d| d.protein_g),
            avg_daily_calories: average(|d| d.calories),
            avg_daily_fiber_g: average(|d| d.fiber_g),
            logging_consistency_ratio: (f64::from(logged_days)
                / self.config.aggregate_window_days.max(1) as f64)
                .min(1.0),
            avg_meals_per_day: if logged_days == 0 {
                0.0
            } else {
                total_meals as f64 / f64::from(logged_days)
            },
            meal_timing_consistency: timing_consistency(&hours),
            distinct_cuisine_count: cuisines.len(),
            distinct_food_count: foods.len(),
            calorie_adherent_days,
            calorie_adherent_day_ratio: if logged_days == 0 {
                0.0
            } else {
                f64::from(calorie_adherent_days) / f64::from(logged_days)
            },
        }
    }
}

/// Spread of logging hours within each main-meal window
fn timing_consistency(hours: &[f64]) -> BTreeMap<MealType, f64> {
    MEAL_HOUR_WINDOWS
        .iter()
        .map(|(meal_type, first, last)| {
            let slot: Vec<f64> = hours
                .iter()
                .copied()
                .filter(|h| *h >= f64::from(*first) && *h < f64::from(*last + 1))
                .collect();
            let score = match slot.len() {
                0 => 0.0,
                1 => 1.0,
                n => {
                    let mean = slot.iter().sum::<f64>() / n as f64;
                    let variance =
                        slot.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                    (1.0 - variance.sqrt() / 24.0).clamp(0.0, 1.0)
                }
            };
            (*meal_type, score)
        })
        .collect()
}
