// ABOUTME: Preference learner deriving weighted eating preferences from meal history
// ABOUTME: Computes recency-weighted cuisine weights, macro ratios, meal timing and confidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Preference Learner
//!
//! Turns a user's logged meals into a [`PreferenceProfile`]. Each event inside the
//! trailing window is weighted by `decay^days_ago`, so recent meals dominate while
//! older ones still contribute. The learner is a pure function of its input: it never
//! fails, and an empty history yields the neutral profile.

use crate::config::intelligence::{LearnerConfig, PersonalizationConfig};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use nourish_core::models::{
    ConfidenceBand, MacroRatio, MealEvent, MealType, PreferenceProfile, UserId,
};
use std::collections::{BTreeMap, BTreeSet};

/// Learns preference profiles from meal events
#[derive(Debug, Clone)]
pub struct PreferenceLearner {
    config: LearnerConfig,
}

impl Default for PreferenceLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceLearner {
    /// Create a learner using the global configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PersonalizationConfig::global().learner.clone(),
        }
    }

    /// Create with custom configuration
    #[must_use]
    pub const fn with_config(config: LearnerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Earliest timestamp the learner considers at `now`
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.config.window_days)
    }

    /// Compute the profile of `user_id` from its events
    ///
    /// Events of other users and events older than the window are ignored.
    #[must_use]
    pub fn learn(
        &self,
        user_id: UserId,
        events: &[MealEvent],
        now: DateTime<Utc>,
    ) -> PreferenceProfile {
        let window_start = self.window_start(now);
        let window: Vec<&MealEvent> = events
            .iter()
            .filter(|e| e.user_id == user_id && e.timestamp >= window_start)
            .collect();

        let mut profile = PreferenceProfile::neutral(user_id, now);
        profile.source_event_count = events.iter().filter(|e| e.user_id == user_id).count();
        profile.last_event_at = events
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.timestamp)
            .max();

        if window.is_empty() {
            return profile;
        }

        let weighted: Vec<(&MealEvent, f64)> = window
            .iter()
            .map(|event| (*event, self.recency_weight(event.timestamp, now)))
            .collect();

        profile.cuisine_weights = cuisine_weights(&weighted);
        profile.macro_ratio = macro_ratio(&weighted);
        profile.meal_timing_pattern = meal_timing_pattern(&window);

        let distinct_days: BTreeSet<NaiveDate> = window.iter().map(|e| e.day()).collect();
        profile.distinct_days_observed = u32::try_from(distinct_days.len()).unwrap_or(u32::MAX);
        profile.events_considered = window.len();
        profile.confidence = self.confidence(profile.distinct_days_observed);
        profile.confidence_band = ConfidenceBand::from_confidence(profile.confidence);
        profile
    }

    /// `decay^days_ago` in whole days; events dated after `now` weigh 1
    #[must_use]
    pub fn recency_weight(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        if at >= now {
            return 1.0;
        }
        let days_ago = i32::try_from((now - at).num_days()).unwrap_or(i32::MAX);
        self.config.decay_per_day.powi(days_ago)
    }

    /// `min(1, distinct_days / min_days_for_confidence)`
    #[must_use]
    pub fn confidence(&self, distinct_days: u32) -> f64 {
        let min_days = f64::from(self.config.min_days_for_confidence.max(1));
        (f64::from(distinct_days) / min_days).min(1.0)
    }
}

/// Recency-weighted cuisine frequencies normalized to 1
fn cuisine_weights(weighted: &[(&MealEvent, f64)]) -> BTreeMap<String, f64> {
    let mut weights: BTreeMap<String, f64> = BTreeMap::new();
    for (event, weight) in weighted {
        if let Some(cuisine) = event.cuisine_key() {
            *weights.entry(cuisine).or_insert(0.0) += weight;
        }
    }

    let total: f64 = weights.values().sum();
    if total > 0.0 {
        for weight in weights.values_mut() {
            *weight /= total;
        }
    }
    weights
}

/// Recency-weighted average macro energy shares; neutral without macro energy
fn macro_ratio(weighted: &[(&MealEvent, f64)]) -> MacroRatio {
    let mut sum = MacroRatio {
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };
    let mut total_weight = 0.0;

    for (event, weight) in weighted {
        let Some(ratio) = event.nutrients.macro_ratio() else {
            continue;
        };
        sum.protein = ratio.protein.mul_add(*weight, sum.protein);
        sum.carbs = ratio.carbs.mul_add(*weight, sum.carbs);
        sum.fat = ratio.fat.mul_add(*weight, sum.fat);
        total_weight += weight;
    }

    if total_weight <= 0.0 {
        return MacroRatio::default();
    }
    MacroRatio {
        protein: sum.protein / total_weight,
        carbs: sum.carbs / total_weight,
        fat: sum.fat / total_weight,
    }
}

/// Median time of day per meal type
fn meal_timing_pattern(events: &[&MealEvent]) -> BTreeMap<MealType, NaiveTime> {
    let mut seconds_by_meal: BTreeMap<MealType, Vec<u32>> = BTreeMap::new();
    for event in events {
        seconds_by_meal
            .entry(event.meal_type)
            .or_default()
            .push(event.timestamp.time().num_seconds_from_midnight());
    }

    seconds_by_meal
        .into_iter()
        .filter_map(|(meal_type, mut seconds)| {
            seconds.sort_unstable();
            let median = median_seconds(&seconds)?;
            NaiveTime::from_num_seconds_from_midnight_opt(median, 0).map(|t| (meal_type, t))
        })
        .collect()
}

/// Median of sorted values; mean of the middle pair for even counts
fn median_seconds(sorted: &[u32]) -> Option<u32> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(sorted[mid - 1] + (sorted[mid] - sorted[mid - 1]) / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nourish_core::models::Nutrients;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn meal(user: UserId, cuisine: &str, days_ago: i64, hour: u32) -> MealEvent {
        let day = now() - Duration::days(days_ago);
        let at = day.date_naive().and_hms_opt(hour, 0, 0).unwrap().and_utc();
        MealEvent::new(
            user,
            format!("{cuisine}-dish"),
            cuisine,
            Nutrients::new(500.0, 25.0, 50.0, 20.0),
            MealType::from_hour(hour),
            at,
        )
    }

    fn learner() -> PreferenceLearner {
        PreferenceLearner::with_config(LearnerConfig::default())
    }

    #[test]
    fn test_empty_history_yields_neutral_profile() {
        let user = Uuid::new_v4();
        let profile = learner().learn(user, &[], now());

        assert!(profile.cuisine_weights.is_empty());
        assert_eq!(profile.macro_ratio, MacroRatio::default());
        assert!(profile.confidence.abs() < f64::EPSILON);
        assert_eq!(profile.confidence_band, ConfidenceBand::Insufficient);
    }

    #[test]
    fn test_cuisine_weights_normalized_and_recency_weighted() {
        let user = Uuid::new_v4();
        let events = vec![
            meal(user, "Italian", 0, 12),
            meal(user, "mexican", 40, 12),
        ];
        let profile = learner().learn(user, &events, now());

        let total: f64 = profile.cuisine_weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(profile.cuisine_weight("italian") > profile.cuisine_weight("Mexican"));
        assert_eq!(profile.top_cuisine().map(|(c, _)| c), Some("italian"));
    }

    #[test]
    fn test_events_outside_window_and_other_users_ignored() {
        let user = Uuid::new_v4();
        let events = vec![
            meal(user, "thai", 90, 12),
            meal(Uuid::new_v4(), "greek", 1, 12),
        ];
        let profile = learner().learn(user, &events, now());

        assert!(profile.cuisine_weights.is_empty());
        assert_eq!(profile.events_considered, 0);
        assert_eq!(profile.source_event_count, 1);
    }

    #[test]
    fn test_confidence_monotonic_in_distinct_days() {
        let user = Uuid::new_v4();
        let mut events = Vec::new();
        let mut previous = 0.0;
        for day in 0..40 {
            events.push(meal(user, "italian", day, 12));
            let confidence = learner().learn(user, &events, now()).confidence;
            assert!(confidence >= previous);
            assert!((0.0..=1.0).contains(&confidence));
            previous = confidence;
        }
        assert!((previous - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_same_day_events_do_not_raise_confidence() {
        let user = Uuid::new_v4();
        let one = vec![meal(user, "italian", 0, 8)];
        let two = vec![meal(user, "italian", 0, 8), meal(user, "italian", 0, 19)];
        let a = learner().learn(user, &one, now());
        let b = learner().learn(user, &two, now());
        assert!((a.confidence - b.confidence).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meal_timing_uses_median() {
        let user = Uuid::new_v4();
        let events = vec![
            meal(user, "italian", 1, 6),
            meal(user, "italian", 2, 7),
            meal(user, "italian", 3, 10),
        ];
        let profile = learner().learn(user, &events, now());
        assert_eq!(
            profile.meal_timing_pattern.get(&MealType::Breakfast),
            NaiveTime::from_hms_opt(7, 0, 0).as_ref()
        );
    }

    #[test]
    fn test_learning_is_pure() {
        let user = Uuid::new_v4();
        let events = vec![meal(user, "italian", 3, 12), meal(user, "thai", 1, 19)];
        assert_eq!(
            learner().learn(user, &events, now()),
            learner().learn(user, &events, now())
        );
    }

    #[test]
    fn test_future_events_weigh_one() {
        let learner = learner();
        assert!((learner.recency_weight(now() + Duration::days(2), now()) - 1.0).abs() < 1e-12);
        assert!((learner.recency_weight(now() - Duration::days(1), now()) - 0.98).abs() < 1e-12);
    }
}
