// ABOUTME: Progress tracker applying meal events to active challenges exactly once
// ABOUTME: Day-bucketed increments, per-kind rules, completion, expiry and day rollover
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Progress Tracker
//!
//! Each challenge follows `ACTIVE -> COMPLETED` or `ACTIVE -> EXPIRED`; both end
//! states are terminal. Every applied event id is recorded in the day bucket it
//! belongs to and checked against all buckets, so redelivering an event never
//! changes progress twice, even with a shifted timestamp.
//!
//! Per-kind rules:
//!
//! - nutrient target: add the event's amount to the day bucket and the window total
//! - consistency streak: one credit for the first applied event of a calendar day
//! - variety count: one credit per food id per window
//! - goal adherence: days accumulate a running total and are judged against the
//!   daily target once they close (on a later-day event or a time advance); a late
//!   event re-judges its closed day
//!
//! The tracker is synchronous and mutates progress in place. Callers serialize
//! access per user and persist the result with a versioned save.

use crate::config::intelligence::{PersonalizationConfig, TrackingConfig};
use chrono::{DateTime, NaiveDate, Utc};
use nourish_core::models::{
    ChallengeKind, ChallengeProgress, ChallengeProgressDelta, ChallengeStatus, DailyProgress,
    MealEvent,
};
use tracing::{debug, info};

/// Applies meal events and time advances to challenge progress
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    config: TrackingConfig,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Create a tracker using the global configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PersonalizationConfig::global().tracking.clone(),
        }
    }

    /// Create with custom configuration
    #[must_use]
    pub const fn with_config(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// Advance every challenge to `now`, then apply the event to each eligible one
    ///
    /// Returns one delta per challenge change, time advances first.
    pub fn track(
        &self,
        progresses: &mut [ChallengeProgress],
        event: &MealEvent,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeProgressDelta> {
        let mut deltas = Vec::new();
        for progress in progresses.iter_mut() {
            if let Some(delta) = self.advance(progress, now) {
                deltas.push(delta);
            }
            if let Some(delta) = self.apply_event(progress, event, now) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Whether the event can affect this challenge
    #[must_use]
    pub fn is_eligible(progress: &ChallengeProgress, event: &MealEvent) -> bool {
        let definition = &progress.definition;
        progress.status == ChallengeStatus::Active
            && definition.user_id == event.user_id
            && definition.contains(event.timestamp)
            && definition.kind.matches(event)
    }

    /// Apply one event; `None` when ineligible or already applied
    pub fn apply_event(
        &self,
        progress: &mut ChallengeProgress,
        event: &MealEvent,
        now: DateTime<Utc>,
    ) -> Option<ChallengeProgressDelta> {
        let day = event.day();
        if !Self::is_eligible(progress, event) {
            return None;
        }
        if progress.has_applied(event.event_id) {
            debug!(
                challenge_id = %progress.challenge_id(),
                event_id = %event.event_id,
                "Event already applied, skipping"
            );
            return None;
        }

        let previous_status = progress.status;
        let before = progress.current_value;
        let daily_target = progress.definition.daily_target;
        let bucket = progress
            .days
            .entry(day)
            .or_insert_with(|| DailyProgress::new(day, daily_target));
        bucket.applied_event_ids.insert(event.event_id);

        let kind = progress.definition.kind;
        match kind {
            ChallengeKind::NutrientTarget { nutrient } => {
                let amount = event.nutrients.amount(nutrient);
                bucket.current_value += amount;
                bucket.achieved = daily_target.is_some_and(|t| bucket.current_value >= t);
                progress.current_value += amount;
            }
            ChallengeKind::ConsistencyStreak => {
                if bucket.current_value <= 0.0 {
                    bucket.current_value = 1.0;
                    bucket.achieved = true;
                    progress.current_value += 1.0;
                }
            }
            ChallengeKind::VarietyCount => {
                if progress.credited_food_ids.insert(event.food_id.clone()) {
                    bucket.current_value += 1.0;
                    progress.current_value += 1.0;
                }
            }
            ChallengeKind::GoalAdherence { nutrient, rule } => {
                bucket.current_value += event.nutrients.amount(nutrient);
                if bucket.closed {
                    let target = bucket.daily_target.unwrap_or(0.0);
                    bucket.achieved = rule.is_met(bucket.current_value, target);
                }
                close_days_before(progress, day);
                recount_achieved_days(progress);
            }
        }

        progress.updated_at = now;
        self.settle(progress, now);
        Some(delta(progress, Some(event), Some(day), before, previous_status))
    }

    /// Close elapsed days and resolve challenges whose window has ended
    ///
    /// Returns a delta when status or value changed.
    pub fn advance(
        &self,
        progress: &mut ChallengeProgress,
        now: DateTime<Utc>,
    ) -> Option<ChallengeProgressDelta> {
        if progress.status.is_terminal() {
            return None;
        }
        let previous_status = progress.status;
        let before = progress.current_value;

        if matches!(progress.definition.kind, ChallengeKind::GoalAdherence { .. }) {
            let cutoff = if progress.definition.has_ended(now) {
                NaiveDate::MAX
            } else {
                now.date_naive()
            };
            close_days_before(progress, cutoff);
            recount_achieved_days(progress);
        }

        self.settle(progress, now);
        if progress.status == ChallengeStatus::Active && progress.definition.has_ended(now) {
            progress.status = ChallengeStatus::Expired;
            info!(
                challenge_id = %progress.challenge_id(),
                user_id = %progress.definition.user_id,
                current = progress.current_value,
                target = progress.definition.target_value,
                "Challenge expired"
            );
        }

        let changed = progress.status != previous_status
            || (progress.current_value - before).abs() > f64::EPSILON;
        if !changed {
            return None;
        }
        progress.updated_at = now;
        Some(delta(progress, None, None, before, previous_status))
    }

    /// Refresh completion and complete the challenge once the threshold is met
    fn settle(&self, progress: &mut ChallengeProgress, now: DateTime<Utc>) {
        progress.refresh_completion();
        if progress.status != ChallengeStatus::Active {
            return;
        }
        let required =
            progress.definition.target_value * self.config.completion_threshold_pct / 100.0;
        if progress.current_value >= required {
            progress.status = ChallengeStatus::Completed;
            progress.completed_at = Some(now);
            if progress.points_awarded == 0 {
                progress.points_awarded = progress.definition.points_reward;
            }
            info!(
                challenge_id = %progress.challenge_id(),
                user_id = %progress.definition.user_id,
                points = progress.points_awarded,
                "Challenge completed"
            );
        }
    }
}

/// Judge every open bucket dated before `day`
fn close_days_before(progress: &mut ChallengeProgress, day: NaiveDate) {
    let ChallengeKind::GoalAdherence { rule, .. } = progress.definition.kind else {
        return;
    };
    for (_, bucket) in progress.days.range_mut(..day) {
        if !bucket.closed {
            bucket.closed = true;
            let target = bucket.daily_target.unwrap_or(0.0);
            bucket.achieved = rule.is_met(bucket.current_value, target);
        }
    }
}

/// Goal adherence progress is the number of closed, achieved days
fn recount_achieved_days(progress: &mut ChallengeProgress) {
    progress.current_value = progress
        .days
        .values()
        .filter(|b| b.closed && b.achieved)
        .count() as f64;
}

fn delta(
    progress: &ChallengeProgress,
    event: Option<&MealEvent>,
    day: Option<NaiveDate>,
    before: f64,
    previous_status: ChallengeStatus,
) -> ChallengeProgressDelta {
    let completed_now =
        previous_status == ChallengeStatus::Active && progress.status == ChallengeStatus::Completed;
    ChallengeProgressDelta {
        challenge_id: progress.challenge_id(),
        event_id: event.map(|e| e.event_id),
        day,
        value_delta: progress.current_value - before,
        current_value: progress.current_value,
        completion_percentage: progress.completion_percentage,
        previous_status,
        status: progress.status,
        points_awarded: if completed_now {
            progress.points_awarded
        } else {
            0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use nourish_core::models::{
        AdherenceRule, ChallengeDefinition, ChallengeDifficulty, ChallengeDimension, MealType,
        Nutrient, Nutrients, UserId,
    };
    use uuid::Uuid;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
    }

    fn at(day: i64, hour: i64) -> DateTime<Utc> {
        start() + Duration::days(day) + Duration::hours(hour)
    }

    fn challenge(
        user_id: UserId,
        kind: ChallengeKind,
        target: f64,
        daily: Option<f64>,
    ) -> ChallengeProgress {
        let definition = ChallengeDefinition {
            challenge_id: Uuid::new_v4(),
            user_id,
            kind,
            dimension: ChallengeDimension::Protein,
            title: "test".into(),
            description: "test".into(),
            difficulty: ChallengeDifficulty::Easy,
            unit: "g".into(),
            target_value: target,
            daily_target: daily,
            baseline_value: 0.0,
            points_reward: 150,
            starts_at: start(),
            ends_at: start() + Duration::days(7),
            created_at: start(),
        };
        ChallengeProgress::new(definition, start())
    }

    fn meal(
        user: UserId,
        food: &str,
        protein: f64,
        calories: f64,
        when: DateTime<Utc>,
    ) -> MealEvent {
        MealEvent::new(
            user,
            food,
            "american",
            Nutrients::new(calories, protein, 10.0, 5.0),
            MealType::Lunch,
            when,
        )
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::with_config(TrackingConfig::default())
    }

    fn protein() -> ChallengeKind {
        ChallengeKind::NutrientTarget {
            nutrient: Nutrient::Protein,
        }
    }

    #[test]
    fn test_duplicate_event_applied_once() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, protein(), 500.0, None);
        let event = meal(user, "chicken", 31.0, 300.0, at(0, 12));

        assert!(tracker().apply_event(&mut progress, &event, at(0, 12)).is_some());
        assert!(tracker().apply_event(&mut progress, &event, at(0, 13)).is_none());
        assert!((progress.current_value - 31.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_with_shifted_day_applied_once() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, protein(), 500.0, None);
        let event = meal(user, "chicken", 31.0, 300.0, at(0, 23));
        let mut shifted = event.clone();
        shifted.timestamp = at(1, 0);

        assert!(tracker().apply_event(&mut progress, &event, at(0, 23)).is_some());
        assert!(tracker().apply_event(&mut progress, &shifted, at(1, 0)).is_none());
        assert!((progress.current_value - 31.0).abs() < f64::EPSILON);
        assert!(progress.has_applied(event.event_id));
    }

    #[test]
    fn test_completion_exact_threshold_and_single_award() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, protein(), 120.0, None);

        let d1 = tracker()
            .apply_event(&mut progress, &meal(user, "a", 119.0, 0.0, at(0, 8)), at(0, 8))
            .unwrap();
        assert_eq!(d1.status, ChallengeStatus::Active);
        assert_eq!(d1.points_awarded, 0);

        let d2 = tracker()
            .apply_event(&mut progress, &meal(user, "b", 1.0, 0.0, at(0, 9)), at(0, 9))
            .unwrap();
        assert!(d2.completed());
        assert_eq!(d2.points_awarded, 150);
        assert!((progress.completion_percentage - 100.0).abs() < f64::EPSILON);

        let extra = meal(user, "c", 10.0, 0.0, at(0, 10));
        assert!(tracker().apply_event(&mut progress, &extra, at(0, 10)).is_none());
        assert_eq!(progress.points_awarded, 150);
    }

    #[test]
    fn test_consistency_counts_first_event_per_day() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, ChallengeKind::ConsistencyStreak, 5.0, None);
        let times = [at(0, 8), at(0, 12), at(0, 19), at(1, 8)];
        for (i, when) in times.into_iter().enumerate() {
            let event = meal(user, &format!("food-{i}"), 10.0, 300.0, when);
            tracker().apply_event(&mut progress, &event, when);
        }
        assert!((progress.current_value - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_variety_credits_each_food_once() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, ChallengeKind::VarietyCount, 5.0, None);
        for when in [at(1, 12), at(3, 12)] {
            let salmon = meal(user, "salmon", 20.0, 300.0, when);
            assert!(tracker().apply_event(&mut progress, &salmon, when).is_some());
        }
        assert!((progress.current_value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_events_outside_window_ignored() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, protein(), 100.0, None);
        let before = meal(user, "a", 30.0, 0.0, start() - Duration::hours(1));
        let after = meal(user, "b", 30.0, 0.0, start() + Duration::days(7));
        assert!(tracker().apply_event(&mut progress, &before, at(0, 1)).is_none());
        assert!(tracker().apply_event(&mut progress, &after, at(0, 1)).is_none());
    }

    #[test]
    fn test_nutrient_target_ignores_events_without_nutrient() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, protein(), 100.0, None);
        let water = meal(user, "water", 0.0, 0.0, at(0, 9));
        assert!(tracker().apply_event(&mut progress, &water, at(0, 9)).is_none());
        assert!(progress.days.is_empty());
    }

    #[test]
    fn test_window_end_expires_incomplete_challenge() {
        let user = Uuid::new_v4();
        let mut progress = challenge(user, protein(), 100.0, None);
        let event = meal(user, "a", 40.0, 0.0, at(2, 12));
        tracker().apply_event(&mut progress, &event, at(2, 12));

        assert!(tracker().advance(&mut progress, at(6, 23)).is_none());
        let delta = tracker().advance(&mut progress, at(7, 0)).unwrap();
        assert_eq!(delta.status, ChallengeStatus::Expired);
        assert_eq!(progress.points_awarded, 0);
        assert!(tracker().advance(&mut progress, at(8, 0)).is_none());
    }

    #[test]
    fn test_goal_adherence_judges_days_on_rollover() {
        let user = Uuid::new_v4();
        let kind = ChallengeKind::GoalAdherence {
            nutrient: Nutrient::Calories,
            rule: AdherenceRule::Within { tolerance_pct: 0.1 },
        };
        let mut progress = challenge(user, kind, 2.0, Some(2000.0));

        for (food, calories, when) in [("a", 1200.0, at(0, 8)), ("b", 800.0, at(0, 19))] {
            tracker().apply_event(&mut progress, &meal(user, food, 0.0, calories, when), when);
        }
        // Day 0 is still open
        assert!(progress.current_value.abs() < f64::EPSILON);

        let next_day = meal(user, "c", 0.0, 500.0, at(1, 8));
        tracker().apply_event(&mut progress, &next_day, at(1, 8));
        assert!((progress.current_value - 1.0).abs() < f64::EPSILON);

        // Late event pushes day 0 above tolerance
        let late = meal(user, "d", 0.0, 600.0, at(0, 21));
        tracker().apply_event(&mut progress, &late, at(1, 9));
        assert!(progress.current_value.abs() < f64::EPSILON);
        assert!(!progress.days[&at(0, 0).date_naive()].achieved);
    }

    #[test]
    fn test_goal_adherence_completes_at_window_end() {
        let user = Uuid::new_v4();
        let kind = ChallengeKind::GoalAdherence {
            nutrient: Nutrient::Calories,
            rule: AdherenceRule::Within { tolerance_pct: 0.1 },
        };
        let mut progress = challenge(user, kind, 1.0, Some(2000.0));
        let last_day = meal(user, "a", 0.0, 2050.0, at(6, 12));
        tracker().apply_event(&mut progress, &last_day, at(6, 12));
        assert_eq!(progress.status, ChallengeStatus::Active);

        let delta = tracker().advance(&mut progress, at(7, 1)).unwrap();
        assert_eq!(delta.status, ChallengeStatus::Completed);
        assert_eq!(delta.points_awarded, 150);
    }

    #[test]
    fn test_other_users_events_ignored() {
        let mut progress = challenge(Uuid::new_v4(), protein(), 100.0, None);
        let event = meal(Uuid::new_v4(), "a", 50.0, 0.0, at(0, 12));
        assert!(tracker().apply_event(&mut progress, &event, at(0, 12)).is_none());
    }
}
