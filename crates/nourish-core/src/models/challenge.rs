// ABOUTME: Challenge definition and progress models
// ABOUTME: ChallengeKind tagged variants, lifecycle status, day-bucketed progress and deltas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::{ChallengeId, EventId, FoodId, MealEvent, Nutrient, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Behavioral dimension a challenge was generated from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeDimension {
    /// Daily protein intake
    Protein,
    /// Logging consistency
    Consistency,
    /// Food variety
    Variety,
    /// Staying near the calorie target
    CalorieAdherence,
    /// Daily fiber intake
    Fiber,
    /// Generic starter challenges for users with little history
    Onboarding,
}

impl ChallengeDimension {
    /// Tie-break rank when deficiencies are equal (lower ranks first)
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Protein => 0,
            Self::Consistency => 1,
            Self::Variety => 2,
            Self::CalorieAdherence => 3,
            Self::Fiber => 4,
            Self::Onboarding => 5,
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Consistency => "consistency",
            Self::Variety => "variety",
            Self::CalorieAdherence => "calorie_adherence",
            Self::Fiber => "fiber",
            Self::Onboarding => "onboarding",
        }
    }
}

impl fmt::Display for ChallengeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a day's total is compared with the daily target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AdherenceRule {
    /// Total must reach the target
    AtLeast,
    /// Total must not exceed the target
    AtMost,
    /// Total must be within a relative tolerance of the target
    Within {
        /// Accepted relative deviation (0.10 = ±10%)
        tolerance_pct: f64,
    },
}

impl AdherenceRule {
    /// Whether a day total satisfies the rule
    #[must_use]
    pub fn is_met(&self, value: f64, target: f64) -> bool {
        match self {
            Self::AtLeast => value >= target,
            Self::AtMost => value <= target,
            Self::Within { tolerance_pct } => (value - target).abs() <= target * tolerance_pct,
        }
    }
}

/// Semantic kind of a challenge, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Accumulate an amount of a nutrient over the window
    NutrientTarget {
        /// Nutrient being accumulated
        nutrient: Nutrient,
    },
    /// Log at least one meal on a number of days
    ConsistencyStreak,
    /// Eat a number of distinct foods
    VarietyCount,
    /// Meet a daily nutrient goal on a number of days
    GoalAdherence {
        /// Nutrient compared each day
        nutrient: Nutrient,
        /// Comparison rule
        rule: AdherenceRule,
    },
}

impl ChallengeKind {
    /// Whether an event can contribute to a challenge of this kind
    #[must_use]
    pub fn matches(&self, event: &MealEvent) -> bool {
        match self {
            Self::NutrientTarget { nutrient } => event.nutrients.amount(*nutrient) > 0.0,
            Self::ConsistencyStreak | Self::VarietyCount | Self::GoalAdherence { .. } => true,
        }
    }
}

/// Difficulty level, derived from how far the user is from the benchmark
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeDifficulty {
    /// Small gap
    Easy,
    /// Moderate gap
    Medium,
    /// Large gap
    Hard,
    /// Very large gap
    Expert,
}

impl ChallengeDifficulty {
    /// Difficulty for a normalized deficiency in `[0, 1]`
    #[must_use]
    pub fn from_deficiency(deficiency: f64) -> Self {
        if deficiency < 0.25 {
            Self::Easy
        } else if deficiency < 0.5 {
            Self::Medium
        } else if deficiency < 0.75 {
            Self::Hard
        } else {
            Self::Expert
        }
    }
}

/// Lifecycle state of a challenge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    /// Accepting progress
    Active,
    /// Target reached; terminal
    Completed,
    /// Window ended before completion; terminal
    Expired,
}

impl ChallengeStatus {
    /// Whether no further progress can be applied
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }
}

/// A personalized challenge. Immutable once active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDefinition {
    /// Challenge identifier
    pub challenge_id: ChallengeId,
    /// Owner
    pub user_id: UserId,
    /// Semantic kind
    pub kind: ChallengeKind,
    /// Dimension the challenge addresses
    pub dimension: ChallengeDimension,
    /// Short title
    pub title: String,
    /// User-facing description
    pub description: String,
    /// Difficulty level
    pub difficulty: ChallengeDifficulty,
    /// Unit of `target_value`
    pub unit: String,
    /// Value `current_value` must reach
    pub target_value: f64,
    /// Per-day target for nutrient and adherence kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_target: Option<f64>,
    /// Observed value the target was derived from
    pub baseline_value: f64,
    /// Points awarded on completion
    pub points_reward: u32,
    /// Inclusive window start
    pub starts_at: DateTime<Utc>,
    /// Exclusive window end
    pub ends_at: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl ChallengeDefinition {
    /// Stable id for a user's challenge on a dimension starting at a given instant
    #[must_use]
    pub fn deterministic_id(
        user_id: UserId,
        dimension: ChallengeDimension,
        starts_at: DateTime<Utc>,
        discriminator: &str,
    ) -> ChallengeId {
        let name = format!(
            "nourish:challenge:{user_id}:{dimension}:{discriminator}:{}",
            starts_at.timestamp()
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    /// Whether the timestamp falls inside `[starts_at, ends_at)`
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && at < self.ends_at
    }

    /// Whether the window has ended at `now`
    #[must_use]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }
}

/// Progress of a challenge on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Day of the bucket
    pub date: NaiveDate,
    /// Amount accumulated that day
    pub current_value: f64,
    /// Daily target for adherence and nutrient kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_target: Option<f64>,
    /// Whether the day met its target
    pub achieved: bool,
    /// Whether the day has been evaluated after rollover
    pub closed: bool,
    /// Events already applied to this bucket
    pub applied_event_ids: BTreeSet<EventId>,
}

impl DailyProgress {
    /// Empty bucket
    #[must_use]
    pub const fn new(date: NaiveDate, daily_target: Option<f64>) -> Self {
        Self {
            date,
            current_value: 0.0,
            daily_target,
            achieved: false,
            closed: false,
            applied_event_ids: BTreeSet::new(),
        }
    }
}

/// Progress of a challenge, day-bucketed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// The challenge
    pub definition: ChallengeDefinition,
    /// Lifecycle state
    pub status: ChallengeStatus,
    /// Progress toward `target_value`
    pub current_value: f64,
    /// `min(100, current / target * 100)`
    pub completion_percentage: f64,
    /// Points awarded so far (0 or the reward)
    pub points_awarded: u32,
    /// When the challenge completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Foods already counted by a variety challenge
    #[serde(default)]
    pub credited_food_ids: BTreeSet<FoodId>,
    /// Day buckets
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, DailyProgress>,
    /// Optimistic concurrency version, incremented on every save
    pub version: u64,
    /// Last modification
    pub updated_at: DateTime<Utc>,
}

impl ChallengeProgress {
    /// Fresh progress for a newly activated challenge
    #[must_use]
    pub fn new(definition: ChallengeDefinition, now: DateTime<Utc>) -> Self {
        Self {
            definition,
            status: ChallengeStatus::Active,
            current_value: 0.0,
            completion_percentage: 0.0,
            points_awarded: 0,
            completed_at: None,
            credited_food_ids: BTreeSet::new(),
            days: BTreeMap::new(),
            version: 0,
            updated_at: now,
        }
    }

    /// Challenge id
    #[must_use]
    pub const fn challenge_id(&self) -> ChallengeId {
        self.definition.challenge_id
    }

    /// Whether the event was already applied to this challenge, on any day
    ///
    /// A redelivered event may carry a different timestamp, so every bucket is checked.
    #[must_use]
    pub fn has_applied(&self, event_id: EventId) -> bool {
        self.days
            .values()
            .any(|bucket| bucket.applied_event_ids.contains(&event_id))
    }

    /// Whether the target has been reached
    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.current_value >= self.definition.target_value
    }

    /// Recompute `completion_percentage` from `current_value`
    pub fn refresh_completion(&mut self) {
        let target = self.definition.target_value;
        self.completion_percentage = if target > 0.0 {
            (self.current_value / target * 100.0).min(100.0)
        } else {
            100.0
        };
    }
}

/// Change made to one challenge by an event or time advance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgressDelta {
    /// Affected challenge
    pub challenge_id: ChallengeId,
    /// Event that caused the change; `None` for time advances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// Day bucket touched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
    /// Change of `current_value`
    pub value_delta: f64,
    /// `current_value` after the change
    pub current_value: f64,
    /// Completion after the change
    pub completion_percentage: f64,
    /// Status before the change
    pub previous_status: ChallengeStatus,
    /// Status after the change
    pub status: ChallengeStatus,
    /// Points awarded by this change
    pub points_awarded: u32,
}

impl ChallengeProgressDelta {
    /// Whether this change completed the challenge
    #[must_use]
    pub fn completed(&self) -> bool {
        self.previous_status == ChallengeStatus::Active
            && self.status == ChallengeStatus::Completed
    }
}
