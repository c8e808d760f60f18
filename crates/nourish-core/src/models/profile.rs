// ABOUTME: Learned preference profile models
// ABOUTME: PreferenceProfile, MacroRatio and ConfidenceBand definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::confidence::{BUILDING_THRESHOLD, EXCELLENT_THRESHOLD, GOOD_THRESHOLD};
use crate::constants::learner::{NEUTRAL_CARBS_RATIO, NEUTRAL_FAT_RATIO, NEUTRAL_PROTEIN_RATIO};
use crate::models::{MealType, UserId};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Protein, carbohydrate and fat shares of macro energy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    /// Protein share
    pub protein: f64,
    /// Carbohydrate share
    pub carbs: f64,
    /// Fat share
    pub fat: f64,
}

impl MacroRatio {
    /// L1 distance between two ratios, in `[0, 2]` for normalized ratios
    #[must_use]
    pub fn l1_distance(&self, other: &Self) -> f64 {
        (self.protein - other.protein).abs()
            + (self.carbs - other.carbs).abs()
            + (self.fat - other.fat).abs()
    }

    /// Sum of the three shares
    #[must_use]
    pub fn total(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }
}

impl Default for MacroRatio {
    fn default() -> Self {
        Self {
            protein: NEUTRAL_PROTEIN_RATIO,
            carbs: NEUTRAL_CARBS_RATIO,
            fat: NEUTRAL_FAT_RATIO,
        }
    }
}

/// Qualitative reading of profile confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    /// Below 0.2: recommendations are mostly generic
    Insufficient,
    /// 0.2 to 0.5
    Building,
    /// 0.5 to 0.8
    Good,
    /// 0.8 and above
    Excellent,
}

impl ConfidenceBand {
    /// Band containing the confidence value
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if confidence >= GOOD_THRESHOLD {
            Self::Good
        } else if confidence >= BUILDING_THRESHOLD {
            Self::Building
        } else {
            Self::Insufficient
        }
    }
}

/// Learned eating preferences of one user
///
/// Recomputed in place whenever the user's event history changes; never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Owner of the profile
    pub user_id: UserId,
    /// Recency-weighted cuisine frequencies, summing to 1 (empty without data)
    pub cuisine_weights: BTreeMap<String, f64>,
    /// Recency-weighted macro energy shares
    pub macro_ratio: MacroRatio,
    /// Median time of day each meal type is logged
    pub meal_timing_pattern: BTreeMap<MealType, NaiveTime>,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Band of the confidence value
    pub confidence_band: ConfidenceBand,
    /// Distinct UTC days with at least one event in the learning window
    pub distinct_days_observed: u32,
    /// Events inside the learning window
    pub events_considered: usize,
    /// Total events in the user's log when the profile was computed
    #[serde(default)]
    pub source_event_count: usize,
    /// Timestamp of the newest event in the log when computed
    pub last_event_at: Option<DateTime<Utc>>,
    /// When the profile was computed
    pub computed_at: DateTime<Utc>,
}

impl PreferenceProfile {
    /// Profile of a user without usable history
    #[must_use]
    pub fn neutral(user_id: UserId, computed_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            cuisine_weights: BTreeMap::new(),
            macro_ratio: MacroRatio::default(),
            meal_timing_pattern: BTreeMap::new(),
            confidence: 0.0,
            confidence_band: ConfidenceBand::Insufficient,
            distinct_days_observed: 0,
            events_considered: 0,
            source_event_count: 0,
            last_event_at: None,
            computed_at,
        }
    }

    /// Weight of a cuisine (case-insensitive), 0 when unseen
    #[must_use]
    pub fn cuisine_weight(&self, cuisine: &str) -> f64 {
        self.cuisine_weights
            .get(&cuisine.trim().to_lowercase())
            .copied()
            .unwrap_or(0.0)
    }

    /// Weight of the most preferred cuisine
    #[must_use]
    pub fn top_cuisine(&self) -> Option<(&str, f64)> {
        self.cuisine_weights
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, weight)| (name.as_str(), *weight))
    }

    /// Whether the profile no longer reflects the event log
    ///
    /// A profile is stale when events were appended since it was computed (count or
    /// newest timestamp changed) or when it is older than `max_age`.
    #[must_use]
    pub fn is_stale(
        &self,
        event_count: usize,
        last_event_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> bool {
        self.source_event_count != event_count
            || self.last_event_at != last_event_at
            || now - self.computed_at > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_confidence(0.0), ConfidenceBand::Insufficient);
        assert_eq!(ConfidenceBand::from_confidence(0.2), ConfidenceBand::Building);
        assert_eq!(ConfidenceBand::from_confidence(0.79), ConfidenceBand::Good);
        assert_eq!(ConfidenceBand::from_confidence(1.0), ConfidenceBand::Excellent);
    }

    #[test]
    fn test_staleness_checks_count_timestamp_and_age() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let mut profile = PreferenceProfile::neutral(Uuid::new_v4(), now);
        profile.source_event_count = 4;
        profile.last_event_at = Some(now);

        let hour = Duration::hours(1);
        assert!(!profile.is_stale(4, Some(now), now, hour));
        assert!(profile.is_stale(5, Some(now), now, hour));
        assert!(profile.is_stale(4, Some(now + hour), now, hour));
        assert!(profile.is_stale(4, Some(now), now + Duration::hours(2), hour));
    }
}
