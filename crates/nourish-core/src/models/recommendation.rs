// ABOUTME: Recommendation request and result models
// ABOUTME: RecommendationContext, ScoreBreakdown, Recommendation and ranking outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::{CandidateItem, DietaryRestriction, FoodId, HealthConstraint, MealType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Situation a recommendation is requested for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    /// Requested meal; inferred from `requested_at` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    /// Time of the request
    pub requested_at: DateTime<Utc>,
    /// Foods eaten recently; these lose the variety bonus
    #[serde(default)]
    pub recent_food_ids: BTreeSet<FoodId>,
    /// Hard exclusions
    #[serde(default)]
    pub restrictions: BTreeSet<DietaryRestriction>,
    /// Soft preferences
    #[serde(default)]
    pub health_constraints: BTreeSet<HealthConstraint>,
}

impl RecommendationContext {
    /// Context with no meal type, restrictions or history
    #[must_use]
    pub const fn new(requested_at: DateTime<Utc>) -> Self {
        Self {
            meal_type: None,
            requested_at,
            recent_food_ids: BTreeSet::new(),
            restrictions: BTreeSet::new(),
            health_constraints: BTreeSet::new(),
        }
    }

    /// Set the meal type
    #[must_use]
    pub const fn for_meal(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }

    /// Add recently eaten foods
    #[must_use]
    pub fn with_recent_foods(mut self, foods: impl IntoIterator<Item = FoodId>) -> Self {
        self.recent_food_ids.extend(foods);
        self
    }

    /// Add hard restrictions
    #[must_use]
    pub fn with_restrictions(
        mut self,
        restrictions: impl IntoIterator<Item = DietaryRestriction>,
    ) -> Self {
        self.restrictions.extend(restrictions);
        self
    }

    /// Add soft health constraints
    #[must_use]
    pub fn with_health_constraints(
        mut self,
        constraints: impl IntoIterator<Item = HealthConstraint>,
    ) -> Self {
        self.health_constraints.extend(constraints);
        self
    }

    /// Requested meal type, or the one conventional at the request time
    #[must_use]
    pub fn effective_meal_type(&self) -> MealType {
        self.meal_type
            .unwrap_or_else(|| MealType::infer_from_time(self.requested_at))
    }
}

/// A scoring factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    /// Cuisine matches learned preferences
    CuisineAlignment,
    /// Macro balance matches learned preferences
    MacroAlignment,
    /// Suited to the requested meal
    ContextFit,
    /// Satisfies health constraints
    HealthCompatibility,
    /// Not eaten recently
    VarietyBonus,
}

impl ScoreFactor {
    /// All factors in declaration order
    pub const ALL: [Self; 5] = [
        Self::CuisineAlignment,
        Self::MacroAlignment,
        Self::ContextFit,
        Self::HealthCompatibility,
        Self::VarietyBonus,
    ];
}

/// Normalized sub-scores of a candidate, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Cuisine alignment
    pub cuisine_alignment: f64,
    /// Macro alignment
    pub macro_alignment: f64,
    /// Meal context fit
    pub context_fit: f64,
    /// Health compatibility
    pub health_compatibility: f64,
    /// Variety bonus
    pub variety_bonus: f64,
}

impl ScoreBreakdown {
    /// Sub-score of one factor
    #[must_use]
    pub const fn get(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::CuisineAlignment => self.cuisine_alignment,
            ScoreFactor::MacroAlignment => self.macro_alignment,
            ScoreFactor::ContextFit => self.context_fit,
            ScoreFactor::HealthCompatibility => self.health_compatibility,
            ScoreFactor::VarietyBonus => self.variety_bonus,
        }
    }
}

/// A ranked candidate. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended food
    pub item: CandidateItem,
    /// Weighted score in `[0, 1]`
    pub score: f64,
    /// Human-readable explanation
    pub reason: String,
    /// Factor contributing most to the score
    pub primary_factor: ScoreFactor,
    /// Normalized sub-scores
    pub breakdown: ScoreBreakdown,
}

/// How a ranking request resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RankingOutcome {
    /// At least `k` eligible candidates were ranked
    Ranked,
    /// Fewer eligible candidates than requested
    Insufficient {
        /// Eligible candidates
        eligible: usize,
        /// Requested count
        requested: usize,
    },
    /// The candidate pool was empty
    EmptyPool,
    /// Every candidate violated a hard restriction
    AllExcluded {
        /// Candidates excluded
        excluded: usize,
    },
    /// The request asked for zero recommendations
    NoneRequested,
}

/// Ranked recommendations together with the outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Top recommendations, best first
    pub recommendations: Vec<Recommendation>,
    /// How the request resolved
    pub outcome: RankingOutcome,
}

impl Ranking {
    /// Ranking with no recommendations
    #[must_use]
    pub const fn empty(outcome: RankingOutcome) -> Self {
        Self {
            recommendations: Vec::new(),
            outcome,
        }
    }
}
