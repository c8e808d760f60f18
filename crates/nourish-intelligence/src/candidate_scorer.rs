// ABOUTME: Candidate scorer ranking reference foods against a preference profile
// ABOUTME: Weighted sub-scores, hard dietary exclusion, deterministic top-K with explanations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Candidate Scorer
//!
//! Ranks [`CandidateItem`]s for a user. Each item gets five independently normalized
//! sub-scores in `[0, 1]`:
//!
//! - **cuisine alignment**: profile weight of the item's cuisine relative to the
//!   profile's strongest cuisine
//! - **macro alignment**: `1 - L1(item, profile) / 2` over macro energy shares
//! - **context fit**: whether the item is tagged for the requested meal
//! - **health compatibility**: share of soft health constraints the item satisfies
//! - **variety bonus**: whether the item was eaten recently
//!
//! The final score is their weighted sum. Items violating a hard dietary restriction
//! are dropped before scoring. Ordering is by score descending, then food id
//! ascending, so identical inputs always produce identical rankings.

use crate::config::intelligence::{PersonalizationConfig, ScoringConfig};
use nourish_core::models::{
    CandidateItem, HealthConstraint, PreferenceProfile, Ranking, RankingOutcome, Recommendation,
    RecommendationContext, ScoreBreakdown, ScoreFactor,
};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Reason used when no factor contributes
const DEFAULT_REASON: &str = "Well-balanced nutritional choice";

/// Scores and ranks candidate foods
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    config: ScoringConfig,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateScorer {
    /// Create a scorer using the global configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PersonalizationConfig::global().scoring.clone(),
        }
    }

    /// Create with custom configuration
    #[must_use]
    pub const fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rank candidates and return the top `k` with the ranking outcome
    #[must_use]
    pub fn rank(
        &self,
        profile: &PreferenceProfile,
        candidates: &[CandidateItem],
        context: &RecommendationContext,
        k: usize,
    ) -> Ranking {
        if k == 0 {
            return Ranking::empty(RankingOutcome::NoneRequested);
        }
        if candidates.is_empty() {
            return Ranking::empty(RankingOutcome::EmptyPool);
        }

        let eligible: Vec<&CandidateItem> = candidates
            .iter()
            .filter(|item| context.restrictions.iter().all(|r| item.complies_with(*r)))
            .collect();
        if eligible.is_empty() {
            return Ranking::empty(RankingOutcome::AllExcluded {
                excluded: candidates.len(),
            });
        }

        let mut recommendations: Vec<Recommendation> = eligible
            .par_iter()
            .map(|item| self.score(profile, item, context))
            .collect();
        recommendations.sort_by(compare_recommendations);
        recommendations.truncate(k);

        let outcome = if eligible.len() < k {
            RankingOutcome::Insufficient {
                eligible: eligible.len(),
                requested: k,
            }
        } else {
            RankingOutcome::Ranked
        };

        Ranking {
            recommendations,
            outcome,
        }
    }

    /// Score a single candidate
    ///
    /// Does not apply hard restrictions; [`Self::rank`] filters those first.
    #[must_use]
    pub fn score(
        &self,
        profile: &PreferenceProfile,
        item: &CandidateItem,
        context: &RecommendationContext,
    ) -> Recommendation {
        let breakdown = ScoreBreakdown {
            cuisine_alignment: self.cuisine_alignment(profile, item),
            macro_alignment: self.macro_alignment(profile, item),
            context_fit: self.context_fit(item, context),
            health_compatibility: self.health_compatibility(item, context),
            variety_bonus: Self::variety_bonus(item, context),
        };

        let weights = &self.config.weights;
        let score = ScoreFactor::ALL
            .iter()
            .map(|factor| weights.weight(*factor) * breakdown.get(*factor))
            .sum::<f64>()
            .clamp(0.0, 1.0);

        let (primary_factor, contribution) = ScoreFactor::ALL
            .iter()
            .map(|factor| (*factor, weights.weight(*factor) * breakdown.get(*factor)))
            .fold((ScoreFactor::CuisineAlignment, f64::NEG_INFINITY), |best, current| {
                if current.1 > best.1 {
                    current
                } else {
                    best
                }
            });

        let reason = if contribution > 0.0 {
            self.reason(primary_factor, item, context)
        } else {
            DEFAULT_REASON.to_owned()
        };

        Recommendation {
            item: item.clone(),
            score,
            reason,
            primary_factor,
            breakdown,
        }
    }

    fn cuisine_alignment(&self, profile: &PreferenceProfile, item: &CandidateItem) -> f64 {
        let Some((_, top_weight)) = profile.top_cuisine() else {
            return self.config.thresholds.neutral_subscore;
        };
        if top_weight <= 0.0 {
            return self.config.thresholds.neutral_subscore;
        }
        (profile.cuisine_weight(&item.cuisine) / top_weight).clamp(0.0, 1.0)
    }

    fn macro_alignment(&self, profile: &PreferenceProfile, item: &CandidateItem) -> f64 {
        item.nutrients.macro_ratio().map_or(
            self.config.thresholds.neutral_subscore,
            |ratio| (1.0 - ratio.l1_distance(&profile.macro_ratio) / 2.0).clamp(0.0, 1.0),
        )
    }

    fn context_fit(&self, item: &CandidateItem, context: &RecommendationContext) -> f64 {
        if item.suits(context.effective_meal_type()) {
            1.0
        } else {
            self.config.thresholds.context_mismatch_score
        }
    }

    fn health_compatibility(&self, item: &CandidateItem, context: &RecommendationContext) -> f64 {
        if context.health_constraints.is_empty() {
            return 1.0;
        }
        let satisfied = context
            .health_constraints
            .iter()
            .filter(|c| self.satisfies(**c, item))
            .count();
        satisfied as f64 / context.health_constraints.len() as f64
    }

    fn variety_bonus(item: &CandidateItem, context: &RecommendationContext) -> f64 {
        if context.recent_food_ids.contains(&item.food_id) {
            0.0
        } else {
            1.0
        }
    }

    fn satisfies(&self, constraint: HealthConstraint, item: &CandidateItem) -> bool {
        constraint.is_satisfied_by(
            item,
            self.config.thresholds.high_protein_g,
            self.config.thresholds.high_fiber_g,
        )
    }

    fn reason(
        &self,
        factor: ScoreFactor,
        item: &CandidateItem,
        context: &RecommendationContext,
    ) -> String {
        match factor {
            ScoreFactor::CuisineAlignment if !item.cuisine.trim().is_empty() => {
                format!("Matches your love for {} cuisine", item.cuisine.trim())
            }
            ScoreFactor::CuisineAlignment => DEFAULT_REASON.to_owned(),
            ScoreFactor::MacroAlignment => "Fits your usual macro balance".to_owned(),
            ScoreFactor::ContextFit => {
                format!("A good choice for {}", context.effective_meal_type())
            }
            ScoreFactor::HealthCompatibility => {
                let wants = |c: HealthConstraint| {
                    context.health_constraints.contains(&c) && self.satisfies(c, item)
                };
                if wants(HealthConstraint::HighProtein) {
                    "High in protein - helps meet your goals".to_owned()
                } else if wants(HealthConstraint::HighFiber) {
                    "Rich in fiber".to_owned()
                } else {
                    "Fits your health preferences".to_owned()
                }
            }
            ScoreFactor::VarietyBonus => "Something new to add variety".to_owned(),
        }
    }
}

/// Score descending, then food id ascending
fn compare_recommendations(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item.food_id.cmp(&b.item.food_id))
}
