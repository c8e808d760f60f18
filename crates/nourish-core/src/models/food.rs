// ABOUTME: Reference food models used as recommendation candidates
// ABOUTME: CandidateItem, HealthTag, DietaryRestriction, HealthConstraint and CandidateFilter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::{FoodId, MealType, Nutrients};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Property of a food relevant to diets and health conditions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthTag {
    /// Contains no meat or fish
    Vegetarian,
    /// Contains no animal products
    Vegan,
    /// Contains no gluten
    GlutenFree,
    /// Contains no dairy
    DairyFree,
    /// Contains no tree nuts or peanuts
    NutFree,
    /// Prepared according to halal rules
    Halal,
    /// Prepared according to kosher rules
    Kosher,
    /// Low in sodium
    LowSodium,
    /// Low in added sugar
    LowSugar,
    /// Suitable for blood sugar management
    DiabeticFriendly,
    /// Suitable for cardiovascular health
    HeartHealthy,
    /// Protein dense
    HighProtein,
    /// Fiber dense
    HighFiber,
}

/// Hard dietary exclusion; violating items are never recommended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DietaryRestriction {
    /// Vegetarian diet
    Vegetarian,
    /// Vegan diet
    Vegan,
    /// Gluten-free diet
    GlutenFree,
    /// Dairy-free diet
    DairyFree,
    /// Nut allergy
    NutFree,
    /// Halal diet
    Halal,
    /// Kosher diet
    Kosher,
}

impl DietaryRestriction {
    /// Tag an item must carry to comply
    #[must_use]
    pub const fn required_tag(&self) -> HealthTag {
        match self {
            Self::Vegetarian => HealthTag::Vegetarian,
            Self::Vegan => HealthTag::Vegan,
            Self::GlutenFree => HealthTag::GlutenFree,
            Self::DairyFree => HealthTag::DairyFree,
            Self::NutFree => HealthTag::NutFree,
            Self::Halal => HealthTag::Halal,
            Self::Kosher => HealthTag::Kosher,
        }
    }
}

/// Soft health preference; reduces but never eliminates a candidate's score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthConstraint {
    /// Prefer diabetic-friendly or low-sugar foods
    Diabetes,
    /// Prefer low-sodium or heart-healthy foods
    Hypertension,
    /// Prefer protein-dense foods
    HighProtein,
    /// Prefer fiber-dense foods
    HighFiber,
}

impl HealthConstraint {
    /// Whether the item satisfies this constraint
    ///
    /// Protein and fiber preferences accept either the tag or a per-serving amount at
    /// or above the given threshold.
    #[must_use]
    pub fn is_satisfied_by(
        &self,
        item: &CandidateItem,
        high_protein_g: f64,
        high_fiber_g: f64,
    ) -> bool {
        match self {
            Self::Diabetes => {
                item.has_tag(HealthTag::DiabeticFriendly) || item.has_tag(HealthTag::LowSugar)
            }
            Self::Hypertension => {
                item.has_tag(HealthTag::LowSodium) || item.has_tag(HealthTag::HeartHealthy)
            }
            Self::HighProtein => {
                item.has_tag(HealthTag::HighProtein) || item.nutrients.protein_g >= high_protein_g
            }
            Self::HighFiber => {
                item.has_tag(HealthTag::HighFiber) || item.nutrients.fiber_g >= high_fiber_g
            }
        }
    }
}

/// A reference food that may be recommended. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Food identifier
    pub food_id: FoodId,
    /// Display name
    pub name: String,
    /// Cuisine
    #[serde(default)]
    pub cuisine: String,
    /// Nutrients per serving
    pub nutrients: Nutrients,
    /// Dietary and health properties
    #[serde(default)]
    pub health_tags: BTreeSet<HealthTag>,
    /// Meals this food is appropriate for
    #[serde(default)]
    pub meal_types: BTreeSet<MealType>,
}

impl CandidateItem {
    /// Create an item without tags or meal types
    #[must_use]
    pub fn new(
        food_id: impl Into<FoodId>,
        name: impl Into<String>,
        cuisine: impl Into<String>,
        nutrients: Nutrients,
    ) -> Self {
        Self {
            food_id: food_id.into(),
            name: name.into(),
            cuisine: cuisine.into(),
            nutrients,
            health_tags: BTreeSet::new(),
            meal_types: BTreeSet::new(),
        }
    }

    /// Add health tags
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = HealthTag>) -> Self {
        self.health_tags.extend(tags);
        self
    }

    /// Add appropriate meal types
    #[must_use]
    pub fn with_meal_types(mut self, meal_types: impl IntoIterator<Item = MealType>) -> Self {
        self.meal_types.extend(meal_types);
        self
    }

    /// Whether the item carries the tag
    #[must_use]
    pub fn has_tag(&self, tag: HealthTag) -> bool {
        self.health_tags.contains(&tag)
    }

    /// Whether the item complies with a hard restriction
    #[must_use]
    pub fn complies_with(&self, restriction: DietaryRestriction) -> bool {
        // Vegan food is vegetarian as well
        self.has_tag(restriction.required_tag())
            || (restriction == DietaryRestriction::Vegetarian && self.has_tag(HealthTag::Vegan))
    }

    /// Whether the item is tagged for the meal type
    #[must_use]
    pub fn suits(&self, meal_type: MealType) -> bool {
        self.meal_types.contains(&meal_type)
    }

    /// Case-normalized cuisine
    #[must_use]
    pub fn cuisine_key(&self) -> String {
        self.cuisine.trim().to_lowercase()
    }
}

/// Query passed to a candidate source. Also the key of the last-good candidate cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateFilter {
    /// Hard restrictions every returned item must satisfy
    #[serde(default)]
    pub restrictions: BTreeSet<DietaryRestriction>,
    /// Limit to one cuisine (case-insensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

impl CandidateFilter {
    /// Filter applying the given restrictions
    #[must_use]
    pub fn with_restrictions(restrictions: impl IntoIterator<Item = DietaryRestriction>) -> Self {
        Self {
            restrictions: restrictions.into_iter().collect(),
            cuisine: None,
        }
    }

    /// Whether an item passes the filter
    #[must_use]
    pub fn matches(&self, item: &CandidateItem) -> bool {
        let cuisine_ok = self
            .cuisine
            .as_ref()
            .is_none_or(|cuisine| cuisine.trim().to_lowercase() == item.cuisine_key());
        cuisine_ok && self.restrictions.iter().all(|r| item.complies_with(*r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vegan_items_satisfy_vegetarian_restriction() {
        let tofu = CandidateItem::new("tofu", "Tofu", "Asian", Nutrients::default())
            .with_tags([HealthTag::Vegan]);
        assert!(tofu.complies_with(DietaryRestriction::Vegetarian));
        assert!(tofu.complies_with(DietaryRestriction::Vegan));
        assert!(!tofu.complies_with(DietaryRestriction::GlutenFree));
    }

    #[test]
    fn test_high_protein_constraint_accepts_amount_or_tag() {
        let chicken = CandidateItem::new(
            "chicken",
            "Grilled chicken",
            "American",
            Nutrients::new(250.0, 31.0, 0.0, 4.0),
        );
        assert!(HealthConstraint::HighProtein.is_satisfied_by(&chicken, 15.0, 5.0));
        assert!(!HealthConstraint::HighFiber.is_satisfied_by(&chicken, 15.0, 5.0));
        assert!(!HealthConstraint::Hypertension.is_satisfied_by(&chicken, 15.0, 5.0));
    }

    #[test]
    fn test_filter_matches_cuisine_case_insensitively() {
        let filter = CandidateFilter {
            restrictions: BTreeSet::new(),
            cuisine: Some("Italian".into()),
        };
        let pasta = CandidateItem::new("pasta", "Pasta", "italian", Nutrients::default());
        let taco = CandidateItem::new("taco", "Taco", "mexican", Nutrients::default());
        assert!(filter.matches(&pasta));
        assert!(!filter.matches(&taco));
    }
}
