// ABOUTME: Meal event models for logged food intake
// ABOUTME: MealEvent, MealType, Nutrients, Nutrient and identifier definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::energy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use crate::errors::{AppResult, EngineError};
use crate::models::MacroRatio;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a user
pub type UserId = Uuid;
/// Identifier of a meal event
pub type EventId = Uuid;
/// Identifier of a challenge
pub type ChallengeId = Uuid;

/// Identifier of a reference food
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(String);

impl FoodId {
    /// Create a food id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty or whitespace
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FoodId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FoodId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Type of meal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Breakfast meal
    Breakfast,
    /// Lunch meal
    Lunch,
    /// Dinner meal
    Dinner,
    /// Snack between meals
    Snack,
    /// Unspecified or other meal type
    Other,
}

impl MealType {
    /// Parse meal type from string
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "dinner" => Self::Dinner,
            "snack" => Self::Snack,
            _ => Self::Other,
        }
    }

    /// Meal type conventionally eaten at the given hour of day (0-23)
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=10 => Self::Breakfast,
            11..=14 => Self::Lunch,
            17..=21 => Self::Dinner,
            _ => Self::Snack,
        }
    }

    /// Meal type inferred from a timestamp's UTC hour
    #[must_use]
    pub fn infer_from_time(at: DateTime<Utc>) -> Self {
        Self::from_hour(at.hour())
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A nutrient tracked by challenges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    /// Energy (kcal)
    Calories,
    /// Protein (g)
    Protein,
    /// Carbohydrates (g)
    Carbohydrates,
    /// Fat (g)
    Fat,
    /// Dietary fiber (g)
    Fiber,
}

impl Nutrient {
    /// Measurement unit
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Calories => "kcal",
            Self::Protein | Self::Carbohydrates | Self::Fat | Self::Fiber => "g",
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Carbohydrates => "carbohydrates",
            Self::Fat => "fat",
            Self::Fiber => "fiber",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrient amounts of one serving or logged meal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Fiber in grams
    #[serde(default)]
    pub fiber_g: f64,
}

impl Nutrients {
    /// Create nutrients without fiber
    #[must_use]
    pub const fn new(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g: 0.0,
        }
    }

    /// Set the fiber amount
    #[must_use]
    pub const fn with_fiber(mut self, fiber_g: f64) -> Self {
        self.fiber_g = fiber_g;
        self
    }

    /// Amount of a single nutrient
    #[must_use]
    pub const fn amount(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein_g,
            Nutrient::Carbohydrates => self.carbs_g,
            Nutrient::Fat => self.fat_g,
            Nutrient::Fiber => self.fiber_g,
        }
    }

    /// Energy contributed by protein, carbohydrates and fat (kcal)
    #[must_use]
    pub fn macro_energy_kcal(&self) -> f64 {
        self.fat_g.mul_add(
            KCAL_PER_G_FAT,
            self.protein_g
                .mul_add(KCAL_PER_G_PROTEIN, self.carbs_g * KCAL_PER_G_CARBS),
        )
    }

    /// Share of macro energy per macronutrient, `None` without macro energy
    #[must_use]
    pub fn macro_ratio(&self) -> Option<MacroRatio> {
        let total = self.macro_energy_kcal();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        Some(MacroRatio {
            protein: self.protein_g * KCAL_PER_G_PROTEIN / total,
            carbs: self.carbs_g * KCAL_PER_G_CARBS / total,
            fat: self.fat_g * KCAL_PER_G_FAT / total,
        })
    }

    /// Name of the first field that is negative or not finite
    #[must_use]
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
            ("fiber_g", self.fiber_g),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
        .map(|(name, _)| name)
    }
}

/// A logged meal. Immutable once appended to the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEvent {
    /// Unique event id, used for idempotent processing
    pub event_id: EventId,
    /// User who logged the meal
    pub user_id: UserId,
    /// Food that was eaten
    pub food_id: FoodId,
    /// Cuisine of the food
    #[serde(default)]
    pub cuisine: String,
    /// Nutrient amounts eaten
    pub nutrients: Nutrients,
    /// Meal slot
    pub meal_type: MealType,
    /// When the meal was eaten
    pub timestamp: DateTime<Utc>,
}

impl MealEvent {
    /// Create an event with a fresh random id
    #[must_use]
    pub fn new(
        user_id: UserId,
        food_id: impl Into<FoodId>,
        cuisine: impl Into<String>,
        nutrients: Nutrients,
        meal_type: MealType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id,
            food_id: food_id.into(),
            cuisine: cuisine.into(),
            nutrients,
            meal_type,
            timestamp,
        }
    }

    /// Replace the event id
    #[must_use]
    pub const fn with_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    /// UTC calendar day the meal belongs to
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Case-normalized cuisine, `None` when blank
    #[must_use]
    pub fn cuisine_key(&self) -> Option<String> {
        let trimmed = self.cuisine.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    /// Reject events with missing ids or malformed nutrients
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEvent`] describing the first problem found
    pub fn validate(&self) -> AppResult<()> {
        if self.event_id.is_nil() {
            return Err(EngineError::invalid_event(self.event_id, "missing event id"));
        }
        if self.user_id.is_nil() {
            return Err(EngineError::invalid_event(self.event_id, "missing user id"));
        }
        if self.food_id.is_blank() {
            return Err(EngineError::invalid_event(self.event_id, "missing food id"));
        }
        if let Some(field) = self.nutrients.invalid_field() {
            return Err(EngineError::invalid_event(
                self.event_id,
                format!("{field} must be a finite non-negative number"),
            ));
        }
        Ok(())
    }
}
