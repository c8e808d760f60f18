// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides engine construction, meal builders and challenge fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::too_many_arguments
)]
//! Shared test utilities for `nourish_engine`

use chrono::{DateTime, Duration, TimeZone, Utc};
use nourish_engine::candidates::StaticCandidateSource;
use nourish_engine::config::{EngineConfig, PersonalizationConfig};
use nourish_engine::engine::PersonalizationEngine;
use nourish_engine::models::{
    CandidateItem, ChallengeDefinition, ChallengeDifficulty, ChallengeDimension, ChallengeKind,
    ChallengeProgress, HealthTag, MealEvent, MealType, Nutrient, Nutrients, UserId,
};
use nourish_engine::storage::memory::InMemoryStore;
use nourish_engine::storage::ChallengeStore;
use std::env;
use std::sync::{Arc, Once};
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Monday 2025-06-02 00:00 UTC, the start of every fixture week
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

/// `day` days after [`monday`] at `hour`:00 UTC
pub fn at(day: i64, hour: u32) -> DateTime<Utc> {
    monday() + Duration::days(day) + Duration::hours(i64::from(hour))
}

/// Meal with the conventional meal type for its hour
pub fn meal(
    user_id: UserId,
    food: &str,
    cuisine: &str,
    nutrients: Nutrients,
    timestamp: DateTime<Utc>,
) -> MealEvent {
    MealEvent::new(
        user_id,
        food,
        cuisine,
        nutrients,
        MealType::infer_from_time(timestamp),
        timestamp,
    )
}

/// Nutrients carrying `grams` of protein
pub fn protein(grams: f64) -> Nutrients {
    Nutrients::new(grams.mul_add(4.0, 200.0), grams, 25.0, 8.0)
}

/// A small catalog spanning cuisines, meal types and tags
pub fn catalog() -> Vec<CandidateItem> {
    vec![
        CandidateItem::new(
            "chicken-rice-bowl",
            "Chicken Rice Bowl",
            "Japanese",
            Nutrients::new(550.0, 40.0, 60.0, 12.0),
        )
        .with_tags([HealthTag::HighProtein])
        .with_meal_types([MealType::Lunch, MealType::Dinner]),
        CandidateItem::new(
            "miso-soup",
            "Miso Soup",
            "Japanese",
            Nutrients::new(80.0, 6.0, 8.0, 3.0),
        )
        .with_tags([HealthTag::Vegan])
        .with_meal_types([MealType::Lunch, MealType::Dinner]),
        CandidateItem::new(
            "greek-yogurt",
            "Greek Yogurt Parfait",
            "Greek",
            Nutrients::new(250.0, 20.0, 30.0, 5.0),
        )
        .with_tags([HealthTag::Vegetarian, HealthTag::HighProtein])
        .with_meal_types([MealType::Breakfast, MealType::Snack]),
        CandidateItem::new(
            "lentil-salad",
            "Lentil Salad",
            "Mediterranean",
            Nutrients::new(350.0, 18.0, 45.0, 9.0).with_fiber(14.0),
        )
        .with_tags([HealthTag::Vegan, HealthTag::HighFiber])
        .with_meal_types([MealType::Lunch]),
        CandidateItem::new(
            "beef-tacos",
            "Beef Tacos",
            "Mexican",
            Nutrients::new(650.0, 32.0, 50.0, 30.0),
        )
        .with_meal_types([MealType::Dinner]),
    ]
}

/// Engine over `store` serving `items`, with default configuration
pub fn engine_with(store: &InMemoryStore, items: Vec<CandidateItem>) -> PersonalizationEngine {
    init_test_logging();
    PersonalizationEngine::with_config(
        Arc::new(store.clone()),
        Arc::new(StaticCandidateSource::new(items)),
        EngineConfig::default(),
        &PersonalizationConfig::<true>::default(),
    )
}

/// Fresh store and an engine over it serving [`catalog`]
pub fn test_engine() -> (PersonalizationEngine, InMemoryStore) {
    let store = InMemoryStore::new();
    let engine = engine_with(&store, catalog());
    (engine, store)
}

/// Active challenge running `days` days from `starts_at`
pub fn challenge(
    user_id: UserId,
    dimension: ChallengeDimension,
    kind: ChallengeKind,
    target_value: f64,
    daily_target: Option<f64>,
    starts_at: DateTime<Utc>,
    days: i64,
    points_reward: u32,
) -> ChallengeProgress {
    let definition = ChallengeDefinition {
        challenge_id: Uuid::new_v4(),
        user_id,
        kind,
        dimension,
        title: format!("{dimension} fixture"),
        description: String::new(),
        difficulty: ChallengeDifficulty::Medium,
        unit: String::new(),
        target_value,
        daily_target,
        baseline_value: 0.0,
        points_reward,
        starts_at,
        ends_at: starts_at + Duration::days(days),
        created_at: starts_at,
    };
    ChallengeProgress::new(definition, starts_at)
}

/// Weekly protein challenge starting [`monday`]
pub fn protein_challenge(
    user_id: UserId,
    target_value: f64,
    daily: Option<f64>,
) -> ChallengeProgress {
    challenge(
        user_id,
        ChallengeDimension::Protein,
        ChallengeKind::NutrientTarget {
            nutrient: Nutrient::Protein,
        },
        target_value,
        daily,
        monday(),
        7,
        150,
    )
}

/// Weekly "try new foods" challenge starting [`monday`]
pub fn variety_challenge(user_id: UserId, target_value: f64) -> ChallengeProgress {
    challenge(
        user_id,
        ChallengeDimension::Variety,
        ChallengeKind::VarietyCount,
        target_value,
        None,
        monday(),
        7,
        130,
    )
}

/// Store a challenge directly
pub async fn seed(store: &InMemoryStore, progress: &ChallengeProgress) {
    assert!(store.insert_challenge(progress).await.unwrap());
}

/// Stored state of a challenge
pub async fn stored(store: &InMemoryStore, progress: &ChallengeProgress) -> ChallengeProgress {
    store
        .get_challenge(progress.challenge_id())
        .await
        .unwrap()
        .unwrap()
}
