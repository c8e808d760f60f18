// ABOUTME: End-to-end challenge scenarios driven through the personalization engine
// ABOUTME: Covers daily targets, variety credit, exact completion, adherence days and expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    at, challenge, meal, monday, protein, protein_challenge, seed, stored, test_engine,
    variety_challenge,
};
use nourish_engine::models::{
    AdherenceRule, ChallengeDimension, ChallengeKind, ChallengeStatus, Nutrient, Nutrients,
};
use uuid::Uuid;

#[tokio::test]
async fn test_three_meals_meet_daily_protein_goal() {
    let (engine, store) = test_engine();
    let user = Uuid::new_v4();
    let goal = challenge(
        user,
        ChallengeDimension::Protein,
        ChallengeKind::NutrientTarget {
            nutrient: Nutrient::Protein,
        },
        80.0,
        Some(80.0),
        monday(),
        1,
        150,
    );
    seed(&store, &goal).await;

    let breakfast = meal(user, "oatmeal", "American", protein(20.0), at(0, 8));
    let lunch = meal(user, "chicken-salad", "American", protein(35.0), at(0, 12));
    let dinner = meal(user, "salmon", "Japanese", protein(30.0), at(0, 19));

    let after_breakfast = engine.record_event_at(user, &breakfast, at(0, 8)).await;
    assert!((after_breakfast[0].current_value - 20.0).abs() < 1e-9);
    assert!((after_breakfast[0].completion_percentage - 25.0).abs() < 1e-9);

    let after_lunch = engine.record_event_at(user, &lunch, at(0, 12)).await;
    assert!((after_lunch[0].current_value - 55.0).abs() < 1e-9);
    assert_eq!(after_lunch[0].status, ChallengeStatus::Active);

    let after_dinner = engine.record_event_at(user, &dinner, at(0, 19)).await;
    assert_eq!(after_dinner.len(), 1);
    let delta = &after_dinner[0];
    assert!((delta.current_value - 85.0).abs() < 1e-9);
    assert!((delta.completion_percentage - 100.0).abs() < 1e-9);
    assert_eq!(delta.status, ChallengeStatus::Completed);
    assert!(delta.completed());
    assert_eq!(delta.points_awarded, 150);

    let progress = stored(&store, &goal).await;
    let day = progress.days.get(&monday().date_naive()).unwrap();
    assert!(day.achieved);
    assert_eq!(day.applied_event_ids.len(), 3);
    assert_eq!(progress.completed_at, Some(at(0, 19)));
}

#[tokio::test]
async fn test_same_food_twice_counts_one_variety_credit() {
    let (engine, store) = test_engine();
    let user = Uuid::new_v4();
    let variety = variety_challenge(user, 5.0);
    seed(&store, &variety).await;

    let first = meal(user, "quinoa-bowl", "Peruvian", protein(12.0), at(0, 12));
    let second = meal(user, "quinoa-bowl", "Peruvian", protein(12.0), at(1, 12));

    let mut deltas = engine.record_event_at(user, &first, at(0, 12)).await;
    deltas.extend(engine.record_event_at(user, &second, at(1, 12)).await);

    let credited: f64 = deltas.iter().map(|d| d.value_delta).sum();
    assert!((credited - 1.0).abs() < f64::EPSILON);

    let progress = stored(&store, &variety).await;
    assert!((progress.current_value - 1.0).abs() < f64::EPSILON);
    assert_eq!(progress.credited_food_ids.len(), 1);
    assert!((progress.completion_percentage - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_weekly_target_completes_exactly_once() {
    let (engine, store) = test_engine();
    let user = Uuid::new_v4();
    let weekly = protein_challenge(user, 120.0, None);
    seed(&store, &weekly).await;

    let mut completions = 0;
    let mut points = 0;
    for day in 0..3 {
        let event = meal(user, "tuna", "American", protein(30.0), at(day, 12));
        for delta in engine.record_event_at(user, &event, at(day, 12)).await {
            assert_eq!(delta.status, ChallengeStatus::Active);
            assert_eq!(delta.points_awarded, 0);
        }
    }

    let fourth = meal(user, "tuna", "American", protein(30.0), at(3, 12));
    for delta in engine.record_event_at(user, &fourth, at(3, 12)).await {
        if delta.completed() {
            completions += 1;
            points += delta.points_awarded;
            assert!((delta.current_value - 120.0).abs() < 1e-9);
            assert!((delta.completion_percentage - 100.0).abs() < 1e-9);
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(points, 150);

    let fifth = meal(user, "tuna", "American", protein(30.0), at(4, 12));
    assert!(engine.record_event_at(user, &fifth, at(4, 12)).await.is_empty());

    let progress = stored(&store, &weekly).await;
    assert_eq!(progress.status, ChallengeStatus::Completed);
    assert_eq!(progress.points_awarded, 150);
    assert!((progress.current_value - 120.0).abs() < 1e-9);
    assert!(engine.get_active_challenges_at(user, at(4, 13)).await.is_empty());
}

#[tokio::test]
async fn test_unfinished_challenge_expires_after_window() {
    let (engine, store) = test_engine();
    let user = Uuid::new_v4();
    let weekly = protein_challenge(user, 120.0, None);
    seed(&store, &weekly).await;

    let event = meal(user, "eggs", "American", protein(31.0), at(2, 8));
    engine.record_event_at(user, &event, at(2, 8)).await;

    let active = engine.get_active_challenges_at(user, at(6, 23)).await;
    assert_eq!(active.len(), 1);

    assert!(engine.get_active_challenges_at(user, at(8, 0)).await.is_empty());
    let progress = stored(&store, &weekly).await;
    assert_eq!(progress.status, ChallengeStatus::Expired);
    assert_eq!(progress.points_awarded, 0);
    assert!((progress.current_value - 31.0).abs() < f64::EPSILON);

    let late = meal(user, "eggs", "American", protein(90.0), at(8, 8));
    assert!(engine.record_event_at(user, &late, at(8, 8)).await.is_empty());
    assert_eq!(stored(&store, &weekly).await.status, ChallengeStatus::Expired);
}

#[tokio::test]
async fn test_calorie_adherence_judges_closed_days() {
    let (engine, store) = test_engine();
    let user = Uuid::new_v4();
    let adherence = challenge(
        user,
        ChallengeDimension::CalorieAdherence,
        ChallengeKind::GoalAdherence {
            nutrient: Nutrient::Calories,
            rule: AdherenceRule::AtMost,
        },
        2.0,
        Some(2000.0),
        monday(),
        7,
        200,
    );
    seed(&store, &adherence).await;

    let dinner = Nutrients::new(1800.0, 60.0, 250.0, 50.0);
    let monday_meal = meal(user, "pasta", "Italian", dinner, at(0, 19));
    let open_day = engine.record_event_at(user, &monday_meal, at(0, 19)).await;
    assert!(open_day[0].current_value.abs() < f64::EPSILON);

    let dinner = Nutrients::new(1500.0, 50.0, 180.0, 55.0);
    let tuesday_meal = meal(user, "curry", "Indian", dinner, at(1, 19));
    let closes_monday = engine.record_event_at(user, &tuesday_meal, at(1, 19)).await;
    assert!((closes_monday[0].current_value - 1.0).abs() < f64::EPSILON);

    // Advancing past Tuesday closes it as well and completes the challenge
    assert!(engine.get_active_challenges_at(user, at(2, 6)).await.is_empty());
    let progress = stored(&store, &adherence).await;
    assert_eq!(progress.status, ChallengeStatus::Completed);
    assert_eq!(progress.points_awarded, 200);
}
