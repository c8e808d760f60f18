// ABOUTME: Tests for dataset loading and event replay through the engine
// ABOUTME: Validates JSON format, ordering, per-user reports and load errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{at, catalog, meal, protein};
use nourish_engine::config::{EngineConfig, PersonalizationConfig};
use nourish_engine::models::ChallengeStatus;
use nourish_engine::replay::{engine_for, replay, ReplayDataset, ReplayError, ReplayOptions};
use std::io::Write;
use tempfile::NamedTempFile;
use uuid::Uuid;

const HAND_WRITTEN: &str = r#"{
  "candidates": [
    {
      "food_id": "overnight-oats",
      "name": "Overnight Oats",
      "cuisine": "American",
      "nutrients": { "calories": 320.0, "protein_g": 14.0, "carbs_g": 48.0, "fat_g": 8.0, "fiber_g": 7.0 },
      "health_tags": ["vegetarian", "high_fiber"],
      "meal_types": ["breakfast"]
    }
  ],
  "events": [
    {
      "event_id": "6f1c2f5e-8a0d-4d7e-9a51-0c3c9d7b2a11",
      "user_id": "0b5e7f8a-1c2d-4e3f-8a9b-0c1d2e3f4a5b",
      "food_id": "overnight-oats",
      "cuisine": "American",
      "nutrients": { "calories": 320.0, "protein_g": 14.0, "carbs_g": 48.0, "fat_g": 8.0 },
      "meal_type": "breakfast",
      "timestamp": "2025-06-02T07:30:00Z"
    }
  ]
}"#;

fn write_dataset(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn sample_dataset() -> ReplayDataset {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let mut events = Vec::new();
    for day in (0..4).rev() {
        events.push(meal(alice, "greek-yogurt", "Greek", protein(20.0), at(day, 8)));
        events.push(meal(alice, "chicken-rice-bowl", "Japanese", protein(40.0), at(day, 12)));
    }
    events.push(meal(bob, "beef-tacos", "Mexican", protein(32.0), at(1, 19)));
    ReplayDataset {
        candidates: catalog(),
        events,
    }
}

#[tokio::test]
async fn test_hand_written_dataset_loads() {
    let file = write_dataset(HAND_WRITTEN);
    let dataset = ReplayDataset::load(file.path()).await.unwrap();

    assert_eq!(dataset.candidates.len(), 1);
    assert_eq!(dataset.events.len(), 1);
    assert!((dataset.events[0].nutrients.fiber_g).abs() < f64::EPSILON);
    assert_eq!(dataset.last_event_at(), Some(at(0, 7) + Duration::minutes(30)));
}

#[tokio::test]
async fn test_dataset_round_trips_through_file() {
    let dataset = sample_dataset();
    let file = write_dataset(&serde_json::to_string(&dataset).unwrap());

    let loaded = ReplayDataset::load(file.path()).await.unwrap();
    assert_eq!(loaded.events, dataset.events);
    assert_eq!(loaded.candidates, dataset.candidates);

    let ordered = loaded.ordered_events();
    assert!(ordered.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_replay_reports_each_user() {
    common::init_test_logging();
    let dataset = sample_dataset();
    let engine = engine_for(
        &dataset,
        EngineConfig::default(),
        &PersonalizationConfig::<true>::default(),
    );
    let options = ReplayOptions {
        top_k: 3,
        until: None,
    };

    let report = replay(&engine, &dataset, &options).await;

    assert_eq!(report.events_replayed, 9);
    assert_eq!(report.evaluated_at, at(3, 12));
    assert_eq!(report.users.len(), 2);
    assert!(report.users.windows(2).all(|w| w[0].user_id < w[1].user_id));

    let alice = report.users.iter().find(|u| u.events == 8).unwrap();
    assert_eq!(alice.generated.len(), 3);
    assert!(!alice.deltas.is_empty());
    assert_eq!(alice.profile.distinct_days_observed, 4);
    assert_eq!(alice.recommendations.len(), 3);
    assert_eq!(
        alice.points_awarded,
        alice
            .deltas
            .iter()
            .filter(|d| d.completed())
            .map(|d| d.points_awarded)
            .sum::<u32>()
    );
    assert!(alice
        .active
        .iter()
        .all(|p| p.status == ChallengeStatus::Active));

    let bob = report.users.iter().find(|u| u.events == 1).unwrap();
    assert_eq!(bob.generated.len(), 3);
    assert_eq!(bob.profile.top_cuisine().map(|(c, _)| c), Some("mexican"));
}

#[tokio::test]
async fn test_replay_until_expires_challenges() {
    let dataset = sample_dataset();
    let engine = engine_for(
        &dataset,
        EngineConfig::default(),
        &PersonalizationConfig::<true>::default(),
    );
    let options = ReplayOptions {
        top_k: 1,
        until: Some(at(21, 0)),
    };

    let report = replay(&engine, &dataset, &options).await;

    assert_eq!(report.evaluated_at, at(21, 0));
    assert!(report.users.iter().all(|u| u.active.is_empty()));
}

#[tokio::test]
async fn test_empty_dataset_replays_nothing() {
    let dataset = ReplayDataset::default();
    let engine = engine_for(
        &dataset,
        EngineConfig::default(),
        &PersonalizationConfig::<true>::default(),
    );
    let report = replay(&engine, &dataset, &ReplayOptions::default()).await;
    assert_eq!(report.events_replayed, 0);
    assert!(report.users.is_empty());
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let file = write_dataset("{ \"events\": [ oops ] }");
    let err = ReplayDataset::load(file.path()).await.unwrap_err();
    assert!(matches!(err, ReplayError::Parse { .. }));
    assert!(err.to_string().contains("invalid dataset"));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = ReplayDataset::load(&path).await.unwrap_err();
    assert!(matches!(err, ReplayError::Io { .. }));
}
