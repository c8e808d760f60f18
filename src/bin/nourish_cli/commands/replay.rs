// ABOUTME: Replay and recommendation commands for nourish-cli
// ABOUTME: Loads a dataset, replays it through a fresh engine and prints the results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::{DateTime, Utc};
use nourish_engine::config::{EngineConfig, PersonalizationConfig};
use nourish_engine::engine::PersonalizationEngine;
use nourish_engine::models::{MealType, RecommendationContext};
use nourish_engine::replay::{engine_for, replay, ReplayDataset, ReplayOptions};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::helpers::display::{display_replay_summary, print_json};

async fn load(dataset: &Path) -> Result<(ReplayDataset, PersonalizationEngine)> {
    let data = ReplayDataset::load(dataset).await?;
    info!(
        events = data.events.len(),
        candidates = data.candidates.len(),
        "Loaded dataset {}",
        dataset.display()
    );
    let engine = engine_for(&data, EngineConfig::from_env(), PersonalizationConfig::global());
    Ok((data, engine))
}

/// Replay a dataset and print the report
pub async fn run(
    dataset: &Path,
    top_k: Option<usize>,
    until: Option<DateTime<Utc>>,
    pretty: bool,
) -> Result<()> {
    let (data, engine) = load(dataset).await?;
    let defaults = ReplayOptions::default();
    let options = ReplayOptions {
        top_k: top_k.unwrap_or(defaults.top_k),
        until,
    };

    let report = replay(&engine, &data, &options).await;
    display_replay_summary(&report);
    print_json(&report, pretty)
}

/// Replay a dataset, then print the ranking for one user
pub async fn recommend(
    dataset: &Path,
    user: Uuid,
    meal: Option<&str>,
    top_k: usize,
    at: Option<DateTime<Utc>>,
    pretty: bool,
) -> Result<()> {
    let (data, engine) = load(dataset).await?;
    let options = ReplayOptions { top_k, until: at };
    let report = replay(&engine, &data, &options).await;

    let mut context = RecommendationContext::new(report.evaluated_at);
    if let Some(meal) = meal {
        context = context.for_meal(MealType::from_str_lossy(meal));
    }
    let ranking = engine.rank(user, &context, top_k).await;
    print_json(&ranking, pretty)
}
