// ABOUTME: Criterion benchmarks for preference learning, candidate ranking and event recording
// ABOUTME: Measures the synchronous engines and the full engine path over an in-memory store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the personalization engine.
//!
//! Measures preference learning over growing histories, ranking over growing
//! candidate pools, and the end-to-end `record_event` path with active challenges.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nourish_engine::candidates::StaticCandidateSource;
use nourish_engine::config::{EngineConfig, PersonalizationConfig};
use nourish_engine::engine::PersonalizationEngine;
use nourish_engine::models::{
    CandidateItem, HealthTag, MealEvent, MealType, Nutrients, RecommendationContext, UserId,
};
use nourish_engine::storage::memory::InMemoryStore;
use nourish_intelligence::{CandidateScorer, PreferenceLearner};
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

const CUISINES: [&str; 6] = ["Japanese", "Mexican", "Italian", "Indian", "Greek", "American"];

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

/// Meals spread over the last 60 days, three per day
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn generate_history(user_id: UserId, count: usize) -> Vec<MealEvent> {
    (0..count)
        .map(|index| {
            let day = (index / 3) as i64 % 60;
            let hour = [8, 12, 19][index % 3];
            let at = start() + Duration::days(day) + Duration::hours(hour);
            MealEvent::new(
                user_id,
                format!("food-{}", index % 40),
                CUISINES[index % CUISINES.len()],
                Nutrients::new(
                    300.0 + (index % 7) as f64 * 50.0,
                    10.0 + (index % 5) as f64 * 8.0,
                    40.0 + (index % 3) as f64 * 10.0,
                    8.0 + (index % 4) as f64 * 3.0,
                ),
                MealType::from_hour(hour as u32),
                at,
            )
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn generate_catalog(count: usize) -> Vec<CandidateItem> {
    (0..count)
        .map(|index| {
            let item = CandidateItem::new(
                format!("food-{index}"),
                format!("Food {index}"),
                CUISINES[index % CUISINES.len()],
                Nutrients::new(
                    250.0 + (index % 9) as f64 * 40.0,
                    8.0 + (index % 6) as f64 * 6.0,
                    30.0 + (index % 4) as f64 * 12.0,
                    6.0 + (index % 5) as f64 * 2.0,
                ),
            )
            .with_meal_types([MealType::from_hour([8, 12, 19][index % 3])]);
            if index % 4 == 0 {
                item.with_tags([HealthTag::Vegan])
            } else {
                item
            }
        })
        .collect()
}

fn bench_learn(c: &mut Criterion) {
    let mut group = c.benchmark_group("preference_learning");
    let learner = PreferenceLearner::with_config(PersonalizationConfig::<true>::default().learner);
    let user = Uuid::new_v4();
    let now = start() + Duration::days(60);

    for count in [30, 180, 1_000] {
        let events = generate_history(user, count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("learn", count), &events, |b, events| {
            b.iter(|| learner.learn(black_box(user), black_box(events), now));
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_ranking");
    let config = PersonalizationConfig::<true>::default();
    let learner = PreferenceLearner::with_config(config.learner.clone());
    let scorer = CandidateScorer::with_config(config.scoring);
    let user = Uuid::new_v4();
    let now = start() + Duration::days(60);
    let profile = learner.learn(user, &generate_history(user, 180), now);
    let context = RecommendationContext::new(now).for_meal(MealType::Lunch);

    for count in [50, 500, 5_000] {
        let catalog = generate_catalog(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("rank_top10", count), &catalog, |b, catalog| {
            b.iter(|| scorer.rank(black_box(&profile), black_box(catalog), &context, 10));
        });
    }
    group.finish();
}

fn bench_record_event(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("record_event");
    group.sample_size(50);

    let engine = PersonalizationEngine::with_config(
        Arc::new(InMemoryStore::new()),
        Arc::new(StaticCandidateSource::new(generate_catalog(200))),
        EngineConfig::default(),
        &PersonalizationConfig::<true>::default(),
    );
    let user = Uuid::new_v4();
    rt.block_on(engine.generate_challenges_at(user, start()));

    group.bench_function("with_onboarding_challenges", |b| {
        let mut index = 0_usize;
        b.iter(|| {
            let event = MealEvent::new(
                user,
                format!("food-{}", index % 40),
                "Japanese",
                Nutrients::new(450.0, 30.0, 40.0, 12.0),
                MealType::Lunch,
                start() + Duration::hours(12),
            );
            index = index.wrapping_add(1);
            rt.block_on(engine.record_event_at(user, black_box(&event), start()))
        });
    });

    group.bench_function("recommend_top10", |b| {
        let context = RecommendationContext::new(start() + Duration::hours(12));
        b.iter(|| rt.block_on(engine.recommend(user, black_box(&context), 10)));
    });
    group.finish();
}

criterion_group!(benches, bench_learn, bench_rank, bench_record_event);
criterion_main!(benches);
