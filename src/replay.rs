// ABOUTME: Replays a JSON dataset of meal events and candidate foods through the engine
// ABOUTME: Produces a per-user report of profiles, challenges, progress deltas and recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Dataset replay
//!
//! Events are replayed in timestamp order with the engine clock set to each
//! event's timestamp. A user's challenges are generated just before their first
//! event is recorded, then every event flows through `record_event`.

use crate::candidates::StaticCandidateSource;
use crate::config::EngineConfig;
use crate::engine::PersonalizationEngine;
use crate::storage::memory::InMemoryStore;
use chrono::{DateTime, Utc};
use nourish_core::models::{
    CandidateItem, ChallengeDefinition, ChallengeProgress, ChallengeProgressDelta,
    ChallengeStatus, MealEvent, PreferenceProfile, Recommendation, RecommendationContext, UserId,
};
use nourish_intelligence::PersonalizationConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Errors loading a dataset
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Dataset file could not be read
    #[error("failed to read dataset {path}: {source}")]
    Io {
        /// Dataset path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Dataset is not valid JSON for [`ReplayDataset`]
    #[error("invalid dataset {path}: {source}")]
    Parse {
        /// Dataset path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Meal events and candidate foods to replay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayDataset {
    /// Candidate catalog served to recommendations
    #[serde(default)]
    pub candidates: Vec<CandidateItem>,
    /// Meal events, in any order
    #[serde(default)]
    pub events: Vec<MealEvent>,
}

impl ReplayDataset {
    /// Read a dataset from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let raw = fs::read(path).await.map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ReplayError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Events ordered by timestamp, ties kept in file order
    #[must_use]
    pub fn ordered_events(&self) -> Vec<&MealEvent> {
        let mut events: Vec<&MealEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.timestamp);
        events
    }

    /// Timestamp of the last event
    #[must_use]
    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.events.iter().map(|e| e.timestamp).max()
    }
}

/// Replay settings
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Recommendations to report per user
    pub top_k: usize,
    /// Evaluation time of the final report; defaults to the last event
    pub until: Option<DateTime<Utc>>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            top_k: PersonalizationConfig::global().scoring.thresholds.default_top_k,
            until: None,
        }
    }
}

/// Outcome of the replay for one user
#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    /// The user
    pub user_id: UserId,
    /// Events replayed for the user
    pub events: usize,
    /// Challenges generated before the first event
    pub generated: Vec<ChallengeDefinition>,
    /// Every progress change produced by the events
    pub deltas: Vec<ChallengeProgressDelta>,
    /// Challenges completed during the replay
    pub completed: usize,
    /// Points awarded during the replay
    pub points_awarded: u32,
    /// Challenges still active at the end
    pub active: Vec<ChallengeProgress>,
    /// Profile at the end
    pub profile: PreferenceProfile,
    /// Recommendations at the end
    pub recommendations: Vec<Recommendation>,
}

/// Outcome of a full replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Events in the dataset
    pub events_replayed: usize,
    /// Evaluation time of the final report
    pub evaluated_at: DateTime<Utc>,
    /// Per-user outcomes, ordered by user id
    pub users: Vec<UserReport>,
}

/// Engine over a fresh in-memory store serving the dataset's candidates
#[must_use]
pub fn engine_for(
    dataset: &ReplayDataset,
    config: EngineConfig,
    personalization: &PersonalizationConfig<true>,
) -> PersonalizationEngine {
    PersonalizationEngine::with_config(
        Arc::new(InMemoryStore::new()),
        Arc::new(StaticCandidateSource::new(dataset.candidates.clone())),
        config,
        personalization,
    )
}

#[derive(Default)]
struct Progress {
    events: usize,
    generated: Vec<ChallengeDefinition>,
    deltas: Vec<ChallengeProgressDelta>,
}

/// Replay the dataset's events through `engine`
pub async fn replay(
    engine: &PersonalizationEngine,
    dataset: &ReplayDataset,
    options: &ReplayOptions,
) -> ReplayReport {
    let mut users: BTreeMap<UserId, Progress> = BTreeMap::new();

    for event in dataset.ordered_events() {
        let entry = users.entry(event.user_id).or_default();
        if entry.events == 0 {
            entry.generated = engine
                .generate_challenges_at(event.user_id, event.timestamp)
                .await;
        }
        entry.events += 1;
        let deltas = engine
            .record_event_at(event.user_id, event, event.timestamp)
            .await;
        entry.deltas.extend(deltas);
    }

    let evaluated_at = options
        .until
        .or_else(|| dataset.last_event_at())
        .unwrap_or_else(Utc::now);

    let mut reports = Vec::with_capacity(users.len());
    for (user_id, progress) in users {
        reports.push(user_report(engine, user_id, progress, evaluated_at, options.top_k).await);
    }

    info!(
        events = dataset.events.len(),
        users = reports.len(),
        "Replay finished"
    );
    ReplayReport {
        events_replayed: dataset.events.len(),
        evaluated_at,
        users: reports,
    }
}

async fn user_report(
    engine: &PersonalizationEngine,
    user_id: UserId,
    progress: Progress,
    evaluated_at: DateTime<Utc>,
    top_k: usize,
) -> UserReport {
    let active = engine.get_active_challenges_at(user_id, evaluated_at).await;
    let profile = engine.get_profile_at(user_id, evaluated_at).await;
    let recommendations = engine
        .recommend(user_id, &RecommendationContext::new(evaluated_at), top_k)
        .await;

    let completed: Vec<&ChallengeProgressDelta> = progress
        .deltas
        .iter()
        .filter(|d| d.completed())
        .collect();

    UserReport {
        user_id,
        events: progress.events,
        generated: progress.generated,
        completed: completed.len(),
        points_awarded: completed.iter().map(|d| d.points_awarded).sum(),
        deltas: progress.deltas,
        active: active
            .into_iter()
            .filter(|p| p.status == ChallengeStatus::Active)
            .collect(),
        profile,
        recommendations,
    }
}
