// ABOUTME: In-memory store for meal events, profiles and challenge progress
// ABOUTME: Shared tokio RwLock tables with duplicate-tolerant appends and versioned saves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ChallengeStore, EventLog, EventSummary, ProfileStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nourish_core::errors::{AppResult, EngineError};
use nourish_core::models::{
    ChallengeId, ChallengeProgress, EventId, MealEvent, PreferenceProfile, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct EventTable {
    // Per user, ordered by timestamp then arrival
    by_user: HashMap<UserId, Vec<MealEvent>>,
    owners: HashMap<EventId, UserId>,
}

/// In-memory implementation of [`EventLog`], [`ProfileStore`] and [`ChallengeStore`]
///
/// Clones share the same tables, so one store can be handed to the engine and
/// kept by the caller for inspection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    events: Arc<RwLock<EventTable>>,
    profiles: Arc<RwLock<HashMap<UserId, PreferenceProfile>>>,
    challenges: Arc<RwLock<HashMap<ChallengeId, ChallengeProgress>>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct events stored across all users
    pub async fn event_count(&self) -> usize {
        self.events.read().await.owners.len()
    }
}

#[async_trait]
impl EventLog for InMemoryStore {
    async fn append_event(&self, event: &MealEvent) -> AppResult<EventId> {
        let mut table = self.events.write().await;
        if table.owners.contains_key(&event.event_id) {
            debug!(event_id = %event.event_id, "Duplicate event delivery ignored");
            return Ok(event.event_id);
        }
        table.owners.insert(event.event_id, event.user_id);
        let events = table.by_user.entry(event.user_id).or_default();
        let position = events.partition_point(|e| e.timestamp <= event.timestamp);
        events.insert(position, event.clone());
        Ok(event.event_id)
    }

    async fn get_event(&self, event_id: EventId) -> AppResult<Option<MealEvent>> {
        let table = self.events.read().await;
        Ok(table.owners.get(&event_id).and_then(|user_id| {
            table
                .by_user
                .get(user_id)
                .and_then(|events| events.iter().find(|e| e.event_id == event_id))
                .cloned()
        }))
    }

    async fn events_for_user(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<MealEvent>> {
        let table = self.events.read().await;
        Ok(table
            .by_user
            .get(&user_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| since.is_none_or(|start| e.timestamp >= start))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn event_summary(&self, user_id: UserId) -> AppResult<EventSummary> {
        let table = self.events.read().await;
        Ok(table
            .by_user
            .get(&user_id)
            .map_or_else(EventSummary::default, |events| EventSummary {
                count: events.len(),
                last_event_at: events.last().map(|e| e.timestamp),
            }))
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, user_id: UserId) -> AppResult<Option<PreferenceProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn save_profile(&self, profile: &PreferenceProfile) -> AppResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn invalidate_profile(&self, user_id: UserId) -> AppResult<()> {
        self.profiles.write().await.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl ChallengeStore for InMemoryStore {
    async fn insert_challenge(&self, progress: &ChallengeProgress) -> AppResult<bool> {
        let mut challenges = self.challenges.write().await;
        if challenges.contains_key(&progress.challenge_id()) {
            return Ok(false);
        }
        challenges.insert(progress.challenge_id(), progress.clone());
        Ok(true)
    }

    async fn get_challenge(
        &self,
        challenge_id: ChallengeId,
    ) -> AppResult<Option<ChallengeProgress>> {
        Ok(self.challenges.read().await.get(&challenge_id).cloned())
    }

    async fn challenges_for_user(&self, user_id: UserId) -> AppResult<Vec<ChallengeProgress>> {
        let mut found: Vec<ChallengeProgress> = self
            .challenges
            .read()
            .await
            .values()
            .filter(|p| p.definition.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.definition
                .starts_at
                .cmp(&b.definition.starts_at)
                .then_with(|| a.challenge_id().cmp(&b.challenge_id()))
        });
        Ok(found)
    }

    async fn save_progress(
        &self,
        progress: &ChallengeProgress,
        expected_version: u64,
    ) -> AppResult<u64> {
        let challenge_id = progress.challenge_id();
        let mut challenges = self.challenges.write().await;
        let Some(stored) = challenges.get_mut(&challenge_id) else {
            return Err(EngineError::storage(format!(
                "challenge {challenge_id} not found"
            )));
        };
        if stored.version != expected_version {
            return Err(EngineError::ConcurrentUpdateConflict {
                challenge_id,
                expected: expected_version,
                actual: stored.version,
            });
        }
        let next_version = expected_version + 1;
        *stored = ChallengeProgress {
            version: next_version,
            ..progress.clone()
        };
        Ok(next_version)
    }
}
