// ABOUTME: Storage abstraction layer for meal events, preference profiles and challenge progress
// ABOUTME: Pluggable backends behind async traits; an in-memory implementation ships with the crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory store implementing every storage trait
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nourish_core::errors::AppResult;
use nourish_core::models::{
    ChallengeId, ChallengeProgress, EventId, MealEvent, PreferenceProfile, UserId,
};
use serde::{Deserialize, Serialize};

/// Count and recency of a user's logged events, used to detect stale profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Events logged by the user
    pub count: usize,
    /// Timestamp of the newest event
    pub last_event_at: Option<DateTime<Utc>>,
}

/// Append-only log of meal events
///
/// Delivery is at-least-once: appending an event whose id is already stored is a
/// no-op that still returns the id.
///
/// # Examples
///
/// ```rust,no_run
/// use chrono::Utc;
/// use nourish_engine::models::{MealEvent, MealType, Nutrients};
/// use nourish_engine::storage::{memory::InMemoryStore, EventLog};
/// use uuid::Uuid;
/// # async fn example() -> nourish_engine::AppResult<()> {
/// let store = InMemoryStore::new();
/// let user_id = Uuid::new_v4();
/// let event = MealEvent::new(
///     user_id,
///     "greek-yogurt",
///     "greek",
///     Nutrients::new(150.0, 15.0, 8.0, 4.0),
///     MealType::Breakfast,
///     Utc::now(),
/// );
/// store.append_event(&event).await?;
/// store.append_event(&event).await?; // duplicate delivery, ignored
/// assert_eq!(store.events_for_user(user_id, None).await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Append an event, ignoring duplicates by `event_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    async fn append_event(&self, event: &MealEvent) -> AppResult<EventId>;

    /// The stored copy of an event, as first delivered
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn get_event(&self, event_id: EventId) -> AppResult<Option<MealEvent>>;

    /// Events of a user at or after `since` (all when `None`), oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn events_for_user(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<MealEvent>>;

    /// Count and newest timestamp of a user's events
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn event_summary(&self, user_id: UserId) -> AppResult<EventSummary>;
}

/// One cached preference profile per user
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Stored profile of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn get_profile(&self, user_id: UserId) -> AppResult<Option<PreferenceProfile>>;

    /// Insert or replace the profile of `profile.user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    async fn save_profile(&self, profile: &PreferenceProfile) -> AppResult<()>;

    /// Drop the stored profile so the next read recomputes it
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete
    async fn invalidate_profile(&self, user_id: UserId) -> AppResult<()>;
}

/// Challenge definitions with their progress, one row per challenge
///
/// Progress rows are versioned; [`ChallengeStore::save_progress`] is a
/// compare-and-swap on `version`.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Store a new challenge; returns `false` when the id already exists
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    async fn insert_challenge(&self, progress: &ChallengeProgress) -> AppResult<bool>;

    /// Load one challenge
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn get_challenge(&self, challenge_id: ChallengeId)
        -> AppResult<Option<ChallengeProgress>>;

    /// Every challenge of a user, in any status, ordered by start then id
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn challenges_for_user(&self, user_id: UserId) -> AppResult<Vec<ChallengeProgress>>;

    /// Replace a progress row if its stored version equals `expected_version`
    ///
    /// Returns the new version (`expected_version + 1`).
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentUpdateConflict` on a version mismatch, `Storage` when the
    /// challenge does not exist or the backend fails
    async fn save_progress(
        &self,
        progress: &ChallengeProgress,
        expected_version: u64,
    ) -> AppResult<u64>;
}
