// ABOUTME: Personalization engine facade over injected storage and candidate lookup
// ABOUTME: Serializes writes per user, bounds every wait and degrades errors to neutral output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Personalization Engine
//!
//! [`PersonalizationEngine`] runs in the meal-logging request path and must never
//! fail it. Every public operation returns degraded output instead of an error:
//! a neutral profile, an empty ranking, no challenges or no deltas. Failures are
//! logged with their [`ErrorCode`](nourish_core::errors::ErrorCode).
//!
//! Writes for one user (event recording, challenge generation, challenge
//! advancement) are serialized by a per-user `tokio::sync::Mutex`. Progress saves
//! are additionally versioned so a conflicting writer reloads and retries.
//! Recommendation reads never take the user lock.
//!
//! Each operation has an `_at` variant taking the evaluation time explicitly; the
//! plain variants use the wall clock.

use crate::candidates::{CandidateLookup, CandidateSource};
use crate::config::EngineConfig;
use crate::storage::{ChallengeStore, EventLog, ProfileStore};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use nourish_core::errors::{AppResult, EngineError};
use nourish_core::models::{
    CandidateFilter, ChallengeDefinition, ChallengeProgress, ChallengeProgressDelta,
    ChallengeStatus, MealEvent, PreferenceProfile, Ranking, Recommendation,
    RecommendationContext, UserId,
};
use nourish_intelligence::{
    BehaviorAnalyzer, CandidateScorer, ChallengeGenerator, PersonalizationConfig,
    PreferenceLearner, ProgressTracker,
};
use std::slice;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Facade exposing preference learning, recommendations and challenges
pub struct PersonalizationEngine {
    events: Arc<dyn EventLog>,
    profiles: Arc<dyn ProfileStore>,
    challenges: Arc<dyn ChallengeStore>,
    candidates: CandidateLookup,
    learner: PreferenceLearner,
    scorer: CandidateScorer,
    analyzer: BehaviorAnalyzer,
    generator: ChallengeGenerator,
    tracker: ProgressTracker,
    config: EngineConfig,
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl PersonalizationEngine {
    /// Engine over one store implementing every storage trait
    ///
    /// Uses [`EngineConfig::from_env`] and the global [`PersonalizationConfig`].
    #[must_use]
    pub fn new<S, C>(store: Arc<S>, source: Arc<C>) -> Self
    where
        S: EventLog + ProfileStore + ChallengeStore + 'static,
        C: CandidateSource + 'static,
    {
        Self::with_config(
            store,
            source,
            EngineConfig::from_env(),
            PersonalizationConfig::global(),
        )
    }

    /// Engine over one store with explicit configuration
    #[must_use]
    pub fn with_config<S, C>(
        store: Arc<S>,
        source: Arc<C>,
        config: EngineConfig,
        personalization: &PersonalizationConfig<true>,
    ) -> Self
    where
        S: EventLog + ProfileStore + ChallengeStore + 'static,
        C: CandidateSource + 'static,
    {
        Self::from_parts(
            store.clone(),
            store.clone(),
            store,
            source,
            config,
            personalization,
        )
    }

    /// Engine over separately injected collaborators
    #[must_use]
    pub fn from_parts(
        events: Arc<dyn EventLog>,
        profiles: Arc<dyn ProfileStore>,
        challenges: Arc<dyn ChallengeStore>,
        source: Arc<dyn CandidateSource>,
        config: EngineConfig,
        personalization: &PersonalizationConfig<true>,
    ) -> Self {
        Self {
            events,
            profiles,
            challenges,
            candidates: CandidateLookup::new(
                source,
                config.lookup_timeout(),
                config.candidate_cache_capacity,
            ),
            learner: PreferenceLearner::with_config(personalization.learner.clone()),
            scorer: CandidateScorer::with_config(personalization.scoring.clone()),
            analyzer: BehaviorAnalyzer::with_config(personalization.challenges.clone()),
            generator: ChallengeGenerator::with_config(personalization.challenges.clone()),
            tracker: ProgressTracker::with_config(personalization.tracking.clone()),
            config,
            user_locks: DashMap::new(),
        }
    }

    /// Runtime configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Current preference profile; neutral when history is missing or unreadable
    pub async fn get_profile(&self, user_id: UserId) -> PreferenceProfile {
        self.get_profile_at(user_id, Utc::now()).await
    }

    /// [`Self::get_profile`] evaluated at `now`
    pub async fn get_profile_at(&self, user_id: UserId, now: DateTime<Utc>) -> PreferenceProfile {
        match self.refresh_profile(user_id, now).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    code = ?e.code(),
                    "Profile unavailable, using neutral profile"
                );
                PreferenceProfile::neutral(user_id, now)
            }
        }
    }

    async fn refresh_profile(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<PreferenceProfile> {
        let summary = self.events.event_summary(user_id).await?;
        let max_age = self.config.profile_max_age();

        match self.profiles.get_profile(user_id).await {
            Ok(Some(cached))
                if !cached.is_stale(summary.count, summary.last_event_at, now, max_age) =>
            {
                debug!(user_id = %user_id, "Serving cached profile");
                return Ok(cached);
            }
            Ok(_) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Profile cache read failed"),
        }

        let since = self.learner.window_start(now);
        let events = self.events.events_for_user(user_id, Some(since)).await?;
        let mut profile = self.learner.learn(user_id, &events, now);
        profile.source_event_count = summary.count;
        profile.last_event_at = summary.last_event_at;

        debug!(
            user_id = %user_id,
            events = profile.events_considered,
            days = profile.distinct_days_observed,
            confidence = profile.confidence,
            "Recomputed preference profile"
        );
        if let Err(e) = self.profiles.save_profile(&profile).await {
            warn!(user_id = %user_id, error = %e, "Failed to cache profile");
        }
        Ok(profile)
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    /// Top `k` candidate foods for the request context
    pub async fn recommend(
        &self,
        user_id: UserId,
        context: &RecommendationContext,
        k: usize,
    ) -> Vec<Recommendation> {
        self.rank(user_id, context, k).await.recommendations
    }

    /// Ranked candidates together with the ranking outcome
    ///
    /// Evaluated at `context.requested_at`. Foods the user ate within the recent
    /// lookback are merged into the context's recent foods.
    pub async fn rank(
        &self,
        user_id: UserId,
        context: &RecommendationContext,
        k: usize,
    ) -> Ranking {
        let now = context.requested_at;
        let profile = self.get_profile_at(user_id, now).await;
        let context = self.with_recent_history(user_id, context).await;

        // Restrictions stay with the scorer so an all-excluded pool is reported as such
        let pool = self.candidates.fetch(&CandidateFilter::default()).await;
        let ranking = self.scorer.rank(&profile, &pool.items, &context, k);

        debug!(
            user_id = %user_id,
            pool = pool.items.len(),
            origin = ?pool.origin,
            returned = ranking.recommendations.len(),
            outcome = ?ranking.outcome,
            "Ranked candidates"
        );
        ranking
    }

    async fn with_recent_history(
        &self,
        user_id: UserId,
        context: &RecommendationContext,
    ) -> RecommendationContext {
        let lookback = Duration::days(self.scorer.config().thresholds.recent_food_lookback_days);
        let since = context.requested_at - lookback;
        match self.events.events_for_user(user_id, Some(since)).await {
            Ok(events) => context.clone().with_recent_foods(
                events
                    .into_iter()
                    .filter(|e| e.timestamp <= context.requested_at)
                    .map(|e| e.food_id),
            ),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Recent history unavailable");
                context.clone()
            }
        }
    }

    // ========================================================================
    // Challenges
    // ========================================================================

    /// Generate and persist new challenges for the user's behavioral gaps
    ///
    /// Returns only the newly created definitions.
    pub async fn generate_challenges(&self, user_id: UserId) -> Vec<ChallengeDefinition> {
        self.generate_challenges_at(user_id, Utc::now()).await
    }

    /// [`Self::generate_challenges`] evaluated at `now`
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn generate_challenges_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeDefinition> {
        match self.try_generate_challenges(user_id, now).await {
            Ok(created) => created,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    code = ?e.code(),
                    "Challenge generation failed"
                );
                Vec::new()
            }
        }
    }

    async fn try_generate_challenges(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ChallengeDefinition>> {
        let _guard = self.lock_user(user_id).await?;

        let active: Vec<ChallengeDefinition> = self
            .advance_all(user_id, now)
            .await?
            .into_iter()
            .map(|progress| progress.definition)
            .collect();

        let since = self.analyzer.window_start(now);
        let events = match self.events.events_for_user(user_id, Some(since)).await {
            Ok(events) => events,
            Err(e) => {
                // Without history the generator falls back to onboarding challenges
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "Event history unavailable for analysis"
                );
                Vec::new()
            }
        };
        let aggregates = self.analyzer.analyze(user_id, &events, now);
        if aggregates.is_insufficient(self.generator.config().min_logged_days) {
            let reason = EngineError::insufficient_data(
                user_id,
                format!("{} logged days in window", aggregates.logged_days),
            );
            info!(error = %reason, code = ?reason.code(), "Generating onboarding challenges");
        }

        let mut created = Vec::new();
        for definition in self.generator.generate(&aggregates, &active, now) {
            let progress = ChallengeProgress::new(definition, now);
            match self.challenges.insert_challenge(&progress).await {
                Ok(true) => created.push(progress.definition),
                Ok(false) => {
                    debug!(challenge_id = %progress.challenge_id(), "Challenge already exists");
                }
                Err(e) => {
                    warn!(
                        challenge_id = %progress.challenge_id(),
                        error = %e,
                        "Failed to store challenge"
                    );
                }
            }
        }

        info!(
            user_id = %user_id,
            created = created.len(),
            active = active.len(),
            "Generated challenges"
        );
        Ok(created)
    }

    /// Active challenges after closing elapsed days and expiring ended windows
    pub async fn get_active_challenges(&self, user_id: UserId) -> Vec<ChallengeProgress> {
        self.get_active_challenges_at(user_id, Utc::now()).await
    }

    /// [`Self::get_active_challenges`] evaluated at `now`
    pub async fn get_active_challenges_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeProgress> {
        match self.try_active_challenges(user_id, now).await {
            Ok(active) => active,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    code = ?e.code(),
                    "Active challenges unavailable"
                );
                Vec::new()
            }
        }
    }

    async fn try_active_challenges(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ChallengeProgress>> {
        let _guard = self.lock_user(user_id).await?;
        self.advance_all(user_id, now).await
    }

    /// Advance every open challenge of a user to `now` and return those still active
    ///
    /// Caller holds the user lock.
    async fn advance_all(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ChallengeProgress>> {
        let open = self.open_challenges(user_id).await?;
        let mut active = Vec::with_capacity(open.len());
        for progress in open {
            let challenge_id = progress.challenge_id();
            match self
                .update_progress(progress, |p| self.tracker.advance(p, now).into_iter().collect())
                .await
            {
                Ok((progress, _)) if progress.status == ChallengeStatus::Active => {
                    active.push(progress);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(challenge_id = %challenge_id, error = %e, "Failed to advance challenge");
                }
            }
        }
        Ok(active)
    }

    async fn open_challenges(&self, user_id: UserId) -> AppResult<Vec<ChallengeProgress>> {
        Ok(self
            .challenges
            .challenges_for_user(user_id)
            .await?
            .into_iter()
            .filter(|p| !p.status.is_terminal())
            .collect())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Record a meal event and apply it to the user's active challenges
    ///
    /// Duplicate deliveries are absorbed: a redelivered id is tracked with the copy
    /// logged first, and an event already applied to a challenge produces no delta
    /// for it. Invalid events and storage failures yield an
    /// empty result.
    pub async fn record_event(
        &self,
        user_id: UserId,
        event: &MealEvent,
    ) -> Vec<ChallengeProgressDelta> {
        self.record_event_at(user_id, event, Utc::now()).await
    }

    /// [`Self::record_event`] evaluated at `now`
    #[instrument(skip(self, event), fields(user_id = %user_id, event_id = %event.event_id))]
    pub async fn record_event_at(
        &self,
        user_id: UserId,
        event: &MealEvent,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeProgressDelta> {
        match self.try_record_event(user_id, event, now).await {
            Ok(deltas) => deltas,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    event_id = %event.event_id,
                    error = %e,
                    code = ?e.code(),
                    "Meal event not applied"
                );
                Vec::new()
            }
        }
    }

    async fn try_record_event(
        &self,
        user_id: UserId,
        event: &MealEvent,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ChallengeProgressDelta>> {
        if event.user_id != user_id {
            return Err(EngineError::invalid_event(
                event.event_id,
                format!("event belongs to user {}", event.user_id),
            ));
        }
        event.validate()?;

        let _guard = self.lock_user(user_id).await?;
        let event = match self.events.get_event(event.event_id).await? {
            // Redelivery: track the logged copy so a shifted timestamp cannot land in another day
            Some(stored) => {
                if stored.user_id != user_id {
                    return Err(EngineError::invalid_event(
                        event.event_id,
                        format!("event id already logged for user {}", stored.user_id),
                    ));
                }
                debug!(event_id = %event.event_id, "Event already logged, replaying stored copy");
                stored
            }
            None => {
                self.events.append_event(event).await?;
                if let Err(e) = self.profiles.invalidate_profile(user_id).await {
                    warn!(user_id = %user_id, error = %e, "Failed to invalidate cached profile");
                }
                event.clone()
            }
        };
        let event = &event;

        let mut deltas = Vec::new();
        for progress in self.open_challenges(user_id).await? {
            let challenge_id = progress.challenge_id();
            let update = self
                .update_progress(progress, |p| self.tracker.track(slice::from_mut(p), event, now))
                .await;
            match update {
                Ok((_, applied)) => deltas.extend(applied),
                Err(e) => {
                    // Redelivery of the event completes the update; the tracker is idempotent
                    warn!(
                        challenge_id = %challenge_id,
                        error = %e,
                        code = ?e.code(),
                        "Challenge update dropped"
                    );
                }
            }
        }

        debug!(user_id = %user_id, deltas = deltas.len(), "Recorded meal event");
        Ok(deltas)
    }

    // ========================================================================
    // Concurrency helpers
    // ========================================================================

    /// Apply `mutate` and save with compare-and-swap, reloading on conflict
    ///
    /// Nothing is saved when `mutate` reports no change.
    async fn update_progress<F>(
        &self,
        mut progress: ChallengeProgress,
        mut mutate: F,
    ) -> AppResult<(ChallengeProgress, Vec<ChallengeProgressDelta>)>
    where
        F: FnMut(&mut ChallengeProgress) -> Vec<ChallengeProgressDelta> + Send,
    {
        let challenge_id = progress.challenge_id();
        let mut attempt = 1;
        loop {
            let expected_version = progress.version;
            let deltas = mutate(&mut progress);
            if deltas.is_empty() {
                return Ok((progress, deltas));
            }
            match self
                .challenges
                .save_progress(&progress, expected_version)
                .await
            {
                Ok(version) => {
                    progress.version = version;
                    return Ok((progress, deltas));
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_save_attempts => {
                    debug!(
                        challenge_id = %challenge_id,
                        attempt,
                        error = %e,
                        "Progress save conflict, reloading"
                    );
                    attempt += 1;
                    progress = self
                        .challenges
                        .get_challenge(challenge_id)
                        .await?
                        .ok_or_else(|| {
                            EngineError::storage(format!("challenge {challenge_id} disappeared"))
                        })?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Acquire the user's write lock within the configured budget
    async fn lock_user(&self, user_id: UserId) -> AppResult<UserLockGuard<'_>> {
        let lock = Arc::clone(self.user_locks.entry(user_id).or_default().value());
        let budget = self.config.user_lock_timeout();
        let guard = timeout(budget, lock.lock_owned()).await.map_err(|_| {
            EngineError::storage(format!(
                "user {user_id} lock not acquired within {} ms",
                budget.as_millis()
            ))
        })?;
        Ok(UserLockGuard {
            locks: &self.user_locks,
            user_id,
            guard: Some(guard),
        })
    }

    /// Users with a lock entry, held or awaited
    #[must_use]
    pub fn tracked_user_locks(&self) -> usize {
        self.user_locks.len()
    }
}

/// Held user lock; drops the user's map entry once nobody else holds or awaits it
struct UserLockGuard<'a> {
    locks: &'a DashMap<UserId, Arc<Mutex<()>>>,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone, so a count of one means only the map refers to it
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
