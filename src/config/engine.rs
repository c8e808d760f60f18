// ABOUTME: Engine runtime configuration types loaded from the environment
// ABOUTME: Candidate lookup timeout, per-user lock timeout, save retries and profile cache age
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::TimeDelta;
use nourish_core::constants::runtime;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings of the personalization facade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Budget for one candidate lookup (milliseconds)
    pub lookup_timeout_ms: u64,
    /// Budget for acquiring a user's write lock (milliseconds)
    pub user_lock_timeout_ms: u64,
    /// Attempts for a versioned progress save before giving up
    pub max_save_attempts: u32,
    /// Cached profiles older than this are recomputed (seconds)
    pub profile_max_age_secs: i64,
    /// Candidate pools kept for timeout fallback
    pub candidate_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: runtime::LOOKUP_TIMEOUT_MS,
            user_lock_timeout_ms: runtime::USER_LOCK_TIMEOUT_MS,
            max_save_attempts: runtime::MAX_SAVE_ATTEMPTS,
            profile_max_age_secs: runtime::PROFILE_MAX_AGE_SECS,
            candidate_cache_capacity: runtime::CANDIDATE_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from environment
    ///
    /// Unparseable or non-positive values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lookup_timeout_ms: positive_env("NOURISH_LOOKUP_TIMEOUT_MS")
                .unwrap_or(defaults.lookup_timeout_ms),
            user_lock_timeout_ms: positive_env("NOURISH_USER_LOCK_TIMEOUT_MS")
                .unwrap_or(defaults.user_lock_timeout_ms),
            max_save_attempts: positive_env("NOURISH_MAX_SAVE_ATTEMPTS")
                .unwrap_or(defaults.max_save_attempts),
            profile_max_age_secs: positive_env("NOURISH_PROFILE_MAX_AGE_SECS")
                .unwrap_or(defaults.profile_max_age_secs),
            candidate_cache_capacity: positive_env("NOURISH_CANDIDATE_CACHE_CAPACITY")
                .unwrap_or(defaults.candidate_cache_capacity),
        }
    }

    /// Candidate lookup budget
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// User lock acquisition budget
    #[must_use]
    pub const fn user_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.user_lock_timeout_ms)
    }

    /// Maximum age of a cached profile
    #[must_use]
    pub fn profile_max_age(&self) -> TimeDelta {
        TimeDelta::seconds(self.profile_max_age_secs)
    }
}

fn positive_env<T>(key: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_runtime_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.lookup_timeout(), Duration::from_secs(2));
        assert_eq!(config.user_lock_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_save_attempts, 3);
        assert_eq!(config.profile_max_age(), TimeDelta::hours(1));
        assert_eq!(config.candidate_cache_capacity, 64);
    }
}
