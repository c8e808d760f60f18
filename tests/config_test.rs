// ABOUTME: Tests for personalization and engine configuration loading
// ABOUTME: Validates defaults, environment overrides and rejection of invalid values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nourish_engine::config::{EngineConfig, PersonalizationConfig};
use nourish_intelligence::config::intelligence::ConfigError;
use serial_test::serial;
use std::env;
use std::time::Duration;

#[test]
fn test_default_config_validates() {
    let config = PersonalizationConfig::<true>::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.scoring.thresholds.default_top_k, 10);
    assert_eq!(config.challenges.max_active_challenges, 3);
}

#[test]
fn test_scoring_weights_must_sum_to_one() {
    let mut config = PersonalizationConfig::<true>::default();
    config.scoring.weights.cuisine = 0.9;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidWeights(_))
    ));
}

#[test]
fn test_completion_threshold_range() {
    let mut config = PersonalizationConfig::<true>::default();
    config.tracking.completion_threshold_pct = 0.0;
    assert!(config.validate().is_err());
    config.tracking.completion_threshold_pct = 90.0;
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_environment_overrides_personalization() {
    env::set_var("NOURISH_SCORING_TOP_K", "7");
    env::set_var("NOURISH_CHALLENGE_WINDOW_DAYS", "14");

    let config = PersonalizationConfig::load().unwrap();

    assert_eq!(config.scoring.thresholds.default_top_k, 7);
    assert_eq!(config.challenges.challenge_window_days, 14);

    env::remove_var("NOURISH_SCORING_TOP_K");
    env::remove_var("NOURISH_CHALLENGE_WINDOW_DAYS");
}

#[test]
#[serial]
fn test_unparseable_override_is_rejected() {
    env::set_var("NOURISH_LEARNER_DECAY_PER_DAY", "fast");
    let result = PersonalizationConfig::load();
    env::remove_var("NOURISH_LEARNER_DECAY_PER_DAY");

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
#[serial]
fn test_out_of_range_override_fails_validation() {
    env::set_var("NOURISH_SCORING_TOP_K", "0");
    let result = PersonalizationConfig::load();
    env::remove_var("NOURISH_SCORING_TOP_K");

    assert!(result.is_err());
}

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.lookup_timeout(), Duration::from_millis(2000));
    assert_eq!(config.user_lock_timeout(), Duration::from_millis(5000));
    assert_eq!(config.max_save_attempts, 3);
    assert_eq!(config.profile_max_age().num_seconds(), 3600);
}

#[test]
#[serial]
fn test_engine_config_from_env() {
    env::set_var("NOURISH_LOOKUP_TIMEOUT_MS", "250");
    env::set_var("NOURISH_MAX_SAVE_ATTEMPTS", "5");
    env::set_var("NOURISH_USER_LOCK_TIMEOUT_MS", "0");
    env::set_var("NOURISH_PROFILE_MAX_AGE_SECS", "soon");

    let config = EngineConfig::from_env();

    env::remove_var("NOURISH_LOOKUP_TIMEOUT_MS");
    env::remove_var("NOURISH_MAX_SAVE_ATTEMPTS");
    env::remove_var("NOURISH_USER_LOCK_TIMEOUT_MS");
    env::remove_var("NOURISH_PROFILE_MAX_AGE_SECS");

    let defaults = EngineConfig::default();
    assert_eq!(config.lookup_timeout_ms, 250);
    assert_eq!(config.max_save_attempts, 5);
    assert_eq!(config.user_lock_timeout_ms, defaults.user_lock_timeout_ms);
    assert_eq!(config.profile_max_age_secs, defaults.profile_max_age_secs);
}

#[test]
fn test_engine_config_serializes() {
    let json = serde_json::to_value(EngineConfig::default()).unwrap();
    assert_eq!(json["lookup_timeout_ms"], 2000);
    assert_eq!(json["candidate_cache_capacity"], 64);
}
