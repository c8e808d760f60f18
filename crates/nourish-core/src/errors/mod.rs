// ABOUTME: Unified error types for the personalization engine
// ABOUTME: Defines EngineError variants, stable error codes, and the AppResult alias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Engine Error Handling
//!
//! Every failure inside the engine is expressed as an [`EngineError`]. None of them
//! are meant to reach the meal-logging caller: the engine facade logs them and
//! degrades to neutral output. The [`ErrorCode`] gives each kind a stable identifier
//! for log correlation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Data quality (3000-3999)
    /// Not enough history to produce personalized output
    #[serde(rename = "INSUFFICIENT_DATA")]
    InsufficientData = 3000,
    /// Event failed validation
    #[serde(rename = "INVALID_EVENT")]
    InvalidEvent = 3001,

    // Concurrency (4000-4999)
    /// Optimistic version check failed
    #[serde(rename = "CONCURRENT_UPDATE_CONFLICT")]
    ConcurrentUpdateConflict = 4002,

    // External services (5000-5999)
    /// Candidate lookup exceeded its time budget
    #[serde(rename = "EXTERNAL_LOOKUP_TIMEOUT")]
    ExternalLookupTimeout = 5001,
    /// Candidate lookup returned an error
    #[serde(rename = "EXTERNAL_LOOKUP_FAILED")]
    ExternalLookupFailed = 5000,

    // Configuration (6000-6999)
    /// Configuration is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal (9000-9999)
    /// Storage collaborator failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
}

impl ErrorCode {
    /// Get a human-readable description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InsufficientData => "Not enough history to personalize output",
            Self::InvalidEvent => "The meal event is malformed",
            Self::ConcurrentUpdateConflict => "Challenge progress was modified concurrently",
            Self::ExternalLookupTimeout => "Candidate lookup timed out",
            Self::ExternalLookupFailed => "Candidate lookup failed",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::StorageError => "Storage operation failed",
        }
    }

    /// Whether the engine can produce degraded output and continue
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ConfigInvalid)
    }
}

/// Errors raised inside the personalization engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Too little history; callers fall back to defaults or onboarding output
    #[error("insufficient data for user {user_id}: {reason}")]
    InsufficientData {
        /// User the data belongs to
        user_id: Uuid,
        /// What was missing
        reason: String,
    },

    /// A meal event failed validation and was rejected
    #[error("invalid event {event_id}: {reason}")]
    InvalidEvent {
        /// Offending event
        event_id: Uuid,
        /// Validation failure
        reason: String,
    },

    /// Progress row version did not match the expected one
    #[error(
        "concurrent update on challenge {challenge_id}: expected version {expected}, found {actual}"
    )]
    ConcurrentUpdateConflict {
        /// Challenge whose progress was being saved
        challenge_id: Uuid,
        /// Version the writer started from
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Candidate lookup exceeded its time budget
    #[error("external lookup timed out after {0:?}")]
    ExternalLookupTimeout(Duration),

    /// Candidate lookup failed
    #[error("external lookup failed: {0}")]
    ExternalLookup(String),

    /// Storage collaborator failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration rejected by validation
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Stable code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InsufficientData { .. } => ErrorCode::InsufficientData,
            Self::InvalidEvent { .. } => ErrorCode::InvalidEvent,
            Self::ConcurrentUpdateConflict { .. } => ErrorCode::ConcurrentUpdateConflict,
            Self::ExternalLookupTimeout(_) => ErrorCode::ExternalLookupTimeout,
            Self::ExternalLookup(_) => ErrorCode::ExternalLookupFailed,
            Self::Storage(_) => ErrorCode::StorageError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
        }
    }

    /// Create an invalid event error
    #[must_use]
    pub fn invalid_event(event_id: Uuid, reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            event_id,
            reason: reason.into(),
        }
    }

    /// Create an insufficient data error
    #[must_use]
    pub fn insufficient_data(user_id: Uuid, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            user_id,
            reason: reason.into(),
        }
    }

    /// Create a storage error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Whether a retry of the same operation may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentUpdateConflict { .. } | Self::ExternalLookupTimeout(_)
        )
    }
}

/// Result type used throughout the engine
pub type AppResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_kinds() {
        let err = EngineError::invalid_event(Uuid::nil(), "negative protein");
        assert_eq!(err.code(), ErrorCode::InvalidEvent);
        assert!(!err.is_retryable());

        let conflict = EngineError::ConcurrentUpdateConflict {
            challenge_id: Uuid::nil(),
            expected: 1,
            actual: 2,
        };
        assert!(conflict.is_retryable());
        assert!(conflict.code().is_recoverable());
        assert!(!ErrorCode::ConfigInvalid.is_recoverable());
    }

    #[test]
    fn test_error_code_serializes_to_stable_name() {
        let json = serde_json::to_string(&ErrorCode::ExternalLookupTimeout).unwrap();
        assert_eq!(json, "\"EXTERNAL_LOOKUP_TIMEOUT\"");
    }
}
