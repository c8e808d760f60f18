// ABOUTME: Progress tracking configuration for challenge completion
// ABOUTME: Configures the completion threshold applied to challenge progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Progress tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Completion percentage at which a challenge completes, in `(0, 100]`
    pub completion_threshold_pct: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            completion_threshold_pct: 100.0,
        }
    }
}
