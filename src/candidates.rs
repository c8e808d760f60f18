// ABOUTME: Candidate food lookup behind an injected source with bounded timeouts
// ABOUTME: Keeps the last good pool per filter in an LRU and falls back to it on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Candidate lookup
//!
//! Recommendation requests must never stall on the candidate collaborator. Every
//! lookup runs under `tokio::time::timeout`; on timeout or failure the last pool
//! fetched for the same filter is served, or an empty pool when none exists.

use async_trait::async_trait;
use lru::LruCache;
use nourish_core::errors::{AppResult, EngineError};
use nourish_core::models::{CandidateFilter, CandidateItem};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Source of candidate foods, typically a catalog or search service
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Items satisfying the filter
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be queried
    async fn list_candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<CandidateItem>>;
}

/// Fixed in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCandidateSource {
    items: Vec<CandidateItem>,
}

impl StaticCandidateSource {
    /// Catalog of the given items
    #[must_use]
    pub const fn new(items: Vec<CandidateItem>) -> Self {
        Self { items }
    }

    /// Every item in the catalog
    #[must_use]
    pub fn items(&self) -> &[CandidateItem] {
        &self.items
    }
}

#[async_trait]
impl CandidateSource for StaticCandidateSource {
    async fn list_candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<CandidateItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }
}

/// Where a candidate pool came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOrigin {
    /// Returned by the source for this request
    Fresh,
    /// Last good pool for the same filter
    Cached,
    /// Nothing available; recommendations degrade to empty
    Empty,
}

/// Candidates for one request with their provenance
#[derive(Debug, Clone)]
pub struct CandidatePool {
    /// The candidates
    pub items: Arc<Vec<CandidateItem>>,
    /// Provenance
    pub origin: PoolOrigin,
}

/// Timeout-bounded wrapper around a [`CandidateSource`]
pub struct CandidateLookup {
    source: Arc<dyn CandidateSource>,
    timeout: Duration,
    last_good: Mutex<LruCache<CandidateFilter, Arc<Vec<CandidateItem>>>>,
}

impl CandidateLookup {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Wrap a source with a lookup budget and a fallback cache of `capacity` filters
    #[must_use]
    pub fn new(source: Arc<dyn CandidateSource>, timeout: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            source,
            timeout,
            last_good: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Query the source within the time budget
    ///
    /// # Errors
    ///
    /// Returns `ExternalLookupTimeout` when the budget is exceeded, or the
    /// source's own error
    pub async fn lookup(&self, filter: &CandidateFilter) -> AppResult<Vec<CandidateItem>> {
        timeout(self.timeout, self.source.list_candidates(filter))
            .await
            .map_err(|_| EngineError::ExternalLookupTimeout(self.timeout))?
    }

    /// Candidates for the filter, degrading to the cached or an empty pool
    pub async fn fetch(&self, filter: &CandidateFilter) -> CandidatePool {
        match self.lookup(filter).await {
            Ok(items) => {
                let items = Arc::new(items);
                self.remember(filter, Arc::clone(&items));
                CandidatePool {
                    items,
                    origin: PoolOrigin::Fresh,
                }
            }
            Err(e) => {
                warn!(error = %e, code = ?e.code(), "Candidate lookup failed, using fallback pool");
                self.fallback(filter)
            }
        }
    }

    fn remember(&self, filter: &CandidateFilter, items: Arc<Vec<CandidateItem>>) {
        let Ok(mut cache) = self.last_good.lock() else {
            return;
        };
        cache.put(filter.clone(), items);
    }

    fn fallback(&self, filter: &CandidateFilter) -> CandidatePool {
        let cached = self
            .last_good
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(filter).cloned());
        if let Some(items) = cached {
            debug!(count = items.len(), "Serving last good candidate pool");
            return CandidatePool {
                items,
                origin: PoolOrigin::Cached,
            };
        }
        CandidatePool {
            items: Arc::new(Vec::new()),
            origin: PoolOrigin::Empty,
        }
    }
}
