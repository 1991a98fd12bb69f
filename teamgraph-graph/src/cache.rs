// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Built graph cache
//!
//! Graphs are cached per build scope (`project:branch`) for a fixed TTL
//! (five minutes by default). Callers may bypass the cache to force a
//! rebuild, and invalidate a scope when new activity lands.
//!
//! Entries live in a bounded moka cache. Freshness is judged against an
//! injected [`Clock`], so expiry is testable without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use moka::sync::Cache;
use parking_lot::RwLock;
use teamgraph_core::Graph;
use tracing::debug;

use crate::config::CacheConfig;
use crate::source::BuildScope;

/// Upper bound on the TTL (one year)
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone)]
struct CachedGraph {
    graph: Arc<Graph>,
    built_at: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

/// Per-scope graph cache
pub struct GraphCache<C: Clock = SystemClock> {
    entries: Cache<String, CachedGraph>,
    ttl: Duration,
    clock: C,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GraphCache<SystemClock> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> GraphCache<C> {
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        let ttl_secs = config.ttl_secs.min(MAX_TTL_SECS);
        // moka's own TTL only reclaims memory; freshness is decided by `clock`
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(std::time::Duration::from_secs(ttl_secs))
            .build();

        Self {
            entries,
            ttl: Duration::seconds(ttl_secs as i64),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Fresh cached graph of a scope
    pub fn get(&self, scope: &BuildScope) -> Option<Arc<Graph>> {
        let key = scope.cache_key();
        let hit = match self.entries.get(&key) {
            Some(entry) if self.clock.now() - entry.built_at < self.ttl => Some(entry.graph),
            Some(_) => {
                debug!(scope = %scope, "Cached graph expired");
                self.entries.invalidate(&key);
                None
            }
            None => None,
        };

        match hit {
            Some(graph) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(graph)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a graph for a scope
    pub fn insert(&self, scope: &BuildScope, graph: Graph) -> Arc<Graph> {
        let graph = Arc::new(graph);
        self.entries.insert(
            scope.cache_key(),
            CachedGraph {
                graph: Arc::clone(&graph),
                built_at: self.clock.now(),
            },
        );
        graph
    }

    /// Cached graph of `scope`, or build and cache it.
    ///
    /// `bypass` skips the lookup but still caches the new graph. A failed
    /// build is not cached. Builds run outside the cache, so two
    /// concurrent misses for one scope may both build; the later insert wins.
    pub fn get_or_build<E>(
        &self,
        scope: &BuildScope,
        bypass: bool,
        build: impl FnOnce() -> Result<Graph, E>,
    ) -> Result<Arc<Graph>, E> {
        if !bypass {
            if let Some(graph) = self.get(scope) {
                debug!(scope = %scope, "Graph cache hit");
                return Ok(graph);
            }
        }

        debug!(scope = %scope, bypass, "Building graph");
        let graph = build()?;
        Ok(self.insert(scope, graph))
    }

    /// Drop the cached graph of a scope. Returns whether one was cached.
    pub fn invalidate(&self, scope: &BuildScope) -> bool {
        self.entries.remove(&scope.cache_key()).is_some()
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> GraphCacheStats {
        self.entries.run_pending_tasks();
        GraphCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.entry_count(),
        }
    }
}

impl Default for GraphCache<SystemClock> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
