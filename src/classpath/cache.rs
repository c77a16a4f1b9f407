//! Per-project classpath cache.
//!
//! Classpath resolution fetches aspect output and walks every record of a
//! project, so the IDE asks for the same classpath far more often than it
//! changes. [`ClasspathCache`] keeps the last result per project for a
//! configurable time-to-live.
//!
//! # Concurrency
//!
//! Entries live in a [`DashMap`] so readers never block each other. Computing a
//! missing entry goes through [`ClasspathCache::get_or_compute`], which holds a
//! per-project [`tokio::sync::Mutex`] from the cache check until the result is
//! stored. Two concurrent requests for the same project therefore resolve once;
//! requests for different projects proceed in parallel.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::collaborators::Clock;
use super::entry::{Project, ResolvedClasspath};
use crate::core::BzlError;

#[derive(Debug, Clone)]
struct CacheEntry {
    resolved: Arc<ResolvedClasspath>,
    computed_at_millis: i64,
}

/// Memoized classpaths keyed by project name.
pub struct ClasspathCache {
    entries: DashMap<String, CacheEntry>,
    /// One lock per project, created on first use
    compute_locks: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ClasspathCache {
    /// Create an empty cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            compute_locks: DashMap::new(),
            ttl,
            clock,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// The configured time-to-live.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// The cached classpath of `project`, if present and not expired.
    ///
    /// An expired entry is removed as a side effect. Counts as a hit or miss.
    pub fn get(&self, project: &Project) -> Option<Arc<ResolvedClasspath>> {
        let found = self.peek(project);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Like [`get`](Self::get) without touching the statistics.
    fn peek(&self, project: &Project) -> Option<Arc<ResolvedClasspath>> {
        let now = self.clock.current_time_millis();

        let expired = {
            let entry = self.entries.get(project.name())?;
            let age = now.saturating_sub(entry.computed_at_millis);
            if age <= self.ttl_millis() {
                return Some(Arc::clone(&entry.resolved));
            }
            age
        };

        // the read guard is gone, so removing cannot deadlock the shard
        self.entries.remove(project.name());
        tracing::info!(
            "Classpath cache entry for project {} expired after {} ms, evicting",
            project,
            expired
        );
        None
    }

    /// Store a classpath for `project`, replacing any previous entry.
    pub fn put(&self, project: &Project, resolved: ResolvedClasspath) -> Arc<ResolvedClasspath> {
        let resolved = Arc::new(resolved);
        self.entries.insert(
            project.name().to_string(),
            CacheEntry {
                resolved: Arc::clone(&resolved),
                computed_at_millis: self.clock.current_time_millis(),
            },
        );
        resolved
    }

    /// Drop the entry for `project`. Returns whether one existed.
    pub fn invalidate(&self, project: &Project) -> bool {
        let removed = self.entries.remove(project.name()).is_some();
        if removed {
            tracing::debug!("Invalidated cached classpath of project {}", project);
        }
        removed
    }

    /// Drop every entry and reset the statistics.
    ///
    /// Compute locks survive, so a resolution still running keeps excluding
    /// new ones for the same project.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    fn compute_lock(&self, project: &Project) -> Arc<Mutex<()>> {
        self.compute_locks
            .entry(project.name().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Return the cached classpath of `project`, computing and storing it on a
    /// miss.
    ///
    /// The per-project lock is held across check, compute and store. A failed
    /// computation stores nothing and the error is returned to the caller. A
    /// classpath that flushed the aspect cache is returned without being
    /// stored, so the next request fetches fresh aspect data.
    pub async fn get_or_compute<F, Fut>(
        &self,
        project: &Project,
        compute: F,
    ) -> Result<Arc<ResolvedClasspath>, BzlError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolvedClasspath, BzlError>>,
    {
        if let Some(resolved) = self.get(project) {
            return Ok(resolved);
        }

        let lock = self.compute_lock(project);
        let _guard = lock.lock().await;

        // someone else may have finished while we waited
        if let Some(resolved) = self.peek(project) {
            return Ok(resolved);
        }

        tracing::debug!("Computing classpath for project {}", project);
        let resolved = compute().await?;
        if resolved.flush_requested() {
            tracing::debug!(
                "Not caching classpath of project {}, its aspect data was flushed",
                project
            );
            return Ok(Arc::new(resolved));
        }
        Ok(self.put(project, resolved))
    }
}

impl std::fmt::Debug for ClasspathCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClasspathCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
