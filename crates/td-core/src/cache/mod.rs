//! Process-wide query cache.
//!
//! Maps a query identity (the filter half of a query key; the collection
//! half is the cache instance itself) to the last server-accurate value
//! for that query. The cache owns entry status transitions; the mutation
//! layer only ever rewrites entry content.
//!
//! Entries for distinct filter combinations are independent and do not
//! stay in sync with each other. An optimistic edit that is invisible to
//! a differently-filtered entry leaves that entry stale on purpose;
//! convergence happens through invalidation-driven refetch, never through
//! client-side re-derivation of server filter semantics.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::error::RemoteError;


/// Freshness configuration for one cache instance.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Age past which a ready entry becomes a refetch candidate on the
    /// next read. Zero means every read revalidates.
    pub stale_time: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
        }
    }
}

impl CachePolicy {
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self { stale_time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// A fetch for this key is in flight.
    Fetching,
    /// Content matches the last successful fetch.
    Ready,
    /// The last fetch failed. Previous content, if any, is still served.
    Error,
}

/// Point-in-time view of one entry, handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<V> {
    pub value: Option<V>,
    pub status: QueryStatus,
    pub error: Option<RemoteError>,
}

/// What the binder must do after asking to read a key.
pub enum ReadPlan<V> {
    /// Entry is fresh (or a fetch is already in flight with data to
    /// show); serve as-is.
    Serve(QuerySnapshot<V>),
    /// Stale data was served and the refetch claim is ours; revalidate in
    /// the background and call [`QueryCache::complete_fetch`].
    ServeStale(QuerySnapshot<V>),
    /// No content to serve; the fetch claim is ours. Run the fetch and
    /// call [`QueryCache::complete_fetch`].
    Fetch,
    /// Another reader holds the fetch claim and there is nothing to show
    /// yet; wait for a generation change and ask again.
    Wait(watch::Receiver<u64>),
}

/// Deep copy of entry contents taken before an optimistic edit, used to
/// put every touched entry back verbatim when the remote call fails.
pub struct CacheSnapshot<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> CacheSnapshot<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Entry<V> {
    value: Option<V>,
    error: Option<RemoteError>,
    status: QueryStatus,
    fetched_at: Option<Instant>,
    invalidated: bool,
}

impl<V: Clone> Entry<V> {
    fn snapshot(&self) -> QuerySnapshot<V> {
        QuerySnapshot {
            value: self.value.clone(),
            status: self.status,
            error: self.error.clone(),
        }
    }

    fn needs_refetch(&self, stale_time: Duration) -> bool {
        self.invalidated
            || self
                .fetched_at
                .map(|at| at.elapsed() >= stale_time)
                .unwrap_or(true)
    }
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    // Bumped on every settled fetch; waiters re-check the entry on change.
    generation: watch::Sender<u64>,
}

/// Associative store from query identity to last known server truth.
///
/// Explicitly constructed and passed by `Arc` to the binder and the
/// mutation coordinator; created at application start and cleared on
/// logout.
pub struct QueryCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    policy: CachePolicy,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(policy: CachePolicy) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                generation,
            }),
            policy,
        }
    }

    /// Point read without any state transition.
    pub async fn peek(&self, key: &K) -> Option<QuerySnapshot<V>> {
        let inner = self.inner.lock().await;
        inner.entries.get(key).map(Entry::snapshot)
    }

    /// Replace an entry's content with a server-accurate value, marking
    /// it ready and stamping its freshness.
    pub async fn set(&self, key: K, value: V) {
        let mut inner = self.inner.lock().await;
        inner.entries.insert(
            key,
            Entry {
                value: Some(value),
                error: None,
                status: QueryStatus::Ready,
                fetched_at: Some(Instant::now()),
                invalidated: false,
            },
        );
        inner.generation.send_modify(|g| *g += 1);
    }

    /// Apply a pure transform to an entry's content. A no-op when the key
    /// was never fetched; an optimistic edit must not fabricate entries.
    pub async fn update(&self, key: &K, f: impl FnOnce(&mut V)) {
        let mut inner = self.inner.lock().await;
        if let Some(value) = inner.entries.get_mut(key).and_then(|e| e.value.as_mut()) {
            f(value);
        }
    }

    /// Apply a pure transform to every entry's content.
    pub async fn update_all(&self, f: impl Fn(&mut V)) {
        let mut inner = self.inner.lock().await;
        for entry in inner.entries.values_mut() {
            if let Some(value) = entry.value.as_mut() {
                f(value);
            }
        }
    }

    /// Mark entries whose key matches the predicate for refetch. Nothing
    /// is fetched synchronously; the next read of a marked key claims a
    /// fetch.
    pub async fn invalidate_matching(&self, pred: impl Fn(&K) -> bool) {
        let mut inner = self.inner.lock().await;
        for (key, entry) in inner.entries.iter_mut() {
            if pred(key) {
                entry.invalidated = true;
            }
        }
    }

    pub async fn invalidate_all(&self) {
        self.invalidate_matching(|_| true).await;
    }

    /// Deep-copy the content of every entry that has one.
    pub async fn snapshot_all(&self) -> CacheSnapshot<K, V> {
        let inner = self.inner.lock().await;
        let entries = inner
            .entries
            .iter()
            .filter_map(|(k, e)| e.value.clone().map(|v| (k.clone(), v)))
            .collect();
        CacheSnapshot { entries }
    }

    /// Write snapshotted content back verbatim. Only content is touched;
    /// status, freshness, and invalidation flags keep their current
    /// values. Keys that disappeared since the snapshot are skipped.
    pub async fn restore(&self, snapshot: CacheSnapshot<K, V>) {
        let mut inner = self.inner.lock().await;
        for (key, value) in snapshot.entries {
            if let Some(entry) = inner.entries.get_mut(&key) {
                entry.value = Some(value);
            }
        }
    }

    /// Start a read of `key`, transitioning the entry per its state
    /// machine and telling the caller what to do next. At most one fetch
    /// claim exists per key at a time.
    pub async fn begin_read(&self, key: &K) -> ReadPlan<V> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        if let Some(entry) = inner.entries.get_mut(key) {
            if entry.status == QueryStatus::Fetching {
                if entry.value.is_some() {
                    // A revalidation is already in flight; serve what we
                    // have instead of waiting on it.
                    return ReadPlan::Serve(entry.snapshot());
                }
                return ReadPlan::Wait(inner.generation.subscribe());
            }
            if entry.needs_refetch(self.policy.stale_time) {
                entry.status = QueryStatus::Fetching;
                if entry.value.is_some() {
                    return ReadPlan::ServeStale(entry.snapshot());
                }
                return ReadPlan::Fetch;
            }
            return ReadPlan::Serve(entry.snapshot());
        }

        inner.entries.insert(
            key.clone(),
            Entry {
                value: None,
                error: None,
                status: QueryStatus::Fetching,
                fetched_at: None,
                invalidated: false,
            },
        );
        ReadPlan::Fetch
    }

    /// Settle the fetch claim for `key`. On success the entry becomes
    /// ready with fresh content; on failure it keeps its last-good
    /// content and exposes the error alongside it.
    pub async fn complete_fetch(
        &self,
        key: &K,
        result: Result<V, RemoteError>,
    ) -> QuerySnapshot<V> {
        let mut inner = self.inner.lock().await;
        let snapshot = match inner.entries.get_mut(key) {
            Some(entry) => {
                match result {
                    Ok(value) => {
                        entry.value = Some(value);
                        entry.error = None;
                        entry.status = QueryStatus::Ready;
                    }
                    Err(err) => {
                        debug!(error = %err, "fetch failed; keeping last-good content");
                        entry.error = Some(err);
                        entry.status = QueryStatus::Error;
                    }
                }
                entry.fetched_at = Some(Instant::now());
                entry.invalidated = false;
                entry.snapshot()
            }
            // The cache was cleared while the fetch was in flight (e.g.
            // logout). Report the result without resurrecting the entry.
            None => match result {
                Ok(value) => QuerySnapshot {
                    value: Some(value),
                    status: QueryStatus::Ready,
                    error: None,
                },
                Err(err) => QuerySnapshot {
                    value: None,
                    status: QueryStatus::Error,
                    error: Some(err),
                },
            },
        };
        inner.generation.send_modify(|g| *g += 1);
        snapshot
    }

    /// Drop every entry and wake all waiters. Logout teardown.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.generation.send_modify(|g| *g += 1);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
