//! Query binder: resolves a key to a live cache entry.
//!
//! Reads go through the cache's `begin_read`/`complete_fetch` protocol:
//! fetch on a miss, attach to a pending fetch instead of duplicating it,
//! and serve stale content immediately while a background task
//! revalidates. A failed fetch is exposed alongside the last-good data
//! and is never retried by the binder itself; callers retry through
//! [`QueryBinder::refetch`].

use std::hash::Hash;
use std::sync::Arc;

use td_core::cache::{QueryCache, QuerySnapshot, ReadPlan};
use td_core::error::RemoteError;
use td_core::ports::QueryFetchPort;

pub struct QueryBinder<K, V, F> {
    cache: Arc<QueryCache<K, V>>,
    fetcher: Arc<F>,
}

impl<K, V, F> QueryBinder<K, V, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: QueryFetchPort<K, V> + 'static,
{
    pub fn new(cache: Arc<QueryCache<K, V>>, fetcher: Arc<F>) -> Self {
        Self { cache, fetcher }
    }

    /// Current best-known state for `key`, fetching if the cache has
    /// nothing fresh. Returns as soon as there is something to show:
    /// ready data, stale data with a refresh running, or an error with
    /// whatever data survived it.
    pub async fn read(&self, key: &K) -> QuerySnapshot<V> {
        loop {
            match self.cache.begin_read(key).await {
                ReadPlan::Serve(snapshot) => return snapshot,
                ReadPlan::ServeStale(snapshot) => {
                    self.spawn_revalidate(key.clone());
                    return snapshot;
                }
                ReadPlan::Fetch => {
                    // The claim is ours. Settle it on a detached task so a
                    // cancelled caller cannot strand the entry in its
                    // fetching state; waiters on this key depend on the
                    // claim always being completed.
                    let cache = Arc::clone(&self.cache);
                    let fetcher = Arc::clone(&self.fetcher);
                    let owned = key.clone();
                    let handle = tokio::spawn(async move {
                        let result = fetcher.fetch(&owned).await;
                        cache.complete_fetch(&owned, result).await
                    });
                    return match handle.await {
                        Ok(snapshot) => snapshot,
                        Err(err) => {
                            // The fetch task panicked; settle the claim
                            // with an error so waiters are released.
                            let failure =
                                RemoteError::Network(format!("fetch task failed: {err}"));
                            self.cache.complete_fetch(key, Err(failure)).await
                        }
                    };
                }
                ReadPlan::Wait(mut rx) => {
                    // Another reader holds the fetch claim; wake on the
                    // next settled fetch and ask again.
                    let _ = rx.changed().await;
                }
            }
        }
    }

    /// Caller-initiated retry: mark the key not-authoritative and read it
    /// again.
    pub async fn refetch(&self, key: &K) -> QuerySnapshot<V> {
        let target = key.clone();
        self.cache.invalidate_matching(|k| *k == target).await;
        self.read(key).await
    }

    /// Revalidation outlives the read that triggered it; dropping the
    /// caller must not abandon the refetch claim.
    fn spawn_revalidate(&self, key: K) {
        let cache = Arc::clone(&self.cache);
        let fetcher = Arc::clone(&self.fetcher);
        tokio::spawn(async move {
            let result = fetcher.fetch(&key).await;
            cache.complete_fetch(&key, result).await;
        });
    }
}
