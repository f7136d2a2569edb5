//! Optimistic mutation coordinator for the todo collection.
//!
//! Every toggle and delete runs the same five steps as one sequential
//! procedure: snapshot the cached entries, apply the edit locally, await
//! the remote call, then either discard the snapshot (success) or restore
//! it verbatim (failure) — and invalidate the collection in both cases.
//!
//! Invalidation on every settled path is mandatory, not an optimization.
//! Two overlapping mutations may interleave between one another's
//! snapshot and restore; a naive restore would clobber the later edit,
//! and the refetch forced by invalidation is what puts every entry back
//! on server truth.
//!
//! The whole procedure runs on a detached task and the public method
//! awaits its handle. A caller that goes away mid-flight (a dismissed
//! view, a navigation) therefore cannot cancel settlement: once a
//! mutation starts, restore and invalidation always run.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use td_core::cache::QueryCache;
use td_core::error::RemoteError;
use td_core::page::Page;
use td_core::ports::TodoRemotePort;
use td_core::query::TodoFilter;
use td_core::todo::{Todo, TodoDraft, TodoId};

use crate::error::ClientError;

pub type TodoCache = QueryCache<TodoFilter, Page<Todo>>;

pub struct MutationCoordinator<R> {
    cache: Arc<TodoCache>,
    remote: Arc<R>,
}

impl<R: TodoRemotePort + 'static> MutationCoordinator<R> {
    pub fn new(cache: Arc<TodoCache>, remote: Arc<R>) -> Self {
        Self { cache, remote }
    }

    /// Create a todo. There is no optimistic phase: the entity has no id
    /// yet and its position under any server-defined sort is unknown, so
    /// no local insertion is ever attempted. Cached pages change only
    /// through the invalidation-driven refetch after success.
    pub async fn create(&self, draft: &TodoDraft) -> Result<Todo, ClientError> {
        draft.validate()?;
        let draft = draft.clone();
        let cache = Arc::clone(&self.cache);
        let remote = Arc::clone(&self.remote);
        settle(tokio::spawn(async move {
            match remote.create(&draft).await {
                Ok(todo) => {
                    debug!(id = todo.id, "todo created, invalidating cached pages");
                    cache.invalidate_all().await;
                    Ok(todo)
                }
                Err(err) => Err(ClientError::from(err)),
            }
        }))
        .await
    }

    /// Full replace of a todo's mutable fields. Non-optimistic: a field
    /// edit can move the entity under the active sort, and guessing that
    /// order locally is exactly what this layer refuses to do.
    pub async fn update(&self, id: TodoId, draft: &TodoDraft) -> Result<Todo, ClientError> {
        draft.validate()?;
        let draft = draft.clone();
        let cache = Arc::clone(&self.cache);
        let remote = Arc::clone(&self.remote);
        settle(tokio::spawn(async move {
            match remote.update(id, &draft).await {
                Ok(todo) => {
                    cache.invalidate_all().await;
                    Ok(todo)
                }
                Err(err) => Err(ClientError::from(err)),
            }
        }))
        .await
    }

    /// Flip `completed` on every cached page that holds the todo, before
    /// the server confirms. Entries that exclude the todo (e.g. filtered
    /// by the other `completed` value) are intentionally left untouched
    /// and stay stale until the invalidation-driven refetch.
    pub async fn toggle_complete(&self, id: TodoId) -> Result<Todo, ClientError> {
        let cache = Arc::clone(&self.cache);
        let remote = Arc::clone(&self.remote);
        settle(tokio::spawn(async move {
            let snapshot = cache.snapshot_all().await;
            cache
                .update_all(|page| {
                    for todo in &mut page.content {
                        if todo.id == id {
                            todo.completed = !todo.completed;
                        }
                    }
                })
                .await;

            match remote.toggle_complete(id).await {
                Ok(todo) => {
                    cache.invalidate_all().await;
                    Ok(todo)
                }
                Err(err) => {
                    warn!(id, error = %err, "toggle failed, restoring snapshot");
                    cache.restore(snapshot).await;
                    cache.invalidate_all().await;
                    Err(ClientError::from(err))
                }
            }
        }))
        .await
    }

    /// Remove the todo from every cached page immediately; put it back in
    /// its original position if the server refuses.
    pub async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let cache = Arc::clone(&self.cache);
        let remote = Arc::clone(&self.remote);
        settle(tokio::spawn(async move {
            let snapshot = cache.snapshot_all().await;
            cache
                .update_all(|page| page.content.retain(|todo| todo.id != id))
                .await;

            match remote.delete(id).await {
                Ok(()) => {
                    cache.invalidate_all().await;
                    Ok(())
                }
                Err(err) => {
                    warn!(id, error = %err, "delete failed, restoring snapshot");
                    cache.restore(snapshot).await;
                    cache.invalidate_all().await;
                    Err(ClientError::from(err))
                }
            }
        }))
        .await
    }
}

/// Await a detached mutation. A join error means the task panicked; the
/// caller still gets a typed error instead of a panic of its own.
async fn settle<T>(handle: JoinHandle<Result<T, ClientError>>) -> Result<T, ClientError> {
    match handle.await {
        Ok(result) => result,
        Err(err) => Err(RemoteError::Network(format!("mutation task failed: {err}")).into()),
    }
}
