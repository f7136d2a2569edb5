//! Tests for the five-step optimistic mutation protocol.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::predicate::eq;
use tokio::sync::Notify;

use td_core::cache::{CachePolicy, QueryCache, ReadPlan};
use td_core::error::RemoteError;
use td_core::page::Page;
use td_core::ports::{RemoteResult, TodoRemotePort};
use td_core::query::TodoFilter;
use td_core::todo::{Todo, TodoDraft, TodoId};

use crate::coordinator::{MutationCoordinator, TodoCache};
use crate::error::ClientError;

use super::fixtures::*;
use super::mock_ports::MockTodoRemote;

fn fresh_cache() -> Arc<TodoCache> {
    Arc::new(QueryCache::new(CachePolicy::with_stale_time(
        Duration::from_secs(60),
    )))
}

fn ids_and_flags(page: &Page<Todo>) -> Vec<(TodoId, bool)> {
    page.content.iter().map(|t| (t.id, t.completed)).collect()
}

async fn content_of(cache: &TodoCache, filter: &TodoFilter) -> Page<Todo> {
    cache.peek(filter).await.unwrap().value.unwrap()
}

/// Remote fake that records what the cache held at dispatch time, then
/// fails. This pins down that the optimistic edit lands synchronously
/// before the suspension point.
struct ObserveThenFail {
    cache: Arc<TodoCache>,
    filter: TodoFilter,
    seen: Mutex<Option<Vec<(TodoId, bool)>>>,
}

impl ObserveThenFail {
    fn new(cache: Arc<TodoCache>, filter: TodoFilter) -> Self {
        Self {
            cache,
            filter,
            seen: Mutex::new(None),
        }
    }

    async fn observe(&self) {
        let page = content_of(&self.cache, &self.filter).await;
        *self.seen.lock().unwrap() = Some(ids_and_flags(&page));
    }

    fn seen(&self) -> Vec<(TodoId, bool)> {
        self.seen.lock().unwrap().clone().unwrap()
    }
}

#[async_trait]
impl TodoRemotePort for ObserveThenFail {
    async fn list(&self, _filter: &TodoFilter) -> RemoteResult<Page<Todo>> {
        unimplemented!("not dispatched in these tests")
    }

    async fn create(&self, _draft: &TodoDraft) -> RemoteResult<Todo> {
        unimplemented!("not dispatched in these tests")
    }

    async fn update(&self, _id: TodoId, _draft: &TodoDraft) -> RemoteResult<Todo> {
        self.observe().await;
        Err(RemoteError::Network("connection reset".into()))
    }

    async fn toggle_complete(&self, _id: TodoId) -> RemoteResult<Todo> {
        self.observe().await;
        Err(RemoteError::Network("connection reset".into()))
    }

    async fn delete(&self, _id: TodoId) -> RemoteResult<()> {
        self.observe().await;
        Err(RemoteError::Network("connection reset".into()))
    }
}

#[tokio::test]
async fn toggle_applies_before_dispatch_and_reverts_on_failure() {
    let cache = fresh_cache();
    let original = make_page(vec![make_todo(1, false), make_todo(2, false)]);
    cache.set(open_filter(), original.clone()).await;

    let remote = Arc::new(ObserveThenFail::new(Arc::clone(&cache), open_filter()));
    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::clone(&remote));

    let result = coordinator.toggle_complete(1).await;
    assert!(matches!(result, Err(ClientError::Remote(_))));

    // The flip was visible while the call was in flight...
    assert_eq!(remote.seen(), vec![(1, true), (2, false)]);
    // ...and the restore put the pre-toggle content back exactly.
    assert_eq!(content_of(&cache, &open_filter()).await, original);

    // The key is marked for refetch regardless of the failure.
    assert!(matches!(
        cache.begin_read(&open_filter()).await,
        ReadPlan::ServeStale(_)
    ));
}

#[tokio::test]
async fn delete_restores_item_at_original_index_on_failure() {
    let cache = fresh_cache();
    let original = make_page(vec![make_todo(1, false), make_todo(2, false), make_todo(3, true)]);
    cache.set(open_filter(), original.clone()).await;

    let remote = Arc::new(ObserveThenFail::new(Arc::clone(&cache), open_filter()));
    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::clone(&remote));

    assert!(coordinator.delete(2).await.is_err());

    // Removed immediately while in flight, including from the middle.
    assert_eq!(remote.seen(), vec![(1, false), (3, true)]);
    // Back in its original position after the restore.
    let after = content_of(&cache, &open_filter()).await;
    assert_eq!(after, original);
    assert_eq!(after.content[1].id, 2);
}

#[tokio::test]
async fn update_has_no_optimistic_phase() {
    let cache = fresh_cache();
    let original = make_page(vec![make_todo(1, false)]);
    cache.set(open_filter(), original.clone()).await;

    let remote = Arc::new(ObserveThenFail::new(Arc::clone(&cache), open_filter()));
    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::clone(&remote));

    let draft = TodoDraft::new("new title");
    assert!(coordinator.update(1, &draft).await.is_err());

    // Content at dispatch time was untouched.
    assert_eq!(remote.seen(), vec![(1, false)]);
    assert_eq!(content_of(&cache, &open_filter()).await, original);
}

#[tokio::test]
async fn toggle_success_still_invalidates_for_reconciliation() {
    let cache = fresh_cache();
    cache
        .set(open_filter(), make_page(vec![make_todo(1, false)]))
        .await;

    let mut remote = MockTodoRemote::new();
    remote
        .expect_toggle_complete()
        .with(eq(1))
        .returning(|_| Ok(make_todo(1, true)));

    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::new(remote));
    coordinator.toggle_complete(1).await.unwrap();

    // The optimistic flip stays visible, but the entry must refetch next
    // read; the server may have changed ordering or timestamps the edit
    // could not predict.
    let page = content_of(&cache, &open_filter()).await;
    assert!(page.content[0].completed);
    assert!(matches!(
        cache.begin_read(&open_filter()).await,
        ReadPlan::ServeStale(_)
    ));
}

#[tokio::test]
async fn toggle_leaves_differently_filtered_entries_uncorrupted() {
    let cache = fresh_cache();
    cache
        .set(
            open_filter(),
            make_page(vec![make_todo(1, false), make_todo(2, false)]),
        )
        .await;
    cache
        .set(done_filter(), make_page(vec![make_todo(3, true)]))
        .await;

    let mut remote = MockTodoRemote::new();
    remote
        .expect_toggle_complete()
        .returning(|_| Ok(make_todo(1, true)));

    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::new(remote));
    coordinator.toggle_complete(1).await.unwrap();

    // The entry that never contained id 1 is untouched (a no-op apply),
    // not corrupted. It converges through its own refetch.
    let done = content_of(&cache, &done_filter()).await;
    assert_eq!(ids_and_flags(&done), vec![(3, true)]);
    assert!(matches!(
        cache.begin_read(&done_filter()).await,
        ReadPlan::ServeStale(_)
    ));
}

#[tokio::test]
async fn create_never_inserts_locally() {
    let cache = fresh_cache();
    cache
        .set(
            open_filter(),
            make_page(vec![make_todo(1, false), make_todo(2, false)]),
        )
        .await;

    let mut remote = MockTodoRemote::new();
    remote
        .expect_create()
        .withf(|draft: &TodoDraft| draft.title == "new one")
        .returning(|_| Ok(make_todo(9, false)));

    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::new(remote));
    let created = coordinator.create(&TodoDraft::new("new one")).await.unwrap();
    assert_eq!(created.id, 9);

    // Content length did not grow synchronously; the new entity arrives
    // only through the invalidation-driven refetch.
    assert_eq!(content_of(&cache, &open_filter()).await.len(), 2);
    assert!(matches!(
        cache.begin_read(&open_filter()).await,
        ReadPlan::ServeStale(_)
    ));
}

#[tokio::test]
async fn invalid_draft_blocks_dispatch_entirely() {
    let cache = fresh_cache();
    cache
        .set(open_filter(), make_page(vec![make_todo(1, false)]))
        .await;

    // No expectations: any call on the mock panics the test.
    let remote = MockTodoRemote::new();
    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::new(remote));

    let result = coordinator.create(&TodoDraft::new("   ")).await;
    assert!(matches!(result, Err(ClientError::Validation(_))));

    // Nothing was invalidated; the entry is still fresh.
    assert!(matches!(
        cache.begin_read(&open_filter()).await,
        ReadPlan::Serve(_)
    ));
}

/// Remote fake that holds the dispatch open until released, then fails.
/// Lets a test drop the caller's future while the call is in flight.
struct GatedFailRemote {
    gate: Notify,
}

#[async_trait]
impl TodoRemotePort for GatedFailRemote {
    async fn list(&self, _filter: &TodoFilter) -> RemoteResult<Page<Todo>> {
        unimplemented!("not dispatched in these tests")
    }

    async fn create(&self, _draft: &TodoDraft) -> RemoteResult<Todo> {
        unimplemented!("not dispatched in these tests")
    }

    async fn update(&self, _id: TodoId, _draft: &TodoDraft) -> RemoteResult<Todo> {
        unimplemented!("not dispatched in these tests")
    }

    async fn toggle_complete(&self, _id: TodoId) -> RemoteResult<Todo> {
        self.gate.notified().await;
        Err(RemoteError::Network("connection reset".into()))
    }

    async fn delete(&self, _id: TodoId) -> RemoteResult<()> {
        unimplemented!("not dispatched in these tests")
    }
}

#[tokio::test]
async fn abandoned_toggle_still_restores_and_invalidates() {
    let cache = fresh_cache();
    let original = make_page(vec![make_todo(1, false), make_todo(2, false)]);
    cache.set(open_filter(), original.clone()).await;

    let remote = Arc::new(GatedFailRemote { gate: Notify::new() });
    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::clone(&remote));

    // The caller gives up while the dispatch is still blocked on the gate.
    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), coordinator.toggle_complete(1)).await;
    assert!(abandoned.is_err());

    // The optimistic flip already landed and the edit is still in flight.
    assert_eq!(
        ids_and_flags(&content_of(&cache, &open_filter()).await),
        vec![(1, true), (2, false)]
    );

    // Release the dispatch. Reconciliation must run to completion with no
    // caller awaiting it: the snapshot goes back and the key is marked
    // for refetch.
    remote.gate.notify_one();
    for _ in 0..200 {
        if let ReadPlan::ServeStale(snap) = cache.begin_read(&open_filter()).await {
            assert_eq!(snap.value.unwrap(), original);
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("restore and invalidation never happened after the caller left");
}

#[tokio::test]
async fn failed_create_does_not_invalidate() {
    let cache = fresh_cache();
    cache
        .set(open_filter(), make_page(vec![make_todo(1, false)]))
        .await;

    let mut remote = MockTodoRemote::new();
    remote
        .expect_create()
        .returning(|_| Err(RemoteError::Network("timed out".into())));

    let coordinator = MutationCoordinator::new(Arc::clone(&cache), Arc::new(remote));
    assert!(coordinator.create(&TodoDraft::new("x")).await.is_err());

    // No cache mutation happened, so there is nothing to reconcile.
    assert!(matches!(
        cache.begin_read(&open_filter()).await,
        ReadPlan::Serve(_)
    ));
}
