//! Client facade: one explicitly-constructed object owning the caches
//! and services, created at application start and torn down on logout.

use std::sync::Arc;
use std::time::Duration;

use td_core::cache::CachePolicy;
use td_core::ports::{AuthRemotePort, FileRemotePort, TodoRemotePort, TokenStorePort};

use crate::attachments::{AttachmentCache, AttachmentService};
use crate::auth::AuthService;
use crate::binder::QueryBinder;
use crate::coordinator::{MutationCoordinator, TodoCache};
use crate::fetchers::{AttachmentListFetcher, TodoPageFetcher};

/// Freshness windows per collection. Defaults match the original client:
/// todo pages stay fresh for 30 seconds, the identity for 5 minutes, and
/// attachment lists revalidate on every read.
#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    pub todo_stale_time: Duration,
    pub user_stale_time: Duration,
    pub attachment_stale_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            todo_stale_time: Duration::from_secs(30),
            user_stale_time: Duration::from_secs(5 * 60),
            attachment_stale_time: Duration::ZERO,
        }
    }
}

/// Wires the caches, binders, and services together from injected ports.
/// The caches live here and nowhere else; everything holds them by `Arc`.
pub struct TodoClient<R, A, F> {
    todo_cache: Arc<TodoCache>,
    attachment_cache: Arc<AttachmentCache>,
    todos: QueryBinder<td_core::TodoFilter, td_core::Page<td_core::Todo>, TodoPageFetcher<R>>,
    attachment_lists:
        QueryBinder<td_core::TodoId, Vec<td_core::Attachment>, AttachmentListFetcher<F>>,
    mutations: MutationCoordinator<R>,
    attachments: AttachmentService<F>,
    auth: AuthService<A>,
}

impl<R, A, F> TodoClient<R, A, F>
where
    R: TodoRemotePort + 'static,
    A: AuthRemotePort + 'static,
    F: FileRemotePort + 'static,
{
    pub fn new(
        todos: Arc<R>,
        auth: Arc<A>,
        files: Arc<F>,
        tokens: Arc<dyn TokenStorePort>,
        config: ClientConfig,
    ) -> Self {
        let todo_cache = Arc::new(TodoCache::new(CachePolicy::with_stale_time(
            config.todo_stale_time,
        )));
        let attachment_cache = Arc::new(AttachmentCache::new(CachePolicy::with_stale_time(
            config.attachment_stale_time,
        )));

        Self {
            todos: QueryBinder::new(
                Arc::clone(&todo_cache),
                Arc::new(TodoPageFetcher::new(Arc::clone(&todos))),
            ),
            attachment_lists: QueryBinder::new(
                Arc::clone(&attachment_cache),
                Arc::new(AttachmentListFetcher::new(Arc::clone(&files))),
            ),
            mutations: MutationCoordinator::new(Arc::clone(&todo_cache), todos),
            attachments: AttachmentService::new(Arc::clone(&attachment_cache), files),
            auth: AuthService::new(auth, tokens, config.user_stale_time),
            todo_cache,
            attachment_cache,
        }
    }

    /// Filtered, paginated todo pages.
    pub fn todos(
        &self,
    ) -> &QueryBinder<td_core::TodoFilter, td_core::Page<td_core::Todo>, TodoPageFetcher<R>> {
        &self.todos
    }

    /// Per-todo attachment lists.
    pub fn attachment_lists(
        &self,
    ) -> &QueryBinder<td_core::TodoId, Vec<td_core::Attachment>, AttachmentListFetcher<F>> {
        &self.attachment_lists
    }

    pub fn mutations(&self) -> &MutationCoordinator<R> {
        &self.mutations
    }

    pub fn attachments(&self) -> &AttachmentService<F> {
        &self.attachments
    }

    pub fn auth(&self) -> &AuthService<A> {
        &self.auth
    }

    /// Session teardown: drop the token, the identity, and every cached
    /// collection.
    pub async fn logout(&self) {
        self.auth.logout().await;
        self.todo_cache.clear().await;
        self.attachment_cache.clear().await;
    }
}
