//! Adapters from the remote ports to [`QueryFetchPort`], one per cached
//! collection.

use std::sync::Arc;

use async_trait::async_trait;

use td_core::attachment::Attachment;
use td_core::auth::User;
use td_core::page::Page;
use td_core::ports::{
    AuthRemotePort, FileRemotePort, QueryFetchPort, RemoteResult, TodoRemotePort, TokenStorePort,
};
use td_core::query::TodoFilter;
use td_core::todo::{Todo, TodoId};

/// Fetches one page of todos for a filter.
pub struct TodoPageFetcher<R> {
    remote: Arc<R>,
}

impl<R> TodoPageFetcher<R> {
    pub fn new(remote: Arc<R>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl<R: TodoRemotePort> QueryFetchPort<TodoFilter, Page<Todo>> for TodoPageFetcher<R> {
    async fn fetch(&self, key: &TodoFilter) -> RemoteResult<Page<Todo>> {
        self.remote.list(key).await
    }
}

/// Fetches the attachment list of one todo.
pub struct AttachmentListFetcher<F> {
    remote: Arc<F>,
}

impl<F> AttachmentListFetcher<F> {
    pub fn new(remote: Arc<F>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl<F: FileRemotePort> QueryFetchPort<TodoId, Vec<Attachment>> for AttachmentListFetcher<F> {
    async fn fetch(&self, key: &TodoId) -> RemoteResult<Vec<Attachment>> {
        self.remote.list_for_todo(*key).await
    }
}

/// Fetches the authenticated identity. Without a token this resolves to
/// `None` instead of calling the server.
pub struct UserFetcher<A> {
    remote: Arc<A>,
    tokens: Arc<dyn TokenStorePort>,
}

impl<A> UserFetcher<A> {
    pub fn new(remote: Arc<A>, tokens: Arc<dyn TokenStorePort>) -> Self {
        Self { remote, tokens }
    }
}

#[async_trait]
impl<A: AuthRemotePort> QueryFetchPort<(), Option<User>> for UserFetcher<A> {
    async fn fetch(&self, _key: &()) -> RemoteResult<Option<User>> {
        if self.tokens.get().is_none() {
            return Ok(None);
        }
        self.remote.me().await.map(Some)
    }
}
