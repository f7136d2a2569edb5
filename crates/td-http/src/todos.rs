//! Todo collection endpoints.

use async_trait::async_trait;
use reqwest::Method;

use td_core::page::Page;
use td_core::ports::{RemoteResult, TodoRemotePort};
use td_core::query::TodoFilter;
use td_core::todo::{Todo, TodoDraft, TodoId};

use crate::client::HttpRemote;

#[async_trait]
impl TodoRemotePort for HttpRemote {
    async fn list(&self, filter: &TodoFilter) -> RemoteResult<Page<Todo>> {
        let request = self
            .request(Method::GET, "/todos")
            .query(&filter.to_query_pairs());
        self.send_json(request).await
    }

    async fn create(&self, draft: &TodoDraft) -> RemoteResult<Todo> {
        let request = self.request(Method::POST, "/todos").json(draft);
        self.send_json(request).await
    }

    async fn update(&self, id: TodoId, draft: &TodoDraft) -> RemoteResult<Todo> {
        let request = self
            .request(Method::PUT, &format!("/todos/{id}"))
            .json(draft);
        self.send_json(request).await
    }

    async fn toggle_complete(&self, id: TodoId) -> RemoteResult<Todo> {
        let request = self.request(Method::PATCH, &format!("/todos/{id}/complete"));
        self.send_json(request).await
    }

    async fn delete(&self, id: TodoId) -> RemoteResult<()> {
        let request = self.request(Method::DELETE, &format!("/todos/{id}"));
        self.send_empty(request).await
    }
}
