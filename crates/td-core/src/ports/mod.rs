//! Ports implemented by the infrastructure layer.
//!
//! The application layer depends on these traits only; the HTTP adapter
//! lives in `td-http`. Every remote call returns a typed [`RemoteError`]
//! so callers can tell a rejected request from a dead network.

use async_trait::async_trait;

use crate::attachment::{Attachment, PresignRequest, PresignResponse, UploadCompleteRequest};
use crate::auth::{AuthResponse, LoginRequest, SignupRequest, User};
use crate::error::RemoteError;
use crate::page::Page;
use crate::query::TodoFilter;
use crate::todo::{Todo, TodoDraft, TodoId};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote store operations for the todo collection.
#[async_trait]
pub trait TodoRemotePort: Send + Sync {
    /// `GET /todos` with the filter's present fields as query params.
    async fn list(&self, filter: &TodoFilter) -> RemoteResult<Page<Todo>>;

    /// `POST /todos`. The server assigns id and timestamps.
    async fn create(&self, draft: &TodoDraft) -> RemoteResult<Todo>;

    /// `PUT /todos/{id}`. Full replace of the mutable fields.
    async fn update(&self, id: TodoId, draft: &TodoDraft) -> RemoteResult<Todo>;

    /// `PATCH /todos/{id}/complete`. Flips `completed` server-side.
    async fn toggle_complete(&self, id: TodoId) -> RemoteResult<Todo>;

    /// `DELETE /todos/{id}`. Idempotent.
    async fn delete(&self, id: TodoId) -> RemoteResult<()>;
}

/// Remote store operations for authentication.
#[async_trait]
pub trait AuthRemotePort: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> RemoteResult<User>;
    async fn login(&self, request: &LoginRequest) -> RemoteResult<AuthResponse>;
    /// Requires a bearer token to be present.
    async fn me(&self) -> RemoteResult<User>;
}

/// Remote store operations for file attachments, including the direct
/// object-store upload.
#[async_trait]
pub trait FileRemotePort: Send + Sync {
    async fn presign(&self, request: &PresignRequest) -> RemoteResult<PresignResponse>;

    /// Raw `PUT` of the file body to the presigned object-store URL.
    async fn upload(
        &self,
        presigned_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<()>;

    async fn complete(&self, request: &UploadCompleteRequest) -> RemoteResult<Attachment>;
    async fn list_for_todo(&self, todo_id: TodoId) -> RemoteResult<Vec<Attachment>>;
    async fn delete(&self, id: i64) -> RemoteResult<()>;
}

/// Holder of the opaque bearer token. Set on login, cleared on logout,
/// read on every request. Durable storage is an adapter concern.
pub trait TokenStorePort: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: String);
    fn clear(&self);
}

/// One fetch strategy per cache, binding a key type to its value type.
/// The query binder is generic over this seam so todo pages and
/// attachment lists share one read path.
#[async_trait]
pub trait QueryFetchPort<K, V>: Send + Sync {
    async fn fetch(&self, key: &K) -> RemoteResult<V>;
}
