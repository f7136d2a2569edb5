//! # td-client
//!
//! Application layer of the todo client: binds filtered queries to live
//! cache entries, runs optimistic mutations against the remote store, and
//! manages the auth session. All I/O goes through the ports declared in
//! `td-core`; the HTTP adapter lives in `td-http`.

pub mod attachments;
pub mod auth;
pub mod binder;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod fetchers;

#[cfg(test)]
mod tests;

pub use attachments::{AttachmentCache, AttachmentService};
pub use auth::AuthService;
pub use binder::QueryBinder;
pub use client::{ClientConfig, TodoClient};
pub use coordinator::{MutationCoordinator, TodoCache};
pub use error::ClientError;
pub use fetchers::{AttachmentListFetcher, TodoPageFetcher, UserFetcher};
