//! # td-core
//!
//! Core domain models and cache logic for the todo client.
//!
//! This crate contains the entity types, the query cache, and the async
//! ports the outer layers implement. It performs no I/O of its own.

// Public module exports
pub mod attachment;
pub mod auth;
pub mod cache;
pub mod error;
pub mod page;
pub mod ports;
pub mod query;
pub mod todo;

// Re-export commonly used types at the crate root
pub use attachment::{Attachment, PresignRequest, PresignResponse, UploadCompleteRequest};
pub use auth::{AuthResponse, LoginRequest, SignupRequest, User};
pub use cache::{CachePolicy, QueryCache, QuerySnapshot, QueryStatus};
pub use error::{FieldIssue, RemoteError, ValidationError};
pub use page::{Page, PageInfo};
pub use query::TodoFilter;
pub use todo::{Priority, Todo, TodoDraft, TodoId};
