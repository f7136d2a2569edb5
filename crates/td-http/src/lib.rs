//! # td-http
//!
//! `reqwest`-backed implementations of the remote ports in `td-core`,
//! speaking the backend's REST API. One [`HttpRemote`] implements the
//! todo, auth, and file ports; the bearer token is read from the injected
//! [`td_core::ports::TokenStorePort`] on every request.

mod auth;
mod client;
mod files;
mod todos;
mod token;

pub use client::{HttpConfig, HttpRemote};
pub use token::InMemoryTokenStore;
