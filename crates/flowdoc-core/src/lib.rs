//! Flowdoc client library.
//!
//! Provides the pieces a Flowdoc dashboard needs to talk to the document
//! backend:
//!
//! - `auth`: the owned `Session` and its pluggable token storage
//! - `api`: the `ApiClient` for login and document transfer requests
//! - `models`: upload metadata, list paging and dashboard statistics
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionData, TokenStore};
pub use config::Config;
