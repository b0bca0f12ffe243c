//! REST API client module for the Flowdoc backend.
//!
//! This module provides the `ApiClient` for logging in and for
//! uploading, listing, inspecting and sharing documents.
//!
//! Document endpoints are JWT protected; the client sends the session
//! token as a bearer credential when it carries one.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
