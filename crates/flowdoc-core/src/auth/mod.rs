//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `Session`: the owned session handle (login, logout, token lookup)
//! - `TokenStore`: the single-slot storage the session persists into,
//!   with file, OS keychain and in-memory implementations
//!
//! Tokens never expire client-side; a stored token is the only signal
//! that the user is logged in.

pub mod session;
pub mod store;

pub use session::{Session, SessionData};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
