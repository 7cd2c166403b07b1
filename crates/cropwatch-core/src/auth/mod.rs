//! Authentication module for managing the user session and its tokens.
//!
//! This module provides:
//! - `SessionStore`: Login/logout/restore over an in-memory `Session`
//! - `TokenStore`: Durable storage for the access and refresh tokens, with
//!   file (`FileTokenStore`), OS keychain (`KeyringTokenStore`) and
//!   in-process (`MemoryTokenStore`) backends
//!
//! Tokens are persisted so a restart restores the session; they are checked
//! lazily by the first request that comes back 401.

pub mod credentials;
pub mod session;
pub mod tokens;

pub use credentials::KeyringTokenStore;
pub use session::{Session, SessionAction, SessionStatus, SessionStore};
pub use tokens::{FileTokenStore, MemoryTokenStore, StoreError, TokenKey, TokenStore};
