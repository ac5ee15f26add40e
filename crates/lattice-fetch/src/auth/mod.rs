//! Credential token persistence.
//!
//! The bearer token lives in a [`KeyValueStore`] and is read through a
//! [`CredentialStore`] on every request; it is never cached in memory.

mod credentials;
mod storage;

pub use credentials::{CredentialStore, TOKEN_KEY};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
