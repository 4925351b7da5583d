//! Session key-value store for cached text.
//!
//! Both the fragment cache and the request cache live in a [`KvStore`]:
//! a flat, last-writer-wins mapping from string keys to text values.
//! Two backends are provided:
//!
//! - [`MemoryStore`] lives as long as the process
//! - [`SqliteStore`] persists to a SQLite file (WAL mode) so a session
//!   survives restarts of the host process

pub mod connection;
pub mod memory;
pub mod migrations;

pub use crate::Error;

pub use connection::SqliteStore;
pub use memory::MemoryStore;

/// Text key-value store shared by the fragment and request caches.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove `key`. Returns true if an entry was deleted.
    async fn remove(&self, key: &str) -> Result<bool, Error>;

    /// Remove every entry. Returns the number of deleted entries.
    async fn clear(&self) -> Result<u64, Error>;
}
