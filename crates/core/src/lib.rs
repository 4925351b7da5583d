//! Core types and shared state for splice.
//!
//! This crate provides:
//! - Session key-value store with memory and SQLite backends
//! - Name-keyed callback registry
//! - Locale tables and token translation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod registry;

#[cfg(test)]
mod test_log;

pub use cache::{KvStore, MemoryStore, SqliteStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use i18n::{LocaleNode, LocaleTable, Localizer};
pub use registry::{Callback, Registry};
