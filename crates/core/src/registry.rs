//! Name-keyed callback registry.
//!
//! Loaded fragments look up their initialization callback by a namespaced
//! key such as `pages/dashboard` or `includes/navigation`. Each key holds at
//! most one callback; registering again overwrites the previous entry.

use futures_util::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Synchronous callback body.
pub type SyncFn = dyn Fn() + Send + Sync;

/// Asynchronous callback body, awaited on dispatch.
pub type AsyncFn = dyn Fn() -> BoxFuture<'static, ()> + Send + Sync;

/// A registered callback, tagged with how it must be invoked.
#[derive(Clone)]
pub enum Callback {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

impl Callback {
    pub fn sync(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Sync(Arc::new(f))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Async(Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(f()) }))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    async fn invoke(&self) {
        match self {
            Self::Sync(f) => f(),
            Self::Async(f) => f().await,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("is_async", &self.is_async()).finish()
    }
}

/// Name-keyed callback table.
///
/// Clones share the same table, so one registry can be handed to the loader
/// and to page code that registers callbacks.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Arc<RwLock<HashMap<String, Callback>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback` under `key`, replacing any previous entry.
    ///
    /// An empty key is rejected with a warning and nothing is stored.
    pub fn register(&self, key: impl Into<String>, callback: Callback) {
        let key = key.into();
        if key.trim().is_empty() {
            tracing::warn!("refusing to register callback under an empty key");
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(key.clone(), callback).is_some() {
            tracing::debug!(key = %key, "replaced registered callback");
        }
    }

    pub fn register_sync(&self, key: impl Into<String>, f: impl Fn() + Send + Sync + 'static) {
        self.register(key, Callback::sync(f));
    }

    pub fn register_async<F, Fut>(&self, key: impl Into<String>, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(key, Callback::from_async(f));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke the callback registered under `key`.
    ///
    /// Asynchronous callbacks are awaited; synchronous ones run inline.
    /// An unknown key logs a warning and does nothing.
    pub async fn execute(&self, key: &str) {
        let callback = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        match callback {
            Some(callback) => {
                tracing::debug!(key, is_async = callback.is_async(), "executing callback");
                callback.invoke().await;
            }
            None => tracing::warn!(key, "no callback registered"),
        }
    }
}
