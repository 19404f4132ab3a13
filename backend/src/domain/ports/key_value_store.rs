//! Port for the persistent key-value store that backs the desk.
//!
//! The store is deliberately dumb: it maps a handful of well-known keys to
//! JSON documents. Schema versioning and decoding live in
//! [`crate::domain::persisted`], so adapters never inspect payloads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// Well-known keys in the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Registered accounts, credentials included.
    Users,
    /// The active session user, credential-free.
    CurrentUser,
    /// Every complaint record.
    Complaints,
    /// The theme preference.
    Theme,
}

impl StoreKey {
    /// Every key, in hydration order.
    pub const ALL: [Self; 4] = [Self::Theme, Self::Users, Self::CurrentUser, Self::Complaints];

    /// Key name as stored by adapters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::CurrentUser => "currentUser",
            Self::Complaints => "complaints",
            Self::Theme => "theme",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum StoreError {
        /// The backing medium failed (I/O, permissions, poisoned lock).
        Backend {
            /// Adapter error text.
            message: String,
        } => "key-value store failure: {message}",
        /// The stored bytes are not a JSON document.
        Corrupt {
            /// Key whose document is unreadable.
            key: String,
            /// Parser error text.
            message: String,
        } => "stored value for '{key}' is corrupt: {message}",
    }
}

/// Persistent key-value storage used as the desk's only database.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the document stored under `key`, or `None` when absent.
    async fn load(&self, key: StoreKey) -> Result<Option<Value>, StoreError>;

    /// Replace the document stored under `key`.
    async fn save(&self, key: StoreKey, value: &Value) -> Result<(), StoreError>;

    /// Delete the document under `key`; deleting an absent key succeeds.
    async fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// In-memory store used by tests and by the server's ephemeral mode.
///
/// Writes can be made to fail on demand so callers can exercise their
/// error paths.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<StoreKey, Value>>,
    fail_writes: AtomicBool,
    failing_key: Mutex<Option<StoreKey>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one document.
    pub fn with_entry(key: StoreKey, value: Value) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key, value);
        }
        store
    }

    /// Independent copy of the current entries, as a restarted process
    /// would see them.
    pub fn duplicate(&self) -> Self {
        let entries = self
            .entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default();
        Self {
            entries: Mutex::new(entries),
            fail_writes: AtomicBool::new(false),
            failing_key: Mutex::new(None),
        }
    }

    /// Copy of the document under `key`, bypassing the async port.
    pub fn snapshot(&self, key: StoreKey) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&key).cloned())
    }

    /// Make every subsequent `save`/`remove` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make writes to `key` alone fail; `None` lifts the restriction.
    pub fn set_fail_writes_for(&self, key: Option<StoreKey>) {
        if let Ok(mut failing) = self.failing_key.lock() {
            *failing = key;
        }
    }

    fn check_writable(&self, key: StoreKey) -> Result<(), StoreError> {
        let key_blocked = self
            .failing_key
            .lock()
            .map(|failing| *failing == Some(key))
            .unwrap_or(false);
        if self.fail_writes.load(Ordering::Relaxed) || key_blocked {
            Err(StoreError::backend(format!("writes to {key} disabled")))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StoreKey, Value>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn load(&self, key: StoreKey) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    async fn save(&self, key: StoreKey, value: &Value) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.lock()?.insert(key, value.clone());
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.lock()?.remove(&key);
        Ok(())
    }
}
