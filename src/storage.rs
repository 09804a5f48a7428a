//! Key-value storage for taskman
//!
//! All persisted state lives in a string-keyed store of text values, JSON
//! everywhere except the session pointer. Keys are never built by hand: [`StorageKey`] is the schema and
//! [`StorageKey::as_key`] the only place key strings are constructed.
//!
//! # Key schema
//!
//! ```text
//! loggedInUser        # session pointer: the bare username
//! user_<username>     # credential record: {"username": .., "password": ..}
//! tasks_<username>    # task list: [{"id": .., "title": .., "completed": ..}]
//! ```
//!
//! Credential records carry the `user_` prefix, unlike browser-stored data
//! that keys them by the bare username, so no username can shadow the
//! session pointer or another user's task list.
//!
//! # On-disk layout ([`FileStore`])
//!
//! ```text
//! <data dir>/
//!   store.json          # {"<key>": "<json text>", ...}
//!   store.json.lock     # writer lock
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the store file inside the data directory
pub const STORE_FILE: &str = "store.json";

const SESSION_KEY: &str = "loggedInUser";
const CREDENTIAL_PREFIX: &str = "user_";
const TASKS_PREFIX: &str = "tasks_";

/// Typed storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Username of the logged-in user
    Session,
    /// Credential record for a username
    Credential(String),
    /// Task list for a username
    Tasks(String),
}

impl StorageKey {
    pub fn credential(username: impl Into<String>) -> Self {
        StorageKey::Credential(username.into())
    }

    pub fn tasks(username: impl Into<String>) -> Self {
        StorageKey::Tasks(username.into())
    }

    /// The raw key string written to the backing store
    pub fn as_key(&self) -> String {
        match self {
            StorageKey::Session => SESSION_KEY.to_string(),
            StorageKey::Credential(username) => format!("{CREDENTIAL_PREFIX}{username}"),
            StorageKey::Tasks(username) => format!("{TASKS_PREFIX}{username}"),
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// String-keyed store holding text values
pub trait KvStore {
    /// Raw value stored under `key`
    fn get(&self, key: &StorageKey) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &StorageKey, value: String) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &StorageKey) -> Result<()>;

    /// Serialize `data` and store it under `key`
    fn write_json<T: Serialize + ?Sized>(&mut self, key: &StorageKey, data: &T) -> Result<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(data)?;
        self.set(key, json)
    }
}

/// In-memory store, used by tests and anywhere persistence is not wanted
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &StorageKey) -> Result<Option<String>> {
        Ok(self.entries.get(&key.as_key()).cloned())
    }

    fn set(&mut self, key: &StorageKey, value: String) -> Result<()> {
        self.entries.insert(key.as_key(), value);
        Ok(())
    }

    fn remove(&mut self, key: &StorageKey) -> Result<()> {
        self.entries.remove(&key.as_key());
        Ok(())
    }
}

/// Store backed by a single JSON object file in the data directory
///
/// Reads always go to disk so that writes made by another process are
/// visible. Each write locks, re-reads, applies the change and replaces the
/// file atomically; concurrent writers are serialized and the last one wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Create the data directory if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Path to the store file
    pub fn store_file(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let path = self.store_file();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|err| {
            Error::OperationFailed(format!(
                "store file {} is not a JSON object: {err}",
                path.display()
            ))
        })
    }

    fn update_entries<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        self.init()?;
        let path = self.store_file();
        let _lock = FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;

        let mut entries = self.read_entries()?;
        mutate(&mut entries);

        let json = serde_json::to_string_pretty(&entries)?;
        lock::write_atomic(&path, json.as_bytes())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &StorageKey) -> Result<Option<String>> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(&key.as_key()))
    }

    fn set(&mut self, key: &StorageKey, value: String) -> Result<()> {
        tracing::debug!(key = %key, bytes = value.len(), "store set");
        let raw = key.as_key();
        self.update_entries(move |entries| {
            entries.insert(raw, value);
        })
    }

    fn remove(&mut self, key: &StorageKey) -> Result<()> {
        tracing::debug!(key = %key, "store remove");
        let raw = key.as_key();
        self.update_entries(move |entries| {
            entries.remove(&raw);
        })
    }
}
