//! Persistence adapter: typed reads and writes over a [`KvStore`].
//!
//! Task lists, the session pointer and credential records each have one
//! key in the [`StorageKey`] schema. What happens when a stored task list
//! no longer parses is decided by [`CorruptDataPolicy`].

use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::storage::{KvStore, StorageKey};
use crate::task::TaskRecord;

/// Handling of a stored task list that fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptDataPolicy {
    /// Treat it as empty and carry on; the next save overwrites it
    #[default]
    Reset,
    /// Surface [`Error::CorruptData`]
    Fail,
}

impl std::str::FromStr for CorruptDataPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reset" => Ok(CorruptDataPolicy::Reset),
            "fail" => Ok(CorruptDataPolicy::Fail),
            _ => Err(Error::InvalidConfig(format!(
                "storage.on_corrupt must be reset or fail, got '{s}'"
            ))),
        }
    }
}

pub fn save_tasks<S: KvStore>(store: &mut S, username: &str, tasks: &[TaskRecord]) -> Result<()> {
    tracing::debug!(user = username, count = tasks.len(), "saving tasks");
    store.write_json(&StorageKey::tasks(username), tasks)
}

/// Load a user's task list; a missing key is an empty list
pub fn load_tasks<S: KvStore>(
    store: &S,
    username: &str,
    policy: CorruptDataPolicy,
) -> Result<Vec<TaskRecord>> {
    let key = StorageKey::tasks(username);
    let Some(raw) = store.get(&key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<TaskRecord>>(&raw) {
        Ok(tasks) => Ok(tasks),
        Err(err) => match policy {
            CorruptDataPolicy::Reset => {
                tracing::warn!(key = %key, error = %err, "stored task list is corrupt; starting empty");
                Ok(Vec::new())
            }
            CorruptDataPolicy::Fail => Err(Error::CorruptData { key: key.as_key() }),
        },
    }
}

/// Username in the session pointer, if any
///
/// The pointer holds the bare username. A blank pointer is treated as
/// logged out.
pub fn load_session<S: KvStore>(store: &S) -> Result<Option<String>> {
    let user = store
        .get(&StorageKey::Session)?
        .map(|raw| raw.trim().to_string())
        .filter(|user| !user.is_empty());
    Ok(user)
}

pub fn save_session<S: KvStore>(store: &mut S, username: &str) -> Result<()> {
    store.set(&StorageKey::Session, username.to_string())
}

pub fn clear_session<S: KvStore>(store: &mut S) -> Result<()> {
    store.remove(&StorageKey::Session)
}

pub fn load_credential<S: KvStore>(store: &S, username: &str) -> Result<Option<Credentials>> {
    let key = StorageKey::credential(username);
    let Some(raw) = store.get(&key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|_| Error::CorruptData { key: key.as_key() })
}

pub fn save_credential<S: KvStore>(store: &mut S, credentials: &Credentials) -> Result<()> {
    store.write_json(&StorageKey::credential(credentials.username()), credentials)
}
