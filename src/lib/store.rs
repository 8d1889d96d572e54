use super::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// A user as kept by the user-management side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_regions: Vec<String>,
    #[serde(default)]
    pub all_country: bool,
}

/// Where user records live. Handed to whoever resolves a session's
/// access instead of being reached through global state.
pub trait UserRepository {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    fn put(&mut self, record: UserRecord) -> Result<(), StoreError>;
    fn remove(&mut self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    users: BTreeMap<String, UserRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryRepository {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(username).cloned())
    }

    fn put(&mut self, record: UserRecord) -> Result<(), StoreError> {
        self.users.insert(record.username.clone(), record);
        Ok(())
    }

    fn remove(&mut self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.remove(username))
    }

    fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.values().cloned().collect())
    }
}

/// Users kept as a JSON array on disk, rewritten after every change.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl JsonFileRepository {
    /// Open the file at `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let io_error = |source| StoreError::Io {
            path: path.into(),
            source,
        };
        let records: Vec<UserRecord> = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.into(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => vec![],
            Err(e) => return Err(io_error(e)),
        };
        debug!(path = ?path, users = records.len(), "opened user store");
        let mut inner = MemoryRepository::new();
        for record in records {
            inner.put(record)?;
        }
        Ok(JsonFileRepository {
            path: path.into(),
            inner,
        })
    }

    /// Write `next` to disk, then adopt it. A failed write leaves the
    /// store as it was.
    fn commit(&mut self, next: MemoryRepository) -> Result<(), StoreError> {
        let records = next.list()?;
        let json = serde_json::to_string_pretty(&records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.inner = next;
        Ok(())
    }
}

impl UserRepository for JsonFileRepository {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.inner.get(username)
    }

    fn put(&mut self, record: UserRecord) -> Result<(), StoreError> {
        let mut next = self.inner.clone();
        next.put(record)?;
        self.commit(next)
    }

    fn remove(&mut self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut next = self.inner.clone();
        let removed = next.remove(username)?;
        if removed.is_some() {
            self.commit(next)?;
        }
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.list()
    }
}
