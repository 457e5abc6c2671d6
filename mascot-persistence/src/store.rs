//! Key-value backends. Values are opaque bytes.

use crate::error::PersistenceError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// One file per key inside a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened file store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(PersistenceError::Unavailable(format!("invalid key {key:?}")));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        // write-then-rename so a crash never leaves a half-written value
        let staging = self.dir.join(format!(".{key}.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store with an optional byte quota over all values.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new(quota_bytes: Option<usize>) -> Self {
        Self { entries: HashMap::new(), quota_bytes }
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, Vec::len);
            let available = quota.saturating_sub(self.used_bytes() - replaced);
            if value.len() > available {
                return Err(PersistenceError::QuotaExceeded { needed: value.len(), available });
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}
