use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage directory missing or not writable: {0}")]
    StoreDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("stored data could not be read: {0}")]
    Corrupt(String),
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// String keys to serialized payloads. `get` distinguishes a missing key
/// (`Ok(None)`) from a failing backend (`Err`).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under `dir`, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name_for(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                Err(StoreError::Corrupt(err.to_string()))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        ensure_store_dir(&self.dir)?;

        let target = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

/// Ensure the store directory exists; create if missing.
pub fn ensure_store_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StoreError::StoreDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::StoreDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StoreError::StoreDir(e.to_string()))?;
    }
    Ok(())
}

/// Keys contain `@` and `.`; anything outside `[A-Za-z0-9_-]` is hex-escaped
/// so distinct keys never share a file.
fn file_name_for(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => name.push(byte as char),
            other => name.push_str(&format!("%{other:02X}")),
        }
    }
    name.push_str(".json");
    name
}

#[cfg(test)]
mod tests {
    use super::file_name_for;

    #[test]
    fn file_names_escape_separators() {
        assert_eq!(
            file_name_for("ecosort_data_a.b@c.io"),
            "ecosort_data_a%2Eb%40c%2Eio.json"
        );
        assert_ne!(file_name_for("a/b"), file_name_for("a_b"));
        assert_eq!(file_name_for("../x"), "%2E%2E%2Fx.json");
    }
}
