//! Flat JSON-file fallback store.
//!
//! The whole map is rewritten on every change: serialized to a sibling temp
//! file, then renamed over the original, so readers never see a partial file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{data_dir, KeyValueStore};
use crate::error::StoreError;

const BACKEND: &str = "flat-file";

pub struct FlatFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FlatFileStore {
    /// Store at `~/.config/claimstreak/<file_name>`.
    pub fn open(file_name: &str) -> Result<Self, StoreError> {
        Ok(Self::at(data_dir()?.join(file_name)))
    }

    /// Store at an explicit path. The file is created on first write.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::unavailable(BACKEND, "file lock poisoned"))
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FlatFileStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.guard()?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn clear_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        let before = map.len();
        map.retain(|k, _| !k.starts_with(prefix));
        let removed = before - map.len();
        if removed > 0 {
            self.write_map(&map)?;
        }
        Ok(removed)
    }
}
