//! `PersistBackend` 的两种实现：目录下的 JSON 文件，以及测试用的内存表

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};

use crate::kernel::services::ports::{PersistBackend, PersistError};

#[derive(Serialize, Deserialize)]
struct Slot {
    key: String,
    value: String,
}

/// One file per key, named by a hash of the key.
///
/// The key is stored next to the value so a hash collision reads as a miss.
#[derive(Debug, Clone)]
pub struct JsonFilePersist {
    dir: PathBuf,
}

impl JsonFilePersist {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        self.dir.join(format!("{:016x}.json", hasher.finish()))
    }
}

impl PersistBackend for JsonFilePersist {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.slot_path(key);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let slot: Slot = serde_json::from_str(&data)?;
        Ok((slot.key == key).then_some(slot.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string(&Slot {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        match std::fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryPersist {
    slots: Mutex<FxHashMap<String, String>>,
}

impl MemoryPersist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match self.slots.lock() {
            Ok(slots) => slots.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        keys.sort();
        keys
    }
}

impl PersistBackend for MemoryPersist {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/persist.rs"]
mod tests;
