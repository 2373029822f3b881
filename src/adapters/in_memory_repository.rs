//! In-memory value-table repository for testing.
//!
//! Stores serialized envelopes in a shared map so tests exercise the full
//! MessagePack round trip without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::QTableRepository, q_learning::SavedQTable};

/// In-memory repository for testing.
///
/// All clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use mazebench::adapters::InMemoryRepository;
/// use mazebench::ports::QTableRepository;
/// use mazebench::q_learning::{QLearningAgent, QLearningConfig, SavedQTable, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = QLearningAgent::new(QLearningConfig::default())?;
/// repo.save(&SavedQTable::from_agent(&agent, TrainingMetadata::default()), Path::new("agent"))?;
///
/// let loaded = repo.load(Path::new("agent"))?;
/// assert_eq!(loaded.q_table().len(), 0);
/// # Ok::<(), mazebench::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.storage.lock().map_err(|_| Error::LockPoisoned {
            resource: "in-memory repository".to_string(),
        })
    }

    /// Number of stored tables.
    pub fn count(&self) -> Result<usize> {
        Ok(self.storage()?.len())
    }

    pub fn clear(&self) -> Result<()> {
        self.storage()?.clear();
        Ok(())
    }

    pub fn contains(&self, path: &Path) -> Result<bool> {
        let key = path.to_string_lossy().to_string();
        Ok(self.storage()?.contains_key(&key))
    }
}

impl QTableRepository for InMemoryRepository {
    fn save(&self, saved: &SavedQTable, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();
        let bytes = saved.to_bytes()?;
        self.storage()?.insert(key, bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedQTable> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage()?;
        let bytes = storage.get(&key).ok_or_else(|| Error::NotFound {
            path: path.to_path_buf(),
        })?;
        SavedQTable::from_bytes(bytes)
    }
}
