//! MessagePack implementation of the value-table repository.

use std::path::Path;

use crate::{Result, ports::QTableRepository, q_learning::SavedQTable};

/// File-backed repository writing the versioned MessagePack envelope.
///
/// # Examples
///
/// ```no_run
/// use mazebench::adapters::MsgPackRepository;
/// use mazebench::ports::QTableRepository;
/// use mazebench::q_learning::{QLearningAgent, QLearningConfig, SavedQTable, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = MsgPackRepository::new();
/// let agent = QLearningAgent::new(QLearningConfig::default())?;
/// let saved = SavedQTable::from_agent(&agent, TrainingMetadata::default());
///
/// repo.save(&saved, Path::new("agent.msgpack"))?;
/// let loaded = repo.load(Path::new("agent.msgpack"))?.to_agent()?;
/// # Ok::<(), mazebench::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl QTableRepository for MsgPackRepository {
    fn save(&self, saved: &SavedQTable, path: &Path) -> Result<()> {
        saved.save_to_file(path)
    }

    fn load(&self, path: &Path) -> Result<SavedQTable> {
        SavedQTable::load_from_file(path)
    }
}
