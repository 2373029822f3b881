//! Versioned MessagePack envelope for trained agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    q_learning::{
        agent::{AgentState, QLearningAgent},
        q_table::QTable,
    },
};

/// Where a saved agent came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Maze size label (`RxC`) the table was trained on.
    pub maze_size: Option<String>,
    pub maze_seed: Option<u64>,
    pub episodes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQTable {
    pub version: u32,
    state: AgentState,
    pub metadata: TrainingMetadata,
}

impl SavedQTable {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QLearningAgent, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
            metadata,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.state.q_table
    }

    /// Rebuild the agent, checking the format version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for envelopes written by another
    /// format version.
    pub fn to_agent(&self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(QLearningAgent::from_state(self.state.clone()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::SerializationContext {
            operation: "serialize value table to MessagePack".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize value table from MessagePack".to_string(),
            message: e.to_string(),
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).map_err(|e| Error::SerializationContext {
            operation: "serialize value table to MessagePack".to_string(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush {}", path.display()),
            source,
        })?;

        Ok(())
    }

    /// Load an envelope from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the file does not exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io {
                    operation: format!("open file {}", path.display()),
                    source,
                }
            }
        })?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).map_err(|e| Error::SerializationContext {
            operation: "deserialize value table from MessagePack".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        maze::{Grid, Maze},
        q_learning::QLearningConfig,
        types::Position,
    };

    fn trained_agent() -> QLearningAgent {
        let grid = Grid::from_matrix(&[[0u8, 0, 0], [0, 1, 0], [0, 0, 0]]).unwrap();
        let maze = Maze::new(grid, Position::new(0, 0), Position::new(2, 2)).unwrap();
        let mut agent = QLearningAgent::new(QLearningConfig::action_filtered())
            .unwrap()
            .with_seed(7);
        agent.train(&maze, 30).unwrap();
        agent
    }

    #[test]
    fn test_bytes_roundtrip_preserves_every_value() -> Result<()> {
        let agent = trained_agent();
        assert!(!agent.q_table().is_empty());

        let saved = SavedQTable::from_agent(&agent, TrainingMetadata::default());
        let loaded = SavedQTable::from_bytes(&saved.to_bytes()?)?;
        let restored = loaded.to_agent()?;

        assert_eq!(restored.q_table().len(), agent.q_table().len());
        for (state, action, value) in agent.q_table().iter() {
            assert_eq!(
                restored.q_table().get(state, action).to_bits(),
                value.to_bits()
            );
        }
        assert_eq!(restored.epsilon(), agent.epsilon());
        assert_eq!(restored.config(), agent.config());
        Ok(())
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut saved = SavedQTable::from_agent(&trained_agent(), TrainingMetadata::default());
        saved.version = 99;
        assert!(matches!(
            saved.to_agent(),
            Err(Error::UnsupportedVersion {
                found: 99,
                expected: 1
            })
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SavedQTable::load_from_file(dir.path().join("absent.msgpack")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let err = SavedQTable::from_bytes(&[0xc1, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, Error::SerializationContext { .. }));
    }
}
