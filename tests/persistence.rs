//! Value-table persistence through both repository adapters

use std::path::Path;

use mazebench::{
    Error, MazeGenerator,
    adapters::{InMemoryRepository, MsgPackRepository},
    ports::QTableRepository,
    q_learning::{QLearningAgent, QLearningConfig, SavedQTable, TrainingMetadata},
};
use tempfile::tempdir;

fn trained_agent(config: QLearningConfig) -> (QLearningAgent, mazebench::Maze) {
    let maze = MazeGenerator::new(Some(21)).generate(9, 9).unwrap();
    let mut agent = QLearningAgent::new(config).unwrap().with_seed(21);
    agent.train(&maze, 150).unwrap();
    (agent, maze)
}

fn assert_bit_identical(original: &QLearningAgent, restored: &QLearningAgent) {
    assert_eq!(original.q_table().len(), restored.q_table().len());
    for (state, action, value) in original.q_table().iter() {
        assert_eq!(
            restored.q_table().get(state, action).to_bits(),
            value.to_bits(),
            "value for {state} {action} changed"
        );
    }
    assert_eq!(original.epsilon().to_bits(), restored.epsilon().to_bits());
    assert_eq!(original.episodes_trained(), restored.episodes_trained());
    assert_eq!(original.config(), restored.config());
}

fn roundtrip(repo: &dyn QTableRepository, path: &Path) {
    for config in [
        QLearningConfig::action_filtered(),
        QLearningConfig::bounce_penalized(),
    ] {
        let (agent, maze) = trained_agent(config);
        let metadata = TrainingMetadata {
            maze_size: Some(maze.size_label()),
            maze_seed: Some(21),
            episodes: 150,
        };
        repo.save(&SavedQTable::from_agent(&agent, metadata.clone()), path)
            .unwrap();

        let loaded = repo.load(path).unwrap();
        assert_eq!(loaded.version, SavedQTable::VERSION);
        assert_eq!(loaded.metadata, metadata);

        let restored = loaded.to_agent().unwrap();
        assert_bit_identical(&agent, &restored);

        let cap = maze.rows() * maze.cols();
        assert_eq!(
            agent.policy_path(&maze.grid, maze.start, maze.goal, cap).unwrap(),
            restored.policy_path(&maze.grid, maze.start, maze.goal, cap).unwrap()
        );
    }
}

#[test]
fn test_msgpack_file_roundtrip() {
    let dir = tempdir().unwrap();
    roundtrip(&MsgPackRepository::new(), &dir.path().join("agent.msgpack"));
}

#[test]
fn test_in_memory_roundtrip() {
    let repo = InMemoryRepository::new();
    roundtrip(&repo, Path::new("agents/latest"));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn test_missing_table_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.msgpack");

    let err = MsgPackRepository::new().load(&path).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    let err = InMemoryRepository::new().load(&path).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_restored_agent_continues_training() {
    let (mut agent, maze) = trained_agent(QLearningConfig::action_filtered());
    let saved = SavedQTable::from_agent(&agent, TrainingMetadata::default());
    let mut restored = SavedQTable::from_bytes(&saved.to_bytes().unwrap())
        .unwrap()
        .to_agent()
        .unwrap();

    agent.train(&maze, 10).unwrap();
    restored.train(&maze, 10).unwrap();
    assert_eq!(restored.episodes_trained(), 160);
    assert!(restored.epsilon() <= agent.config().epsilon);
}
