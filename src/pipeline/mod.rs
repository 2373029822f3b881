//! Training and benchmarking pipelines
//!
//! This module provides:
//! - The observed episode loop for training a Q-learning agent
//! - Observer implementations for progress, metrics, logs and snapshots
//! - The benchmark harness running solvers side by side

pub mod benchmark;
pub mod observers;
pub mod training;

pub use benchmark::{
    AlgorithmResult, BatchRow, BenchmarkConfig, BenchmarkReport, BenchmarkRunner, DijkstraSolver,
    QLearningSolver,
};
pub use observers::{
    EpisodeObservation, JsonlObserver, LoggingObserver, MetricsObserver, MetricsSummary,
    ProgressObserver, SnapshotObserver,
};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Solver, TrainingObserver};
