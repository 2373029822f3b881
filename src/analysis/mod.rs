//! Analysis tools for benchmark results
//!
//! Per-algorithm descriptive statistics and the hypothesis tests used to
//! compare solvers.

pub mod stats;

pub use stats::{
    AlgorithmSummary, Metric, MetricStats, MetricTests, PairwiseTest, TestResult, algorithm_names,
    metric_groups, one_way_anova, significance_tests, summarize, t_test,
};
