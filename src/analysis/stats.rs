//! Descriptive statistics and hypothesis tests over benchmark records

use serde::{Deserialize, Serialize};
use statrs::{
    distribution::{ContinuousCDF, FisherSnedecor, StudentsT},
    statistics::{Data, Median, Statistics},
};

use crate::pipeline::benchmark::AlgorithmResult;

/// Summary statistics of one metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    /// Sample standard deviation; 0 for fewer than two values
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    /// Summarize `values`; all fields are 0 for an empty slice.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            Statistics::std_dev(values)
        };
        Self {
            mean: Statistics::mean(values),
            std_dev,
            median: Data::new(values.to_vec()).median(),
            min: Statistics::min(values),
            max: Statistics::max(values),
        }
    }
}

/// Per-algorithm summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmSummary {
    pub algorithm: String,
    pub runs: usize,
    /// Percentage of runs that reached the goal
    pub success_rate: f64,
    pub execution_time: MetricStats,
    /// Over successful runs only
    pub path_length: MetricStats,
    pub cells_visited: MetricStats,
}

/// Test statistic with its two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Degrees of freedom (numerator, denominator); the t-test leaves the
    /// second at 0.
    pub df: (f64, f64),
}

/// Benchmark metric compared by the significance tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ExecutionTime,
    PathLength,
    CellsVisited,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::ExecutionTime, Metric::PathLength, Metric::CellsVisited];

    pub fn value(self, record: &AlgorithmResult) -> f64 {
        match self {
            Metric::ExecutionTime => record.execution_time,
            Metric::PathLength => record.path_length as f64,
            Metric::CellsVisited => record.cells_visited as f64,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::ExecutionTime => "Execution time",
            Metric::PathLength => "Path length",
            Metric::CellsVisited => "Cells visited",
        }
    }
}

/// t-test between two algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseTest {
    pub first: String,
    pub second: String,
    pub result: Option<TestResult>,
}

/// ANOVA plus every pairwise t-test for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTests {
    pub metric: Metric,
    pub anova: Option<TestResult>,
    pub pairwise: Vec<PairwiseTest>,
}

/// Run the significance tests for every metric.
///
/// Groups hold every run, failures included, so path-length tests compare
/// the raw recorded values. Pairs follow the order of first appearance.
pub fn significance_tests(records: &[AlgorithmResult]) -> Vec<MetricTests> {
    let names = algorithm_names(records);
    Metric::ALL
        .iter()
        .map(|&metric| {
            let groups = metric_groups(records, |r| metric.value(r));
            let mut pairwise = Vec::new();
            for i in 0..groups.len() {
                for j in i + 1..groups.len() {
                    pairwise.push(PairwiseTest {
                        first: names[i].clone(),
                        second: names[j].clone(),
                        result: t_test(&groups[i], &groups[j]),
                    });
                }
            }
            MetricTests {
                metric,
                anova: one_way_anova(&groups),
                pairwise,
            }
        })
        .collect()
}

/// Group records by algorithm in order of first appearance and summarize.
pub fn summarize(records: &[AlgorithmResult]) -> Vec<AlgorithmSummary> {
    algorithm_names(records)
        .into_iter()
        .map(|algorithm| {
            let runs: Vec<&AlgorithmResult> = records
                .iter()
                .filter(|r| r.algorithm_name == algorithm)
                .collect();
            let successes = runs.iter().filter(|r| r.success).count();

            let times: Vec<f64> = runs.iter().map(|r| r.execution_time).collect();
            let lengths: Vec<f64> = runs
                .iter()
                .filter(|r| r.success)
                .map(|r| r.path_length as f64)
                .collect();
            let visited: Vec<f64> = runs.iter().map(|r| r.cells_visited as f64).collect();

            AlgorithmSummary {
                runs: runs.len(),
                success_rate: 100.0 * successes as f64 / runs.len() as f64,
                execution_time: MetricStats::from_values(&times),
                path_length: MetricStats::from_values(&lengths),
                cells_visited: MetricStats::from_values(&visited),
                algorithm,
            }
        })
        .collect()
}

/// Distinct algorithm names in order of first appearance.
pub fn algorithm_names(records: &[AlgorithmResult]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        if !names.contains(&record.algorithm_name) {
            names.push(record.algorithm_name.clone());
        }
    }
    names
}

/// Extract one metric per algorithm, in order of first appearance.
pub fn metric_groups<F>(records: &[AlgorithmResult], metric: F) -> Vec<Vec<f64>>
where
    F: Fn(&AlgorithmResult) -> f64,
{
    algorithm_names(records)
        .iter()
        .map(|name| {
            records
                .iter()
                .filter(|r| &r.algorithm_name == name)
                .map(&metric)
                .collect()
        })
        .collect()
}

/// One-way ANOVA across groups.
///
/// Returns `None` with fewer than two groups, no residual degrees of
/// freedom, or zero within-group variance.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<TestResult> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;
    let mut between = 0.0;
    let mut within = 0.0;
    for group in &groups {
        let mean = Statistics::mean(group.as_slice());
        between += group.len() as f64 * (mean - grand_mean).powi(2);
        within += group.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    }
    if within <= 0.0 {
        return None;
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let statistic = (between / df_between) / (within / df_within);
    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    Some(TestResult {
        statistic,
        p_value: dist.sf(statistic),
        df: (df_between, df_within),
    })
}

/// Two-sample Student t-test with pooled variance.
///
/// Returns `None` when either sample has fewer than two values or the pooled
/// variance is zero.
pub fn t_test(a: &[f64], b: &[f64]) -> Option<TestResult> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    let pooled =
        ((n1 - 1.0) * Statistics::variance(a) + (n2 - 1.0) * Statistics::variance(b)) / df;
    if pooled <= 0.0 {
        return None;
    }

    let statistic =
        (Statistics::mean(a) - Statistics::mean(b)) / (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(TestResult {
        statistic,
        p_value: 2.0 * dist.sf(statistic.abs()),
        df: (df, 0.0),
    })
}
