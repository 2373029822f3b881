//! Benchmark command - Run Dijkstra and Q-learning side by side

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::{
    analysis::{self, AlgorithmSummary, MetricTests},
    cli::{
        commands::{LearnerArgs, parse_size_list, sanitize_json_path, write_json},
        config::ExperimentConfig,
        output::{
            format_number, print_algorithm_summary, print_kv, print_section, print_subsection,
            print_test,
        },
    },
    export,
    maze::Placement,
    pipeline::{
        AlgorithmResult, BenchmarkConfig, BenchmarkRunner, DijkstraSolver, QLearningSolver, Solver,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Benchmark solvers on generated mazes", allow_negative_numbers = true)]
pub struct BenchmarkArgs {
    /// Maze sizes, e.g. 11x11,21x21
    #[arg(long)]
    pub sizes: Option<String>,

    /// Mazes generated per size
    #[arg(long, short = 'n')]
    pub mazes_per_size: Option<usize>,

    /// Training episodes per maze for the Q-learning solver
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Start/goal placement (farthest or corners)
    #[arg(long)]
    pub placement: Option<Placement>,

    #[command(flatten)]
    pub learner: LearnerArgs,

    /// Random seed for maze generation and solvers
    #[arg(long)]
    pub seed: Option<u64>,

    /// Experiment configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Append batch rows to this CSV file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Optional path for writing summaries and tests as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Include every per-run record in the summary JSON
    #[arg(long, requires = "summary")]
    pub include_records: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Serialize)]
struct BenchmarkSummaryFile {
    config: BenchmarkConfig,
    episodes: usize,
    algorithms: Vec<AlgorithmSummary>,
    tests: Vec<MetricTests>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<AlgorithmResult>>,
}

pub fn execute(args: BenchmarkArgs) -> Result<()> {
    let mut config = ExperimentConfig::load_or_default(args.config.as_deref())?;
    let seed = args.seed.or(config.seed);
    let learner = args.learner.apply(&mut config)?;
    let episodes = args.episodes.unwrap_or(config.benchmark.episodes);

    let bench_config = BenchmarkConfig {
        sizes: match &args.sizes {
            Some(raw) => parse_size_list(raw)?,
            None => config.benchmark.sizes.clone(),
        },
        mazes_per_size: args.mazes_per_size.unwrap_or(config.benchmark.mazes_per_size),
        seed,
        placement: args.placement.unwrap_or(config.maze.placement),
    };

    print_section("Solver Benchmark");
    let sizes: Vec<String> = bench_config
        .sizes
        .iter()
        .map(|(rows, cols)| format!("{rows}x{cols}"))
        .collect();
    print_kv("Sizes", &sizes.join(", "));
    print_kv("Mazes per size", &format_number(bench_config.mazes_per_size));
    print_kv("Placement", &bench_config.placement.to_string());
    print_kv("Q-learning mode", &learner.transition.to_string());
    print_kv("Episodes per maze", &format_number(episodes));
    if let Some(seed) = seed {
        print_kv("Seed", &seed.to_string());
    }

    let solvers: Vec<Box<dyn Solver>> = vec![
        Box::new(DijkstraSolver::new()),
        Box::new(QLearningSolver::new(learner, episodes)),
    ];
    let mut runner = BenchmarkRunner::new(bench_config.clone(), solvers)
        .with_progress(!args.no_progress && config.progress);
    let report = runner.run()?;

    let summaries = analysis::summarize(&report.records);
    let tests = analysis::significance_tests(&report.records);

    for summary in &summaries {
        print_algorithm_summary(summary);
    }
    for metric in &tests {
        print_subsection(&format!("Significance: {}", metric.metric.label()));
        print_test("ANOVA", metric.anova.as_ref());
        for pair in &metric.pairwise {
            print_test(
                &format!("{} vs {}", pair.first, pair.second),
                pair.result.as_ref(),
            );
        }
    }

    if let Some(path) = &args.output {
        let written = export::append_rows(path, &report.rows)
            .with_context(|| format!("Failed to append results to {}", path.display()))?;
        println!("\nAppended {written} rows to {}", path.display());
    }

    if let Some(raw) = &args.summary {
        let path = sanitize_json_path(raw, "benchmark_summary.json");
        let summary = BenchmarkSummaryFile {
            config: bench_config,
            episodes,
            algorithms: summaries,
            tests,
            records: args.include_records.then_some(report.records),
        };
        write_json(&path, &summary)?;
        println!("Summary written to {}", path.display());
    }

    info!(rows = report.rows.len(), "benchmark command finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_file_serializes_tests_per_metric() {
        let records: Vec<AlgorithmResult> = [("Dijkstra", 0.01, 10), ("Q-Learning", 1.0, 14)]
            .iter()
            .cycle()
            .take(6)
            .enumerate()
            .map(|(i, &(name, time, length))| AlgorithmResult {
                algorithm_name: name.to_string(),
                maze_size: "5x5".to_string(),
                execution_time: time + i as f64 * 0.001,
                path_length: length + i,
                cells_visited: length * 3 + i,
                success: true,
                path: Vec::new(),
            })
            .collect();

        let summary = BenchmarkSummaryFile {
            config: BenchmarkConfig {
                sizes: vec![(5, 5)],
                mazes_per_size: 3,
                seed: Some(1),
                placement: Placement::Corners,
            },
            episodes: 10,
            algorithms: analysis::summarize(&records),
            tests: analysis::significance_tests(&records),
            records: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        let tests = json["tests"].as_array().unwrap();
        assert_eq!(tests.len(), 3);
        assert_eq!(tests[1]["metric"], "path_length");
        assert_eq!(tests[1]["pairwise"][0]["first"], "Dijkstra");
        assert_eq!(tests[1]["pairwise"][0]["second"], "Q-Learning");
        assert!(tests[1]["pairwise"][0]["result"]["p_value"].as_f64().unwrap() < 0.05);
        assert!(tests[2]["anova"]["statistic"].as_f64().unwrap() > 0.0);
        assert!(json.get("records").is_none());
    }
}
