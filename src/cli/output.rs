//! Output formatting and progress bars for CLI

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::{AlgorithmSummary, MetricStats, TestResult};

/// Create a spinner for long-running steps
pub fn create_spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// `mean ± std (median, min..max)` with the given precision
pub fn format_metric(stats: &MetricStats, precision: usize) -> String {
    format!(
        "{:.p$} ± {:.p$} (median {:.p$}, {:.p$}..{:.p$})",
        stats.mean,
        stats.std_dev,
        stats.median,
        stats.min,
        stats.max,
        p = precision
    )
}

/// Print one algorithm's benchmark summary
pub fn print_algorithm_summary(summary: &AlgorithmSummary) {
    print_subsection(&summary.algorithm);
    print_kv("Runs", &format_number(summary.runs));
    print_kv("Success rate", &format!("{:.1}%", summary.success_rate));
    print_kv("Time (s)", &format_metric(&summary.execution_time, 6));
    print_kv("Path length", &format_metric(&summary.path_length, 2));
    print_kv("Cells visited", &format_metric(&summary.cells_visited, 2));
}

/// Print a hypothesis test line, or why it was skipped
pub fn print_test(label: &str, result: Option<&TestResult>) {
    match result {
        Some(test) => print_kv(
            label,
            &format!("statistic {:.4}, p = {:.4e}", test.statistic, test.p_value),
        ),
        None => print_kv(label, "n/a (not enough variation or samples)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_metric() {
        let stats = MetricStats {
            mean: 1.5,
            std_dev: 0.3,
            median: 1.0,
            min: 0.0,
            max: 3.0,
        };
        assert_eq!(format_metric(&stats, 1), "1.5 ± 0.3 (median 1.0, 0.0..3.0)");
    }
}
