//! Export functionality for benchmark results
//!
//! Currently supports append-only CSV export of batch rows.

mod results_csv;

pub use results_csv::{HEADER, append_rows, read_rows};
