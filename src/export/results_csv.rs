//! Append-only CSV export of benchmark batch rows
//!
//! Repeated benchmark runs append to the same file. The header is written
//! only when the file is new or empty, so the file stays a single table.

use std::{fs::OpenOptions, path::Path};

use crate::{Result, error::Error, pipeline::benchmark::BatchRow};

/// Column order of the batch CSV
pub const HEADER: [&str; 7] = [
    "maze_id",
    "algorithm",
    "path_length",
    "maze_size",
    "total_steps",
    "time",
    "success",
];

/// Append `rows` to the CSV at `path`, creating it if needed.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row fails to encode.
pub fn append_rows<P: AsRef<Path>>(path: P, rows: &[BatchRow]) -> Result<usize> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Io {
            operation: format!("open {} for append", path.display()),
            source,
        })?;
    let is_empty = file
        .metadata()
        .map_err(|source| Error::Io {
            operation: format!("stat {}", path.display()),
            source,
        })?
        .len()
        == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_empty)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    // An empty batch on a new file still gets its header.
    if rows.is_empty() && is_empty {
        writer.write_record(HEADER)?;
    }
    writer.flush().map_err(|source| Error::Io {
        operation: format!("flush {}", path.display()),
        source,
    })?;

    Ok(rows.len())
}

/// Read every row back from a batch CSV.
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<BatchRow>, _>>()?;
    Ok(rows)
}
