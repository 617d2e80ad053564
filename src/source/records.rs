//! Module index parsing.
//!
//! The index is a CSV file with a header row. Columns are matched by header
//! name in any order; a missing column leaves the field empty.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CheckError, Result};
use crate::scan::WorkItem;

/// Read the module index at `path`.
pub fn read_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let file = File::open(path).map_err(|e| CheckError::Source {
        message: format!("cannot open {}: {}", path.display(), e),
    })?;
    parse_work_items(file)
}

/// Parse a module index from any reader.
pub fn parse_work_items<R: Read>(reader: R) -> Result<Vec<WorkItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?;
    if headers.is_empty() {
        return Err(CheckError::Source {
            message: "empty CSV file".to_string(),
        });
    }

    let items = reader
        .deserialize::<WorkItem>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    tracing::debug!("Read {} work items", items.len());
    Ok(items)
}

fn csv_error(err: csv::Error) -> CheckError {
    CheckError::Source {
        message: format!("invalid CSV: {}", err),
    }
}
