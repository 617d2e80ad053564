//! JSON reports of scan outcomes.

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{CheckError, Result};
use crate::scan::Outcome;

fn report_error(path: &Path, message: impl ToString) -> CheckError {
    CheckError::Report {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Write `outcomes` to `path` as an indented JSON array.
pub fn write_report(path: &Path, outcomes: &[Outcome]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| report_error(path, e))?;

    let file = tempfile::NamedTempFile::new_in(dir).map_err(|e| report_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, outcomes).map_err(|e| report_error(path, e))?;
    writer.write_all(b"\n").map_err(|e| report_error(path, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| report_error(path, e.error()))?;
    file.persist(path).map_err(|e| report_error(path, e.error))?;

    tracing::debug!("Wrote {} outcomes to {}", outcomes.len(), path.display());
    Ok(())
}

/// Read a report written by [`write_report`].
///
/// Outcomes from older reports that lack `error_kind` get it inferred from
/// their error text.
pub fn load_report(path: &Path) -> Result<Vec<Outcome>> {
    let file = std::fs::File::open(path).map_err(|e| report_error(path, e))?;
    let mut outcomes: Vec<Outcome> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| report_error(path, e))?;
    for outcome in &mut outcomes {
        outcome.infer_error_kind();
    }
    Ok(outcomes)
}
