//! Per-record JSON files for replaying or diffing a request offline.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DiagError, Result};
use crate::record::ExtractedRecord;

pub fn dump_file_name(line_no: usize) -> String {
    format!("req_line_{}.json", line_no)
}

/// Write `record` pretty-printed to `<dir>/req_line_<line_no>.json`.
/// The file is closed when this returns, on success or failure.
pub fn dump_record(dir: &Path, line_no: usize, record: &ExtractedRecord) -> Result<PathBuf> {
    let path = dir.join(dump_file_name(line_no));
    let io_err = |source: std::io::Error| DiagError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &record.to_json())?;
    writer.flush().map_err(io_err)?;

    Ok(path)
}
