use std::io::ErrorKind;
use std::path::Path;

use crate::error::{DiagError, Result};

/// Read a whole log into memory. Invalid UTF-8 is replaced rather than
/// rejected, so binary noise in a log never stops the scan.
pub fn read_log_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DiagError::LogNotFound(path.to_path_buf()),
        _ => DiagError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
