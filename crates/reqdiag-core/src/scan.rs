use reqdiag_config::Thresholds;
use tracing::debug;

use crate::extract::RecordExtractor;
use crate::record::ExtractedRecord;
use crate::report::{IssueAccumulator, IssueReport};
use crate::rules::find_issues;
use crate::summary::summarize;

/// Summarize and evaluate every request body in the log.
///
/// `on_record` sees each record before it is accumulated; an error from it
/// stops the scan and is returned as is.
pub fn scan_inventory<E, F>(
    log_text: &str,
    thresholds: &Thresholds,
    max_samples: usize,
    mut on_record: F,
) -> Result<IssueReport, E>
where
    F: FnMut(usize, &ExtractedRecord) -> Result<(), E>,
{
    let mut accumulator = IssueAccumulator::new(max_samples);

    for (line_no, record) in RecordExtractor::new(log_text) {
        let summary = summarize(&record, line_no);
        let issues = find_issues(&record, thresholds);
        debug!(
            line_no,
            issues = issues.len(),
            partial = record.is_partial(),
            "scanned request body"
        );

        on_record(line_no, &record)?;
        accumulator.record(&record, summary, &issues);
    }

    Ok(accumulator.finish())
}
