//! Plain-text console report.

use std::fmt::Display;
use std::io::{self, Write};

use reqdiag_core::{
    IssueReport, PartialFacts, RejectionEntry, ReportKey, RequestDiagnosis, Severity, Summary,
};

const BANNER_WIDTH: usize = 60;

pub fn write_banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", rule)
}

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn summary_fields(summary: &Summary) -> String {
    format!(
        "conversationId={} content_len={} tools={} toolResults={} history={} json_len={}",
        summary.conversation_id.as_deref().unwrap_or("None"),
        or_unknown(summary.content_len),
        or_unknown(summary.tools),
        or_unknown(summary.tool_results),
        or_unknown(summary.history),
        summary.json_len
    )
}

fn partial_fields(facts: &PartialFacts) -> String {
    format!(
        "toolSpecs={} toolUseIds={} assistantMsgs={} userMsgs={} raw_len={}",
        facts.tool_spec_count,
        facts.tool_use_id_count,
        facts.assistant_message_count,
        facts.user_message_count,
        facts.raw_len
    )
}

/// Phase 1 body: one block per rejection line.
pub fn write_rejections<W: Write>(
    out: &mut W,
    entries: &[RejectionEntry],
    lookback_lines: usize,
) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "  no \"Improperly formed request\" rejections found")?;
        return writeln!(out);
    }

    for entry in entries {
        writeln!(out)?;
        writeln!(
            out,
            "  [line {}] bytes={} url={}",
            entry.line_no,
            or_unknown(entry.body_bytes),
            entry.url.as_deref().unwrap_or("?")
        )?;

        let Some(request) = &entry.request else {
            writeln!(
                out,
                "    -> request body: not found within {} lines",
                lookback_lines
            )?;
            continue;
        };

        match &request.diagnosis {
            RequestDiagnosis::Complete { summary, issues } => {
                writeln!(out, "    -> request body: line {}", request.line_no)?;
                writeln!(out, "    -> {}", summary_fields(summary))?;
                if !issues.is_empty() {
                    let codes: Vec<&str> = issues.iter().map(|issue| issue.as_str()).collect();
                    writeln!(out, "    -> issues: {}", codes.join(", "))?;
                }
            }
            RequestDiagnosis::Partial(facts) => {
                writeln!(out, "    -> request body: line {} (truncated)", request.line_no)?;
                writeln!(out, "    -> partial: {}", partial_fields(facts))?;
            }
        }
    }
    writeln!(out)
}

/// Occurrences of error-level and warning-level codes in the report.
fn severity_totals(report: &IssueReport) -> (usize, usize) {
    let mut errors = 0;
    let mut warnings = 0;
    for entry in &report.entries {
        match entry.key {
            ReportKey::Issue(issue) => match issue.severity() {
                Severity::Error => errors += entry.count,
                Severity::Warning => warnings += entry.count,
            },
            ReportKey::NoHeuristicMatch => {}
        }
    }
    (errors, warnings)
}

/// Phase 2 body: totals, issue counts and samples.
pub fn write_inventory<W: Write>(
    out: &mut W,
    report: &IssueReport,
    rejections_found: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "Parsed request_body entries: {} (complete: {}, truncated: {})",
        report.total,
        report.complete(),
        report.truncated
    )?;
    writeln!(out)?;

    if report.is_empty() {
        writeln!(out, "No request_body entries found.")?;
        if !rejections_found {
            writeln!(out)?;
            writeln!(
                out,
                "Hint: request bodies are only logged with sensitive logging enabled."
            )?;
            writeln!(
                out,
                "      Look for \"Kiro request body: \" or \"request_body=\" lines, or check kiro_request_body_bytes."
            )?;
        }
        return Ok(());
    }

    writeln!(out, "Issue counts:")?;
    for entry in &report.entries {
        writeln!(out, "  {:4}  {}", entry.count, entry.key)?;
    }
    let (errors, warnings) = severity_totals(report);
    writeln!(out, "Severity: errors={} warnings={}", errors, warnings)?;
    writeln!(out)?;

    writeln!(out, "Samples:")?;
    for entry in &report.entries {
        if entry.samples.is_empty() {
            continue;
        }
        writeln!(
            out,
            "- {} (showing {}/{})",
            entry.key,
            entry.samples.len(),
            entry.count
        )?;
        for sample in &entry.samples {
            writeln!(out, "  line={} {}", sample.line_no, summary_fields(sample))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqdiag_core::{CorrelatedRequest, ExtractedRecord, IssueAccumulator, IssueCode};
    use serde_json::Map;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn summary(line_no: usize) -> Summary {
        Summary {
            line_no,
            conversation_id: Some("conv-1".to_string()),
            content_len: None,
            tools: Some(2),
            tool_results: None,
            history: Some(4),
            json_len: 321,
        }
    }

    #[test]
    fn test_unknown_values_render_as_question_mark() {
        let fields = summary_fields(&summary(1));
        assert_eq!(
            fields,
            "conversationId=conv-1 content_len=? tools=2 toolResults=? history=4 json_len=321"
        );

        let mut anonymous = summary(1);
        anonymous.conversation_id = None;
        assert!(summary_fields(&anonymous).starts_with("conversationId=None "));
    }

    #[test]
    fn test_rejection_blocks() {
        let entries = vec![
            RejectionEntry {
                line_no: 12,
                body_bytes: Some(1834),
                url: None,
                request: Some(CorrelatedRequest {
                    line_no: 11,
                    diagnosis: RequestDiagnosis::Complete {
                        summary: summary(11),
                        issues: vec![IssueCode::ContentEmpty, IssueCode::PayloadLarge],
                    },
                }),
            },
            RejectionEntry {
                line_no: 30,
                body_bytes: None,
                url: Some("https://example.com/x".to_string()),
                request: Some(CorrelatedRequest {
                    line_no: 29,
                    diagnosis: RequestDiagnosis::Partial(PartialFacts {
                        raw_len: 900,
                        tool_spec_count: 3,
                        ..PartialFacts::default()
                    }),
                }),
            },
            RejectionEntry {
                line_no: 90,
                body_bytes: None,
                url: None,
                request: None,
            },
        ];

        let text = render(|out| write_rejections(out, &entries, 20));
        assert!(text.contains("  [line 12] bytes=1834 url=?\n"));
        assert!(text.contains("    -> request body: line 11\n"));
        assert!(text.contains("    -> issues: E_CONTENT_EMPTY, W_PAYLOAD_LARGE\n"));
        assert!(text.contains("  [line 30] bytes=? url=https://example.com/x\n"));
        assert!(text.contains("    -> request body: line 29 (truncated)\n"));
        assert!(text.contains(
            "    -> partial: toolSpecs=3 toolUseIds=0 assistantMsgs=0 userMsgs=0 raw_len=900\n"
        ));
        assert!(text.contains("    -> request body: not found within 20 lines\n"));
    }

    #[test]
    fn test_no_rejections() {
        let text = render(|out| write_rejections(out, &[], 20));
        assert!(text.contains("no \"Improperly formed request\" rejections found"));
    }

    #[test]
    fn test_inventory_counts_and_samples() {
        let mut acc = IssueAccumulator::new(1);
        let record = ExtractedRecord::Complete(Map::new());
        acc.record(&record, summary(3), &[IssueCode::ContentEmpty]);
        acc.record(&record, summary(8), &[IssueCode::ContentEmpty]);
        acc.record(&record, summary(9), &[]);
        let report = acc.finish();

        let text = render(|out| write_inventory(out, &report, false));
        assert!(text.contains("Parsed request_body entries: 3 (complete: 3, truncated: 0)"));
        assert!(text.contains("     2  E_CONTENT_EMPTY\n"));
        assert!(text.contains("     1  (NO_HEURISTIC_MATCH)\n"));
        assert!(text.contains("- E_CONTENT_EMPTY (showing 1/2)\n"));
        assert!(text.contains("  line=3 conversationId=conv-1"));
        assert!(!text.contains("line=8"));
        assert!(!text.contains("Hint:"));
        assert!(text.contains("Severity: errors=2 warnings=0\n"));
    }

    #[test]
    fn test_severity_totals_skip_no_match_bucket() {
        let mut acc = IssueAccumulator::new(0);
        let record = ExtractedRecord::Complete(Map::new());
        acc.record(
            &record,
            summary(1),
            &[IssueCode::HistoryToolUseOrphan, IssueCode::PayloadLarge],
        );
        acc.record(&record, summary(2), &[IssueCode::PayloadLarge]);
        acc.record(&record, summary(3), &[]);
        acc.record(&record, summary(4), &[]);
        let report = acc.finish();

        assert_eq!(severity_totals(&report), (1, 2));
        let text = render(|out| write_inventory(out, &report, true));
        assert!(text.contains("Severity: errors=1 warnings=2\n"));
    }

    #[test]
    fn test_empty_inventory_hint_only_without_rejections() {
        let report = IssueReport::default();

        let text = render(|out| write_inventory(out, &report, false));
        assert!(text.contains("No request_body entries found."));
        assert!(text.contains("Hint:"));

        let text = render(|out| write_inventory(out, &report, true));
        assert!(text.contains("No request_body entries found."));
        assert!(!text.contains("Hint:"));
    }
}
