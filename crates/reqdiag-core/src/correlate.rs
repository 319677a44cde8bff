//! Pair each upstream "Improperly formed request" rejection with the request
//! body logged just before it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extract::{decode_payload, find_request_body_marker, DecodedPayload, MarkerHit};
use crate::issues::IssueCode;
use crate::record::{ExtractedRecord, PartialFacts};
use crate::rules::find_issues;
use crate::sanitize::strip_ansi;
use crate::summary::{summarize, Summary};
use crate::REJECTION_MARKER;
use reqdiag_config::{RejectionScanConfig, Thresholds};

static BODY_BYTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:kiro_)?request_body_bytes=(\d+)").unwrap());
static REQUEST_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"request_url=(\S+)").unwrap());

/// One rejection line and whatever could be learned about its request.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionEntry {
    pub line_no: usize,
    /// Declared body size from `request_body_bytes=`/`kiro_request_body_bytes=`
    pub body_bytes: Option<u64>,
    pub url: Option<String>,
    /// Nearest preceding request body within the lookback window
    pub request: Option<CorrelatedRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedRequest {
    pub line_no: usize,
    pub diagnosis: RequestDiagnosis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestDiagnosis {
    /// Fully decoded and run through the rule engine.
    Complete {
        summary: Summary,
        issues: Vec<IssueCode>,
    },
    /// Truncated; only the partial facts are available. The rule engine is
    /// not run on these.
    Partial(PartialFacts),
}

pub fn scan_rejections(log_text: &str, config: &RejectionScanConfig) -> Vec<RejectionEntry> {
    let lines: Vec<&str> = log_text.lines().collect();
    let thresholds = config.thresholds();
    let mut results = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let clean = strip_ansi(line);
        if !clean.contains(REJECTION_MARKER) {
            continue;
        }

        let body_bytes = BODY_BYTES_RE.captures(&clean).and_then(|caps| {
            caps[1]
                .parse::<u64>()
                .map_err(|e| {
                    debug!(
                        line_no = idx + 1,
                        value = &caps[1],
                        error = %e,
                        "unreadable body size"
                    );
                })
                .ok()
        });
        let url = REQUEST_URL_RE
            .captures(&clean)
            .map(|caps| caps[1].to_string());

        let request = find_preceding_request(&lines, idx, config.lookback_lines).and_then(
            |(body_line_no, decoded)| {
                diagnose(decoded, body_line_no, &thresholds).map(|diagnosis| CorrelatedRequest {
                    line_no: body_line_no,
                    diagnosis,
                })
            },
        );
        if request.is_none() {
            debug!(line_no = idx + 1, "no request body found before rejection");
        }

        results.push(RejectionEntry {
            line_no: idx + 1,
            body_bytes,
            url,
            request,
        });
    }

    results
}

/// Walk back from `idx` (0-based) at most `lookback` lines. The nearest line
/// with the request body marker ends the search, even when it has no payload.
fn find_preceding_request(
    lines: &[&str],
    idx: usize,
    lookback: usize,
) -> Option<(usize, DecodedPayload)> {
    for back in 1..=lookback.min(idx) {
        let prev_idx = idx - back;
        let prev = strip_ansi(lines[prev_idx]);
        match find_request_body_marker(&prev) {
            MarkerHit::Absent => continue,
            MarkerHit::WithoutPayload => return None,
            MarkerHit::Payload(brace) => {
                return Some((prev_idx + 1, decode_payload(&prev, brace)));
            }
        }
    }
    None
}

fn diagnose(
    decoded: DecodedPayload,
    line_no: usize,
    thresholds: &Thresholds,
) -> Option<RequestDiagnosis> {
    match decoded {
        DecodedPayload::Object(body) => {
            let record = ExtractedRecord::Complete(body);
            Some(RequestDiagnosis::Complete {
                issues: find_issues(&record, thresholds),
                summary: summarize(&record, line_no),
            })
        }
        DecodedPayload::Truncated(facts) => Some(RequestDiagnosis::Partial(facts)),
        DecodedPayload::NotAnObject => None,
    }
}
