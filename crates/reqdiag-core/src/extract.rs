//! Request body extraction from log text.
//!
//! Two line formats carry a body:
//! - the handler's DEBUG line `Kiro request body: {...}`, logged before the
//!   request is sent and usually complete;
//! - the provider's ERROR line `request_body={...}`, logged after a 400 and
//!   often truncated in the middle.
//!
//! The first line format wins when a line contains both. Bodies are decoded
//! with a streaming decoder so tracing fields after the JSON on the same line
//! are ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::iter::Enumerate;
use std::str::Lines;
use tracing::debug;

use crate::partial::recover_partial_facts;
use crate::record::{ExtractedRecord, PartialFacts};
use crate::sanitize::strip_ansi;
use crate::{REQUEST_BODY_FIELD, REQUEST_BODY_MARKER};

/// `request_body=` not glued to another identifier such as
/// `kiro_request_body=` or `response_body=`.
static REQUEST_BODY_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^a-z_])request_body=").unwrap());

/// Outcome of looking for a body marker on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerHit {
    Absent,
    /// The marker is there but no `{` follows it.
    WithoutPayload,
    /// Byte offset of the `{` opening the payload.
    Payload(usize),
}

/// Result of decoding the JSON that starts at a payload offset.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    Object(Map<String, Value>),
    /// Valid JSON but not an object.
    NotAnObject,
    /// Decoding failed; facts recovered from the fragment instead.
    Truncated(PartialFacts),
}

/// Look for the handler's `Kiro request body: ` marker only.
pub fn find_request_body_marker(clean: &str) -> MarkerHit {
    let Some(idx) = clean.find(REQUEST_BODY_MARKER) else {
        return MarkerHit::Absent;
    };
    brace_after(clean, idx + REQUEST_BODY_MARKER.len())
}

/// Look for the lower-priority `request_body=` field.
pub fn find_request_body_field(clean: &str) -> MarkerHit {
    if !clean.contains(REQUEST_BODY_FIELD) {
        return MarkerHit::Absent;
    }
    match REQUEST_BODY_FIELD_RE.find(clean) {
        Some(m) => brace_after(clean, m.end()),
        None => MarkerHit::Absent,
    }
}

/// Offset of the payload on a sanitized line, trying both markers in
/// priority order. A line with the high-priority marker but no payload is
/// not retried with the field marker.
pub fn find_payload_start(clean: &str) -> Option<usize> {
    let hit = match find_request_body_marker(clean) {
        MarkerHit::Absent => find_request_body_field(clean),
        hit => hit,
    };
    match hit {
        MarkerHit::Payload(brace) => Some(brace),
        MarkerHit::Absent | MarkerHit::WithoutPayload => None,
    }
}

fn brace_after(clean: &str, from: usize) -> MarkerHit {
    match clean[from..].find('{') {
        Some(rel) => MarkerHit::Payload(from + rel),
        None => MarkerHit::WithoutPayload,
    }
}

/// Decode the first JSON value starting at `brace`, ignoring whatever
/// follows it on the line.
pub fn decode_payload(clean: &str, brace: usize) -> DecodedPayload {
    let tail = &clean[brace..];
    let mut stream = serde_json::Deserializer::from_str(tail).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(body))) => DecodedPayload::Object(body),
        Some(Ok(_)) => DecodedPayload::NotAnObject,
        Some(Err(e)) => {
            debug!(error = %e, "request body did not decode, recovering partial facts");
            DecodedPayload::Truncated(recover_partial_facts(tail))
        }
        None => DecodedPayload::Truncated(recover_partial_facts(tail)),
    }
}

/// Lazily yields `(line_no, record)` for every request body in the log.
/// Line numbers start at 1.
pub struct RecordExtractor<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(log_text: &'a str) -> Self {
        Self {
            lines: log_text.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for RecordExtractor<'a> {
    type Item = (usize, ExtractedRecord);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            let line_no = idx + 1;
            let clean = strip_ansi(line);
            let Some(brace) = find_payload_start(&clean) else {
                continue;
            };

            match decode_payload(&clean, brace) {
                DecodedPayload::Object(body) => {
                    return Some((line_no, ExtractedRecord::Complete(body)));
                }
                DecodedPayload::NotAnObject => {
                    debug!(line_no, "request body is not a JSON object, skipping");
                }
                DecodedPayload::Truncated(facts) => {
                    debug!(line_no, raw_len = facts.raw_len, "truncated request body");
                    return Some((line_no, ExtractedRecord::Partial(facts)));
                }
            }
        }
        None
    }
}

pub fn iter_records(log_text: &str) -> RecordExtractor<'_> {
    RecordExtractor::new(log_text)
}
