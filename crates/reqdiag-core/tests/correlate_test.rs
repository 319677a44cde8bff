//! Rejection Correlation Tests
//!
//! These tests verify that each "Improperly formed request" line is paired
//! with the nearest preceding request body, and that the pairing respects
//! the lookback window.

use reqdiag_core::{scan_rejections, IssueCode, RejectionScanConfig, RequestDiagnosis};
use serde_json::{json, Value};

fn body_line(body: &Value) -> String {
    format!(
        "2025-06-01T10:00:00Z DEBUG kiro_rs::anthropic::handlers: Kiro request body: {}",
        body
    )
}

fn rejection_line() -> String {
    concat!(
        "2025-06-01T10:00:01Z ERROR kiro_rs::provider: upstream 400 ",
        "{\"message\":\"Improperly formed request.\",\"reason\":null} ",
        "kiro_request_body_bytes=1834 request_url=https://q.us-east-1.example.com/generateAssistantResponse"
    )
    .to_string()
}

fn simple_body() -> Value {
    json!({"conversationState": {
        "conversationId": "conv-9",
        "history": [],
        "currentMessage": {"userInputMessage": {"content": ""}}
    }})
}

fn filler(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("INFO heartbeat seq={}", i)).collect()
}

// =============================================================================
// PAIRING
// =============================================================================

/// Test: a rejection right after a body gets its fields and a diagnosis
#[test]
fn test_rejection_paired_with_previous_body() {
    let log = [body_line(&simple_body()), rejection_line()].join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.line_no, 2);
    assert_eq!(entry.body_bytes, Some(1834));
    assert_eq!(
        entry.url.as_deref(),
        Some("https://q.us-east-1.example.com/generateAssistantResponse")
    );

    let request = entry.request.as_ref().expect("request should be correlated");
    assert_eq!(request.line_no, 1);
    match &request.diagnosis {
        RequestDiagnosis::Complete { summary, issues } => {
            assert_eq!(summary.line_no, 1);
            assert_eq!(summary.conversation_id.as_deref(), Some("conv-9"));
            assert_eq!(issues, &vec![IssueCode::ContentEmpty]);
        }
        other => panic!("expected complete diagnosis, got {:?}", other),
    }
}

/// Test: the plain `request_body_bytes=` field is read too; missing fields stay unknown
#[test]
fn test_optional_rejection_fields() {
    let log = [
        "WARN Improperly formed request request_body_bytes=77".to_string(),
        "\x1b[31mERROR\x1b[0m Improperly formed request".to_string(),
    ]
    .join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].body_bytes, Some(77));
    assert_eq!(entries[0].url, None);
    assert_eq!(entries[1].body_bytes, None);
    assert!(entries.iter().all(|e| e.request.is_none()));
}

/// Test: a body size too large for u64 is reported as unknown
#[test]
fn test_overflowing_body_size_is_unknown() {
    let log = "ERROR Improperly formed request kiro_request_body_bytes=99999999999999999999999";

    let entries = scan_rejections(log, &RejectionScanConfig::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].body_bytes, None);
}

/// Test: the nearest body wins when several precede the rejection
#[test]
fn test_nearest_body_wins() {
    let older = json!({"conversationState": {"conversationId": "old"}});
    let newer = json!({"conversationState": {"conversationId": "new"}});
    let log = [body_line(&older), body_line(&newer), rejection_line()].join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    let request = entries[0].request.as_ref().unwrap();
    assert_eq!(request.line_no, 2);
}

/// Test: a nearer marker line without a payload ends the search
#[test]
fn test_marker_without_payload_stops_walk() {
    let log = [
        body_line(&simple_body()),
        "DEBUG Kiro request body: <omitted>".to_string(),
        rejection_line(),
    ]
    .join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    assert!(entries[0].request.is_none());
}

/// Test: provider `request_body=` lines are not used for pairing
#[test]
fn test_field_marker_not_used_for_pairing() {
    let log = [
        format!("ERROR request_body={}", simple_body()),
        rejection_line(),
    ]
    .join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    assert!(entries[0].request.is_none());
}

// =============================================================================
// LOOKBACK WINDOW
// =============================================================================

/// Test: a body exactly `lookback_lines` back is found, one further is not
#[test]
fn test_lookback_boundary() {
    let config = RejectionScanConfig::default();
    assert_eq!(config.lookback_lines, 20);

    let mut within = vec![body_line(&simple_body())];
    within.extend(filler(19));
    within.push(rejection_line());
    let entries = scan_rejections(&within.join("\n"), &config);
    assert_eq!(entries[0].line_no, 21);
    assert_eq!(entries[0].request.as_ref().map(|r| r.line_no), Some(1));

    let mut beyond = vec![body_line(&simple_body())];
    beyond.extend(filler(20));
    beyond.push(rejection_line());
    let entries = scan_rejections(&beyond.join("\n"), &config);
    assert_eq!(entries[0].line_no, 22);
    assert!(entries[0].request.is_none());
}

/// Test: a rejection on the first line has nothing to look back at
#[test]
fn test_rejection_on_first_line() {
    let entries = scan_rejections(&rejection_line(), &RejectionScanConfig::default());
    assert_eq!(entries.len(), 1);
    assert!(entries[0].request.is_none());
}

// =============================================================================
// DIAGNOSIS
// =============================================================================

/// Test: a truncated body is attached as partial facts, not run through rules
#[test]
fn test_truncated_body_attached_as_partial() {
    let full = json!({"conversationState": {
        "conversationId": "conv-t",
        "history": [{"assistantResponseMessage": {"toolUses": [{"toolUseId": "a1"}]}}]
    }})
    .to_string();
    let log = [
        format!("DEBUG Kiro request body: {}", &full[..full.len() - 2]),
        rejection_line(),
    ]
    .join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    match &entries[0].request.as_ref().unwrap().diagnosis {
        RequestDiagnosis::Partial(facts) => {
            assert_eq!(facts.conversation_id.as_deref(), Some("conv-t"));
            assert_eq!(facts.tool_use_id_count, 1);
            assert_eq!(facts.assistant_message_count, 1);
        }
        other => panic!("expected partial diagnosis, got {:?}", other),
    }
}

/// Test: the rejection scan uses its own, lower size thresholds
#[test]
fn test_rejection_thresholds_apply() {
    let body = json!({"conversationState": {
        "currentMessage": {"userInputMessage": {"content": "x".repeat(100_000)}}
    }});
    let log = [body_line(&body), rejection_line()].join("\n");

    let entries = scan_rejections(&log, &RejectionScanConfig::default());
    match &entries[0].request.as_ref().unwrap().diagnosis {
        RequestDiagnosis::Complete { issues, .. } => {
            assert_eq!(issues, &vec![IssueCode::PayloadLarge]);
        }
        other => panic!("expected complete diagnosis, got {:?}", other),
    }

    let relaxed = RejectionScanConfig {
        large_payload_bytes: 400_000,
        huge_payload_bytes: 800_000,
        ..RejectionScanConfig::default()
    };
    let entries = scan_rejections(&log, &relaxed);
    match &entries[0].request.as_ref().unwrap().diagnosis {
        RequestDiagnosis::Complete { issues, .. } => assert!(issues.is_empty()),
        other => panic!("expected complete diagnosis, got {:?}", other),
    }
}

/// Test: a log without rejections yields nothing
#[test]
fn test_no_rejections() {
    let log = [body_line(&simple_body()), "INFO ok".to_string()].join("\n");
    assert!(scan_rejections(&log, &RejectionScanConfig::default()).is_empty());
}
