//! Heuristic consistency rules for a single request body.
//!
//! These flag locally observable problems that correlate with upstream
//! "Improperly formed request" rejections. They do not reproduce upstream
//! validation and a clean result proves nothing.

use serde_json::{Map, Value};
use tracing::trace;

use crate::issues::IssueCode;
use crate::payload::{is_truthy, tool_specification, ConversationView};
use crate::record::{serialized_len, ExtractedRecord, PartialFacts};
use crate::relation::IdRelation;
use reqdiag_config::Thresholds;

const UNNAMED_TOOL: &str = "<noname>";

/// Evaluate a record. The returned list keeps emission order and may hold
/// duplicates; callers counting issues should deduplicate.
pub fn find_issues(record: &ExtractedRecord, thresholds: &Thresholds) -> Vec<IssueCode> {
    match record {
        ExtractedRecord::Partial(facts) => partial_issues(facts, thresholds),
        ExtractedRecord::Complete(body) => complete_issues(body, thresholds),
    }
}

/// A truncated body supports no structural checks.
fn partial_issues(facts: &PartialFacts, thresholds: &Thresholds) -> Vec<IssueCode> {
    let mut issues = vec![IssueCode::TruncatedLog];
    if facts.raw_len > thresholds.large_payload_bytes {
        issues.push(IssueCode::PayloadLarge);
    }
    issues
}

fn complete_issues(body: &Map<String, Value>, thresholds: &Thresholds) -> Vec<IssueCode> {
    let view = ConversationView::new(body);
    let mut issues = Vec::new();

    check_empty_content(&view, &mut issues);
    check_tool_specs(&view, &mut issues);
    check_tool_id_relation(&view, &mut issues);
    check_volume(&view, thresholds, &mut issues);

    trace!(count = issues.len(), "evaluated complete request body");
    issues
}

fn check_empty_content(view: &ConversationView<'_>, issues: &mut Vec<IssueCode>) {
    let Some(Value::String(content)) = view.content() else {
        return;
    };
    if !content.trim().is_empty() {
        return;
    }

    if view.images().is_some_and(is_truthy) {
        issues.push(IssueCode::ContentEmptyWithImages);
    } else if view.tool_results().is_some_and(is_truthy) {
        issues.push(IssueCode::ContentEmptyWithToolResults);
    } else {
        issues.push(IssueCode::ContentEmpty);
    }
}

fn check_tool_specs(view: &ConversationView<'_>, issues: &mut Vec<IssueCode>) {
    let mut empty_description: Vec<&str> = Vec::new();
    let mut missing_schema: Vec<&str> = Vec::new();
    let mut missing_type: Vec<&str> = Vec::new();

    for tool in view.tool_entries() {
        if !tool.is_object() {
            issues.push(IssueCode::ToolShapeInvalid);
            continue;
        }
        let Some(spec) = tool_specification(tool) else {
            issues.push(IssueCode::ToolSpecMissing);
            continue;
        };

        let name = spec
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(UNNAMED_TOOL);

        if let Some(description) = spec.get("description").and_then(Value::as_str) {
            if description.trim().is_empty() {
                empty_description.push(name);
            }
        }

        let json_schema = spec
            .get("inputSchema")
            .and_then(Value::as_object)
            .and_then(|input| input.get("json"))
            .and_then(Value::as_object);
        match json_schema {
            Some(schema) => {
                if !schema.contains_key("$schema") {
                    missing_schema.push(name);
                }
                if !schema.contains_key("type") {
                    missing_type.push(name);
                }
            }
            None => issues.push(IssueCode::ToolInputSchemaNotObject),
        }
    }

    if !empty_description.is_empty() {
        trace!(tools = ?empty_description, "tools with blank descriptions");
        issues.push(IssueCode::ToolDescriptionEmpty);
    }
    if !missing_schema.is_empty() {
        trace!(tools = ?missing_schema, "tool schemas without $schema");
        issues.push(IssueCode::ToolSchemaMissingSchema);
    }
    if !missing_type.is_empty() {
        trace!(tools = ?missing_type, "tool schemas without type");
        issues.push(IssueCode::ToolSchemaMissingType);
    }
}

fn check_tool_id_relation(view: &ConversationView<'_>, issues: &mut Vec<IssueCode>) {
    let relation = IdRelation::from_payload(view);

    issues.extend(
        std::iter::repeat(IssueCode::HistoryToolUseNameNotInTools)
            .take(relation.undeclared_tool_uses),
    );
    if relation.orphan_current_results > 0 {
        issues.push(IssueCode::ToolResultOrphan);
    }
    if relation.history_results_orphaned() {
        issues.push(IssueCode::HistoryToolResultOrphan);
    }
    if relation.history_uses_orphaned() {
        trace!(ids = ?relation.unanswered_tool_uses(), "unanswered tool uses");
        issues.push(IssueCode::HistoryToolUseOrphan);
    }
}

fn check_volume(view: &ConversationView<'_>, thresholds: &Thresholds, issues: &mut Vec<IssueCode>) {
    if let Some(Value::Array(history)) = view.history() {
        if history.len() > thresholds.max_history_messages {
            issues.push(IssueCode::HistoryTooLong);
        }
    }

    let json_len = serialized_len(view.body());
    if json_len > thresholds.huge_payload_bytes {
        issues.push(IssueCode::PayloadHuge);
    } else if json_len > thresholds.large_payload_bytes {
        issues.push(IssueCode::PayloadLarge);
    }
}
