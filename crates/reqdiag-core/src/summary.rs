use serde_json::Value;

use crate::payload::ConversationView;
use crate::record::{serialized_len, ExtractedRecord};

/// Printable projection of one request body.
///
/// `None` means the value could not be determined (truncated body or a
/// field of the wrong type); it is distinct from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub line_no: usize,
    pub conversation_id: Option<String>,
    pub content_len: Option<usize>,
    pub tools: Option<usize>,
    pub tool_results: Option<usize>,
    pub history: Option<usize>,
    /// Compact JSON length for complete bodies, fragment length for partial ones
    pub json_len: usize,
}

pub fn summarize(record: &ExtractedRecord, line_no: usize) -> Summary {
    match record {
        ExtractedRecord::Partial(facts) => Summary {
            line_no,
            conversation_id: facts.conversation_id.clone(),
            content_len: None,
            tools: Some(facts.tool_spec_count),
            tool_results: Some(facts.tool_use_id_count),
            history: Some(facts.assistant_message_count),
            json_len: facts.raw_len,
        },
        ExtractedRecord::Complete(body) => {
            let view = ConversationView::new(body);
            Summary {
                line_no,
                conversation_id: view.conversation_id().map(str::to_string),
                content_len: match view.content() {
                    None => Some(0),
                    Some(Value::String(s)) => Some(s.chars().count()),
                    Some(_) => None,
                },
                tools: list_len(view.tools()),
                tool_results: list_len(view.tool_results()),
                history: list_len(view.history()),
                json_len: serialized_len(body),
            }
        }
    }
}

/// Absent lists count as empty; anything that is not a list is unknown.
fn list_len(value: Option<&Value>) -> Option<usize> {
    match value {
        None => Some(0),
        Some(Value::Array(items)) => Some(items.len()),
        Some(_) => None,
    }
}
