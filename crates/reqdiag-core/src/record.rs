use serde_json::{json, Map, Value};

/// A request body found in the log.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedRecord {
    /// The JSON object decoded completely.
    Complete(Map<String, Value>),
    /// The JSON was cut off; only textual approximations are available.
    Partial(PartialFacts),
}

/// Facts recovered from a JSON fragment that could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFacts {
    /// Length of the fragment in bytes
    pub raw_len: usize,
    pub conversation_id: Option<String>,
    /// Occurrences of `"toolUseId"` (tool uses and tool results alike)
    pub tool_use_id_count: usize,
    /// Occurrences of `"toolSpecification"`
    pub tool_spec_count: usize,
    /// Occurrences of `"assistantResponseMessage"`
    pub assistant_message_count: usize,
    /// Occurrences of `"userInputMessage"`
    pub user_message_count: usize,
}

impl ExtractedRecord {
    pub fn is_partial(&self) -> bool {
        matches!(self, ExtractedRecord::Partial(_))
    }

    pub fn as_partial(&self) -> Option<&PartialFacts> {
        match self {
            ExtractedRecord::Complete(_) => None,
            ExtractedRecord::Partial(facts) => Some(facts),
        }
    }

    /// JSON form written to dump files. Partial records keep the
    /// underscore-prefixed keys so they never collide with request fields.
    pub fn to_json(&self) -> Value {
        match self {
            ExtractedRecord::Complete(body) => Value::Object(body.clone()),
            ExtractedRecord::Partial(facts) => {
                let mut obj = json!({
                    "_partial": true,
                    "_raw_len": facts.raw_len,
                    "_toolUseId_count": facts.tool_use_id_count,
                    "_toolSpec_count": facts.tool_spec_count,
                    "_assistant_msg_count": facts.assistant_message_count,
                    "_user_msg_count": facts.user_message_count,
                });
                if let Some(id) = &facts.conversation_id {
                    obj["_conversationId"] = Value::String(id.clone());
                }
                obj
            }
        }
    }
}

/// Byte length of the compact JSON encoding of a body.
pub fn serialized_len(body: &Map<String, Value>) -> usize {
    // Cannot fail for a map of `Value`s.
    serde_json::to_string(body).map(|s| s.len()).unwrap_or(0)
}
