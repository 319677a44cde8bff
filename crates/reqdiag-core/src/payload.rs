//! Read-only view over a decoded request body.
//!
//! Every accessor checks the JSON shape before use. A field that is missing,
//! `null`, or of the wrong type comes back as `None` instead of an error.

use serde_json::{Map, Value};

/// Walk `path` through nested objects. `null` counts as absent.
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut cur = root.get(*first)?;
    for part in rest {
        cur = cur.as_object()?.get(*part)?;
    }
    if cur.is_null() {
        None
    } else {
        Some(cur)
    }
}

/// Loose truthiness: empty containers, empty strings, zero, `false` and
/// `null` are all "nothing attached".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

const CONVERSATION_STATE: &str = "conversationState";
const CURRENT_USER_MESSAGE: [&str; 3] = [CONVERSATION_STATE, "currentMessage", "userInputMessage"];

/// The conversation inside a Kiro request body.
#[derive(Debug, Clone, Copy)]
pub struct ConversationView<'a> {
    body: &'a Map<String, Value>,
}

impl<'a> ConversationView<'a> {
    pub fn new(body: &'a Map<String, Value>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &'a Map<String, Value> {
        self.body
    }

    pub fn conversation_id(&self) -> Option<&'a str> {
        get_path(self.body, &[CONVERSATION_STATE, "conversationId"]).and_then(Value::as_str)
    }

    pub fn current_message(&self) -> Option<&'a Map<String, Value>> {
        get_path(self.body, &CURRENT_USER_MESSAGE).and_then(Value::as_object)
    }

    fn current_context(&self) -> Option<&'a Map<String, Value>> {
        self.current_message()?
            .get("userInputMessageContext")
            .and_then(Value::as_object)
    }

    /// Raw `content` of the current message, whatever its type.
    pub fn content(&self) -> Option<&'a Value> {
        self.current_message()?.get("content").filter(|v| !v.is_null())
    }

    pub fn images(&self) -> Option<&'a Value> {
        self.current_message()?.get("images").filter(|v| !v.is_null())
    }

    /// Raw `tools` of the current message context.
    pub fn tools(&self) -> Option<&'a Value> {
        self.current_context()?.get("tools").filter(|v| !v.is_null())
    }

    /// Raw `toolResults` of the current message context.
    pub fn tool_results(&self) -> Option<&'a Value> {
        self.current_context()?
            .get("toolResults")
            .filter(|v| !v.is_null())
    }

    pub fn history(&self) -> Option<&'a Value> {
        get_path(self.body, &[CONVERSATION_STATE, "history"])
    }

    /// `tools` entries when `tools` is an array.
    pub fn tool_entries(&self) -> &'a [Value] {
        array_or_empty(self.tools())
    }

    pub fn tool_result_entries(&self) -> &'a [Value] {
        array_or_empty(self.tool_results())
    }

    pub fn history_turns(&self) -> &'a [Value] {
        array_or_empty(self.history())
    }
}

fn array_or_empty(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `toolSpecification` of one tool entry.
pub fn tool_specification(tool: &Value) -> Option<&Map<String, Value>> {
    tool.get("toolSpecification").and_then(Value::as_object)
}

/// The string `toolUseId`s of the object entries in a `toolResults` array.
pub fn tool_result_ids(results: &[Value]) -> impl Iterator<Item = &str> {
    results
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|tr| tr.get("toolUseId").and_then(Value::as_str))
}

/// `userInputMessage.userInputMessageContext.toolResults` of a history turn.
pub fn turn_tool_results(turn: &Map<String, Value>) -> &[Value] {
    let results = turn
        .get("userInputMessage")
        .and_then(Value::as_object)
        .and_then(|um| um.get("userInputMessageContext"))
        .and_then(Value::as_object)
        .and_then(|ctx| ctx.get("toolResults"));
    array_or_empty(results)
}
