//! Best-effort facts from request bodies that the log cut off mid-object.
//!
//! Nothing here parses JSON. The fragment is already known to be malformed,
//! so the counts are plain occurrences of quoted key names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::PartialFacts;

static CONVERSATION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""conversationId"\s*:\s*"([^"]+)""#).unwrap());

const TOOL_USE_ID_TOKEN: &str = r#""toolUseId""#;
const TOOL_SPEC_TOKEN: &str = r#""toolSpecification""#;
const ASSISTANT_MESSAGE_TOKEN: &str = r#""assistantResponseMessage""#;
const USER_MESSAGE_TOKEN: &str = r#""userInputMessage""#;

pub fn recover_partial_facts(fragment: &str) -> PartialFacts {
    PartialFacts {
        raw_len: fragment.len(),
        conversation_id: CONVERSATION_ID_RE
            .captures(fragment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        tool_use_id_count: fragment.matches(TOOL_USE_ID_TOKEN).count(),
        tool_spec_count: fragment.matches(TOOL_SPEC_TOKEN).count(),
        assistant_message_count: fragment.matches(ASSISTANT_MESSAGE_TOKEN).count(),
        user_message_count: fragment.matches(USER_MESSAGE_TOKEN).count(),
    }
}
