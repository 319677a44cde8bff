//! Matching between tool invocations and tool results across turns.
//!
//! Upstream requires every `toolUseId` introduced by an assistant turn in
//! the history to be answered by a tool result (in a later history turn or
//! in the current message), and every tool result to answer an invocation
//! that exists. Both directions are checked independently.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::payload::{tool_result_ids, tool_specification, turn_tool_results, ConversationView};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRelation {
    /// Declared tool names, lowercased
    pub tool_def_names: BTreeSet<String>,
    /// `toolUseId`s of assistant tool uses in the history
    pub tool_use_ids: BTreeSet<String>,
    /// `toolUseId`s of tool results in the history
    pub history_tool_result_ids: BTreeSet<String>,
    /// `toolUseId`s of tool results in the current message
    pub current_tool_result_ids: BTreeSet<String>,
    /// History tool uses whose name is not among the declared tools.
    /// Counted per invocation, so the same name can count more than once.
    pub undeclared_tool_uses: usize,
    /// Current results without a matching history tool use. Only counted
    /// when the history has tool uses at all.
    pub orphan_current_results: usize,
}

impl IdRelation {
    pub fn from_payload(view: &ConversationView<'_>) -> Self {
        let mut relation = IdRelation::default();

        for tool in view.tool_entries() {
            if let Some(name) = tool_specification(tool)
                .and_then(|spec| spec.get("name"))
                .and_then(Value::as_str)
            {
                relation.tool_def_names.insert(name.to_lowercase());
            }
        }

        for turn in view.history_turns().iter().filter_map(Value::as_object) {
            if let Some(assistant) = turn
                .get("assistantResponseMessage")
                .and_then(Value::as_object)
            {
                let tool_uses = assistant
                    .get("toolUses")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                for tool_use in tool_uses.iter().filter_map(Value::as_object) {
                    if let Some(id) = tool_use.get("toolUseId").and_then(Value::as_str) {
                        relation.tool_use_ids.insert(id.to_string());
                    }
                    if let Some(name) = tool_use.get("name").and_then(Value::as_str) {
                        if !relation.tool_def_names.is_empty()
                            && !relation.tool_def_names.contains(&name.to_lowercase())
                        {
                            relation.undeclared_tool_uses += 1;
                        }
                    }
                }
            }

            // A turn may carry both shapes; results count either way.
            for id in tool_result_ids(turn_tool_results(turn)) {
                relation.history_tool_result_ids.insert(id.to_string());
            }
        }

        for id in tool_result_ids(view.tool_result_entries()) {
            if !relation.tool_use_ids.is_empty() && !relation.tool_use_ids.contains(id) {
                relation.orphan_current_results += 1;
            }
            relation.current_tool_result_ids.insert(id.to_string());
        }

        relation
    }

    /// A history tool result answers a tool use that is not in the history.
    pub fn history_results_orphaned(&self) -> bool {
        !self.history_tool_result_ids.is_empty()
            && !self.history_tool_result_ids.is_subset(&self.tool_use_ids)
    }

    /// A history tool use is never answered, neither in the history nor in
    /// the current message.
    pub fn history_uses_orphaned(&self) -> bool {
        if self.tool_use_ids.is_empty() {
            return false;
        }
        self.tool_use_ids.iter().any(|id| {
            !self.history_tool_result_ids.contains(id) && !self.current_tool_result_ids.contains(id)
        })
    }

    /// Union of history and current tool-result ids.
    pub fn all_tool_result_ids(&self) -> BTreeSet<&str> {
        self.history_tool_result_ids
            .iter()
            .chain(self.current_tool_result_ids.iter())
            .map(String::as_str)
            .collect()
    }

    /// Tool uses without any result, in id order.
    pub fn unanswered_tool_uses(&self) -> Vec<&str> {
        let answered = self.all_tool_result_ids();
        self.tool_use_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !answered.contains(id))
            .collect()
    }
}
