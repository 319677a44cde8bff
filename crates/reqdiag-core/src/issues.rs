use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Very likely to make upstream reject the request
    Error,
    /// Correlated with rejections but not conclusive
    Warning,
}

/// Every finding the rule engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueCode {
    ContentEmptyWithImages,
    ContentEmptyWithToolResults,
    ContentEmpty,
    ToolShapeInvalid,
    ToolSpecMissing,
    ToolInputSchemaNotObject,
    ToolDescriptionEmpty,
    ToolSchemaMissingSchema,
    ToolSchemaMissingType,
    HistoryToolUseNameNotInTools,
    ToolResultOrphan,
    HistoryToolResultOrphan,
    HistoryToolUseOrphan,
    HistoryTooLong,
    PayloadHuge,
    PayloadLarge,
    TruncatedLog,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::ContentEmptyWithImages => "E_CONTENT_EMPTY_WITH_IMAGES",
            IssueCode::ContentEmptyWithToolResults => "E_CONTENT_EMPTY_WITH_TOOL_RESULTS",
            IssueCode::ContentEmpty => "E_CONTENT_EMPTY",
            IssueCode::ToolShapeInvalid => "E_TOOL_SHAPE_INVALID",
            IssueCode::ToolSpecMissing => "E_TOOL_SPEC_MISSING",
            IssueCode::ToolInputSchemaNotObject => "E_TOOL_INPUT_SCHEMA_NOT_OBJECT",
            IssueCode::ToolDescriptionEmpty => "E_TOOL_DESCRIPTION_EMPTY",
            IssueCode::ToolSchemaMissingSchema => "W_TOOL_SCHEMA_MISSING_$SCHEMA",
            IssueCode::ToolSchemaMissingType => "W_TOOL_SCHEMA_MISSING_TYPE",
            IssueCode::HistoryToolUseNameNotInTools => "E_HISTORY_TOOL_USE_NAME_NOT_IN_TOOLS",
            IssueCode::ToolResultOrphan => "W_TOOL_RESULT_ORPHAN",
            IssueCode::HistoryToolResultOrphan => "E_HISTORY_TOOL_RESULT_ORPHAN",
            IssueCode::HistoryToolUseOrphan => "E_HISTORY_TOOL_USE_ORPHAN",
            IssueCode::HistoryTooLong => "W_HISTORY_TOO_LONG",
            IssueCode::PayloadHuge => "W_PAYLOAD_HUGE",
            IssueCode::PayloadLarge => "W_PAYLOAD_LARGE",
            IssueCode::TruncatedLog => "W_TRUNCATED_LOG",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::ContentEmptyWithImages
            | IssueCode::ContentEmptyWithToolResults
            | IssueCode::ContentEmpty
            | IssueCode::ToolShapeInvalid
            | IssueCode::ToolSpecMissing
            | IssueCode::ToolInputSchemaNotObject
            | IssueCode::ToolDescriptionEmpty
            | IssueCode::HistoryToolUseNameNotInTools
            | IssueCode::HistoryToolResultOrphan
            | IssueCode::HistoryToolUseOrphan => Severity::Error,
            IssueCode::ToolSchemaMissingSchema
            | IssueCode::ToolSchemaMissingType
            | IssueCode::ToolResultOrphan
            | IssueCode::HistoryTooLong
            | IssueCode::PayloadHuge
            | IssueCode::PayloadLarge
            | IssueCode::TruncatedLog => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
