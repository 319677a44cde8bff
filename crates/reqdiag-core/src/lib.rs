//! reqdiag core - pulls request bodies out of proxy logs and explains why
//! upstream may have rejected them as "Improperly formed request".

pub mod correlate;
pub mod dump;
pub mod error;
pub mod extract;
pub mod issues;
pub mod partial;
pub mod payload;
pub mod record;
pub mod relation;
pub mod report;
pub mod rules;
pub mod sanitize;
pub mod scan;
pub mod source;
pub mod summary;

pub use correlate::{scan_rejections, CorrelatedRequest, RejectionEntry, RequestDiagnosis};
pub use dump::dump_record;
pub use error::{DiagError, Result};
pub use extract::{iter_records, RecordExtractor};
pub use issues::{IssueCode, Severity};
pub use partial::recover_partial_facts;
pub use record::{ExtractedRecord, PartialFacts};
pub use relation::IdRelation;
pub use report::{IssueAccumulator, IssueReport, ReportEntry, ReportKey};
pub use rules::find_issues;
pub use sanitize::strip_ansi;
pub use scan::scan_inventory;
pub use source::read_log_lossy;
pub use summary::{summarize, Summary};

pub use reqdiag_config::{RejectionScanConfig, Thresholds};

/// Marker of the handler's DEBUG line carrying the full outbound body.
pub const REQUEST_BODY_MARKER: &str = "Kiro request body: ";

/// Field name used by the provider's ERROR line, possibly truncated.
pub const REQUEST_BODY_FIELD: &str = "request_body=";

/// Phrase logged when upstream answers 400 for a malformed request.
pub const REJECTION_MARKER: &str = "Improperly formed request";
