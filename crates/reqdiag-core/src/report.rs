//! Issue counts and samples across a whole log.

use std::fmt;

use crate::issues::IssueCode;
use crate::record::ExtractedRecord;
use crate::summary::Summary;

/// Bucket an issue count is kept under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKey {
    Issue(IssueCode),
    /// The record triggered no rule at all.
    NoHeuristicMatch,
}

impl ReportKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKey::Issue(issue) => issue.as_str(),
            ReportKey::NoHeuristicMatch => "(NO_HEURISTIC_MATCH)",
        }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub key: ReportKey,
    /// Number of records showing this issue (at most once per record)
    pub count: usize,
    pub samples: Vec<Summary>,
}

/// Final, ordered view of an accumulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueReport {
    pub total: usize,
    pub truncated: usize,
    /// Most common first; ties keep the order keys were first seen in.
    pub entries: Vec<ReportEntry>,
}

impl IssueReport {
    pub fn complete(&self) -> usize {
        self.total - self.truncated
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, key: ReportKey) -> usize {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map_or(0, |entry| entry.count)
    }
}

/// Single-pass accumulator. It owns all state, so separate chunks of a log
/// can be accumulated independently and merged.
#[derive(Debug, Clone)]
pub struct IssueAccumulator {
    max_samples: usize,
    total: usize,
    truncated: usize,
    entries: Vec<ReportEntry>,
}

impl IssueAccumulator {
    pub fn new(max_samples: usize) -> Self {
        Self {
            max_samples,
            total: 0,
            truncated: 0,
            entries: Vec::new(),
        }
    }

    /// Add one record's findings. Duplicate issues in `issues` count once.
    pub fn record(&mut self, record: &ExtractedRecord, summary: Summary, issues: &[IssueCode]) {
        self.total += 1;
        if record.is_partial() {
            self.truncated += 1;
        }

        let mut keys: Vec<ReportKey> = Vec::with_capacity(issues.len().max(1));
        for issue in issues {
            let key = ReportKey::Issue(*issue);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        if keys.is_empty() {
            keys.push(ReportKey::NoHeuristicMatch);
        }

        let max_samples = self.max_samples;
        for key in keys {
            let entry = self.entry_mut(key);
            entry.count += 1;
            if entry.samples.len() < max_samples {
                entry.samples.push(summary.clone());
            }
        }
    }

    fn entry_mut(&mut self, key: ReportKey) -> &mut ReportEntry {
        let pos = match self.entries.iter().position(|entry| entry.key == key) {
            Some(pos) => pos,
            None => {
                self.entries.push(ReportEntry {
                    key,
                    count: 0,
                    samples: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos]
    }

    /// Fold another accumulator into this one. Samples from `other` fill
    /// whatever room is left per key.
    pub fn merge(&mut self, other: IssueAccumulator) {
        self.total += other.total;
        self.truncated += other.truncated;
        let max_samples = self.max_samples;
        for theirs in other.entries {
            let ours = self.entry_mut(theirs.key);
            ours.count += theirs.count;
            let room = max_samples.saturating_sub(ours.samples.len());
            ours.samples.extend(theirs.samples.into_iter().take(room));
        }
    }

    pub fn finish(self) -> IssueReport {
        let mut entries = self.entries;
        // Stable sort keeps first-seen order among equal counts.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        IssueReport {
            total: self.total,
            truncated: self.truncated,
            entries,
        }
    }
}
