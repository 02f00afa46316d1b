use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text shown for vendors whose search produced nothing usable.
pub const NO_RESULTS_MARKER: &str = "No results found.";

/// Latest scan result for a single vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Finding {
    /// Raw response body, stored verbatim.
    Found { body: String },
    /// The search succeeded but returned an empty body.
    NoResults,
    /// The search gave up; `reason` says why.
    Failed { reason: String },
}

impl Finding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Finding::Found { .. } => "found",
            Finding::NoResults => "no_results",
            Finding::Failed { .. } => "failed",
        }
    }

    /// The body for `Found`, the no-results marker otherwise.
    pub fn display_text(&self) -> &str {
        match self {
            Finding::Found { body } => body,
            Finding::NoResults | Finding::Failed { .. } => NO_RESULTS_MARKER,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Finding::Found { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Finding::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Findings keyed by vendor name.
pub type Findings = BTreeMap<String, Finding>;

/// Collapses findings to the display text of each entry.
pub fn display_map(findings: &Findings) -> BTreeMap<&str, &str> {
    findings
        .iter()
        .map(|(vendor, finding)| (vendor.as_str(), finding.display_text()))
        .collect()
}
