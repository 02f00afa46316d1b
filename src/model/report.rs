use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Finding, Findings};

/// Cumulative search counter, persisted as `{"usage_count": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUsage {
    pub usage_count: u64,
}

impl ApiUsage {
    pub fn new(usage_count: u64) -> Self {
        Self { usage_count }
    }

    /// Counter after a scan over `vendors` vendors.
    pub fn after_scan(self, vendors: usize) -> Self {
        Self {
            usage_count: self.usage_count.saturating_add(vendors as u64),
        }
    }
}

/// A vendor whose search failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorFailure {
    pub vendor: String,
    pub reason: String,
}

/// Summary of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub vendors_scanned: usize,
    pub found: usize,
    pub no_results: usize,
    pub failures: Vec<VendorFailure>,
    pub usage_count: u64,
}

impl ScanReport {
    pub fn new(
        started_at: DateTime<Utc>,
        findings: &Findings,
        usage: ApiUsage,
    ) -> Self {
        let mut report = Self {
            started_at,
            finished_at: Utc::now(),
            vendors_scanned: findings.len(),
            found: 0,
            no_results: 0,
            failures: Vec::new(),
            usage_count: usage.usage_count,
        };

        for (vendor, finding) in findings {
            match finding {
                Finding::Found { .. } => report.found += 1,
                Finding::NoResults => report.no_results += 1,
                Finding::Failed { reason } => report.failures.push(VendorFailure {
                    vendor: vendor.clone(),
                    reason: reason.clone(),
                }),
            }
        }

        report
    }

    pub fn summary(&self) -> String {
        format!(
            "Scanned {} vendors: {} with results, {} empty, {} failed (usage count {})",
            self.vendors_scanned,
            self.found,
            self.no_results,
            self.failures.len(),
            self.usage_count
        )
    }
}
