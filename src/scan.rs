//! The scan pipeline.
//!
//! A scan loads the vendor list, searches each vendor in turn, and then
//! writes the new findings and the bumped usage counter. Nothing is written
//! until every vendor has been searched, so an interrupted scan leaves the
//! previous state in place.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::model::{Finding, Findings, ScanReport};
use crate::search::SearchProvider;
use crate::store::Workspace;

/// Runs one scan over every tracked vendor.
///
/// # Example
///
/// ```no_run
/// use vendorwatch::{config::SearchConfig, scan::run_scan, search::default_provider, store::Workspace};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let workspace = Workspace::open("data");
///     let provider = default_provider(&SearchConfig::default())?;
///     let report = run_scan(&workspace, &provider).await?;
///     println!("{}", report.summary());
///     Ok(())
/// }
/// ```
pub async fn run_scan(workspace: &Workspace, provider: &dyn SearchProvider) -> Result<ScanReport> {
    run_scan_with_progress(workspace, provider, |_, _, _| {}).await
}

/// Like [`run_scan`], calling `on_vendor(index, vendor, finding)` after each
/// vendor is searched.
pub async fn run_scan_with_progress<F>(
    workspace: &Workspace,
    provider: &dyn SearchProvider,
    mut on_vendor: F,
) -> Result<ScanReport>
where
    F: FnMut(usize, &str, &Finding),
{
    let started_at = Utc::now();
    let vendors = workspace
        .vendors
        .load()
        .context("loading vendor list")?;
    let usage = workspace.usage.load().context("loading usage counter")?;

    info!(vendors = vendors.len(), provider = provider.name(), "Starting scan");

    let mut findings = Findings::new();
    for (index, vendor) in vendors.iter().enumerate() {
        let finding = Finding::from(provider.search(vendor).await);

        if let Some(reason) = finding.failure_reason() {
            warn!(vendor = %vendor, reason, "Vendor search failed");
        }

        on_vendor(index, vendor, &finding);
        findings.insert(vendor.clone(), finding);
    }

    let usage = usage.after_scan(vendors.len());
    workspace
        .findings
        .save(&findings)
        .context("saving findings")?;
    workspace
        .usage
        .save(&usage)
        .context("saving usage counter")?;

    let report = ScanReport::new(started_at, &findings, usage);
    info!(
        vendors = report.vendors_scanned,
        found = report.found,
        failed = report.failures.len(),
        usage_count = report.usage_count,
        "Scan complete"
    );

    Ok(report)
}
