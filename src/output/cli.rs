use super::{preview, FindingsPage};
use crate::model::{Finding, ScanReport};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Details")]
    details: String,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Vendor")]
    vendor: String,
}

pub fn print_cli_table(page: &FindingsPage) -> Result<()> {
    println!();
    println!("Generated at: {}", page.timestamp());
    println!("API usage count: {}", page.usage_count);
    println!();

    if page.findings.is_empty() {
        println!("No findings recorded. Run a scan first.");
        return Ok(());
    }

    let rows: Vec<FindingRow> = page
        .findings
        .iter()
        .map(|(vendor, finding)| finding_row(vendor, finding))
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

fn finding_row(vendor: &str, finding: &Finding) -> FindingRow {
    let (status, size, details) = match finding {
        Finding::Found { body } => ("FOUND", format_size(body.len()), preview(body, 60)),
        Finding::NoResults => ("EMPTY", "-".to_string(), finding.display_text().to_string()),
        Finding::Failed { reason } => ("FAILED", "-".to_string(), preview(reason, 60)),
    };

    FindingRow {
        vendor: preview(vendor, 40),
        status: status.to_string(),
        size,
        details,
    }
}

pub fn print_cli_report(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scan finished at: {}",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}", report.summary());

    if !report.failures.is_empty() {
        println!();
        let rows: Vec<FailureRow> = report
            .failures
            .iter()
            .map(|f| FailureRow {
                vendor: f.vendor.clone(),
                reason: f.reason.clone(),
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    Ok(())
}

pub fn print_vendor_table(vendors: &[String]) -> Result<()> {
    if vendors.is_empty() {
        println!("No vendors tracked.");
        return Ok(());
    }

    let rows: Vec<VendorRow> = vendors
        .iter()
        .enumerate()
        .map(|(i, v)| VendorRow {
            index: i + 1,
            vendor: v.clone(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

fn format_size(bytes: usize) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        b if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{} B", b),
    }
}
