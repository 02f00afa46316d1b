use super::FindingsPage;
use crate::model::ScanReport;
use anyhow::Result;

pub fn print_json(page: &FindingsPage) -> Result<()> {
    let json = serde_json::to_string_pretty(page)?;
    println!("{}", json);
    Ok(())
}

pub fn print_json_report(report: &ScanReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
