mod cli;
mod html;
mod json;

pub use cli::{print_cli_report, print_cli_table, print_vendor_table};
pub use html::{generate_html_string, print_html};
pub use json::{print_json, print_json_report};

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::{Findings, ScanReport};
use crate::store::Workspace;

/// Output format for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
    /// HTML report format
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'json', or 'html'",
                s
            )),
        }
    }
}

/// Everything the findings views show: the stored findings, the usage
/// counter and the time the view was generated.
#[derive(Debug, Clone, Serialize)]
pub struct FindingsPage {
    pub generated_at: DateTime<Local>,
    pub usage_count: u64,
    pub findings: Findings,
}

impl FindingsPage {
    pub fn new(findings: Findings, usage_count: u64) -> Self {
        Self {
            generated_at: Local::now(),
            usage_count,
            findings,
        }
    }

    pub fn load(workspace: &Workspace) -> Result<Self> {
        let findings = workspace.findings.load()?;
        let usage = workspace.usage.load()?;
        Ok(Self::new(findings, usage.usage_count))
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

pub fn print_findings(page: &FindingsPage, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(page),
        OutputFormat::Json => print_json(page),
        OutputFormat::Html => print_html(page),
    }
}

/// Format findings to string for file output
pub fn format_findings_to_string(page: &FindingsPage, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(page)?),
        OutputFormat::Html => Ok(generate_html_string(page)),
        OutputFormat::Table => {
            // For table format, just use JSON as the file output
            Ok(serde_json::to_string_pretty(page)?)
        }
    }
}

pub fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json_report(report),
        OutputFormat::Table | OutputFormat::Html => print_cli_report(report),
    }
}

/// Shortens `s` to at most `max_chars` characters, collapsing whitespace.
pub(crate) fn preview(s: &str, max_chars: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
