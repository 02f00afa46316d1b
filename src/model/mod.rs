//! Core data types for findings, usage and scan reports.
//!
//! - [`Finding`] - The stored result of the latest search for one vendor
//! - [`Findings`] - Vendor name to [`Finding`] mapping, replaced on every scan
//! - [`ApiUsage`] - The cumulative search counter
//! - [`ScanReport`] - Summary of one scan run
//!
//! # Example
//!
//! ```
//! use vendorwatch::model::{Finding, NO_RESULTS_MARKER};
//!
//! let finding = Finding::Failed { reason: "HTTP 503".into() };
//! assert_eq!(finding.display_text(), NO_RESULTS_MARKER);
//! ```

mod finding;
mod report;

pub use finding::*;
pub use report::*;
