pub mod config;
pub mod model;
pub mod output;
pub mod platform;
pub mod scan;
pub mod search;
pub mod server;
pub mod store;

pub use config::Config;
pub use model::{ApiUsage, Finding, Findings, ScanReport};
pub use scan::run_scan;
pub use search::{SearchOutcome, SearchProvider};
pub use store::Workspace;
