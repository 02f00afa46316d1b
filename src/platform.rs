//! Cross-platform path resolution.
//!
//! vendorwatch keeps two locations: a config directory holding
//! `config.toml`, and a data directory holding the vendor list, the
//! findings and the usage counter.

use std::path::PathBuf;

const APP_DIR: &str = "vendorwatch";

/// Returns the data directory for vendorwatch.
///
/// Platform-specific locations:
/// - Linux: `~/.local/share/vendorwatch/`
/// - macOS: `~/Library/Application Support/vendorwatch/`
/// - Windows: `%APPDATA%\vendorwatch\`
///
/// Falls back to `./vendorwatch/` if no data directory can be determined.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the config directory for vendorwatch.
///
/// Platform-specific locations:
/// - Linux: `~/.config/vendorwatch/`
/// - macOS: `~/Library/Application Support/vendorwatch/`
/// - Windows: `%APPDATA%\vendorwatch\`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
