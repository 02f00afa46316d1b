//! CSV-backed vendor list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{write_atomic, Store};

const HEADER: &str = "vendor";

#[derive(Debug, Serialize, Deserialize)]
struct VendorRow {
    vendor: String,
}

/// Stores vendor names as a one-column CSV file with a `vendor` header.
///
/// Blank rows are skipped and repeated names keep their first position.
pub struct CsvVendorFile {
    path: PathBuf,
}

impl CsvVendorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store<Vec<String>> for CsvVendorFile {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            self.save(&Vec::new())?;
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut seen = HashSet::new();
        let mut vendors = Vec::new();
        for row in reader.deserialize::<VendorRow>() {
            let row = row.with_context(|| format!("parsing {}", self.path.display()))?;
            let name = row.vendor.trim();
            if !name.is_empty() && seen.insert(name.to_string()) {
                vendors.push(name.to_string());
            }
        }

        Ok(vendors)
    }

    fn save(&self, vendors: &Vec<String>) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record([HEADER])?;
        for vendor in vendors {
            writer.write_record([vendor.as_str()])?;
        }

        let buffer = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing vendor list: {}", e.error()))?;
        write_atomic(&self.path, &buffer)
    }
}
