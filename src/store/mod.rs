//! Persistent state: the vendor list, the findings and the usage counter.
//!
//! Each piece of state sits behind the [`Store`] trait so the scan pipeline
//! never touches the filesystem directly. [`Workspace::open`] wires the
//! file-backed stores for a data directory; [`Workspace::in_memory`] wires
//! [`MemoryStore`]s for tests and embedding.
//!
//! # Layout
//!
//! | File | Contents |
//! |------|----------|
//! | `vendors.csv` | `vendor` header, one vendor per row |
//! | `bad_news.json` | vendor name to tagged finding |
//! | `api_usage.json` | `{"usage_count": n}` |
//!
//! # Example
//!
//! ```
//! use vendorwatch::store::Workspace;
//!
//! let workspace = Workspace::in_memory();
//! workspace.vendor_list().add("Acme").unwrap();
//! assert_eq!(workspace.vendor_list().list().unwrap(), vec!["Acme"]);
//! ```

mod json_file;
mod vendor_file;
mod vendors;

pub use json_file::JsonFileStore;
pub use vendor_file::CsvVendorFile;
pub use vendors::{VendorError, VendorList};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::model::{ApiUsage, Findings};

pub const VENDORS_FILE: &str = "vendors.csv";
pub const FINDINGS_FILE: &str = "bad_news.json";
pub const USAGE_FILE: &str = "api_usage.json";

/// Whole-value persistence for one piece of state.
///
/// `load` returns the current value, persisting the default first if
/// nothing has been stored yet. `save` replaces the stored value.
pub trait Store<T>: Send + Sync {
    fn load(&self) -> Result<T>;
    fn save(&self, value: &T) -> Result<()>;
}

/// A [`Store`] that keeps its value in memory.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    value: Mutex<T>,
}

impl<T> MemoryStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }
}

impl<T: Clone + Send> Store<T> for MemoryStore<T> {
    fn load(&self) -> Result<T> {
        let guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, value: &T) -> Result<()> {
        let mut guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        *guard = value.clone();
        Ok(())
    }
}

/// The three stores one process works against.
pub struct Workspace {
    pub vendors: Box<dyn Store<Vec<String>>>,
    pub findings: Box<dyn Store<Findings>>,
    pub usage: Box<dyn Store<ApiUsage>>,
    location: Option<PathBuf>,
}

impl Workspace {
    /// File-backed stores under `dir`. Nothing is touched on disk until the
    /// first load or save.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vendors: Box::new(CsvVendorFile::new(dir.join(VENDORS_FILE))),
            findings: Box::new(JsonFileStore::new(dir.join(FINDINGS_FILE))),
            usage: Box::new(JsonFileStore::new(dir.join(USAGE_FILE))),
            location: Some(dir.to_path_buf()),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_stores(
            MemoryStore::<Vec<String>>::default(),
            MemoryStore::<Findings>::default(),
            MemoryStore::<ApiUsage>::default(),
        )
    }

    pub fn from_stores(
        vendors: impl Store<Vec<String>> + 'static,
        findings: impl Store<Findings> + 'static,
        usage: impl Store<ApiUsage> + 'static,
    ) -> Self {
        Self {
            vendors: Box::new(vendors),
            findings: Box::new(findings),
            usage: Box::new(usage),
            location: None,
        }
    }

    /// Creates any missing store with its empty default.
    pub fn initialize(&self) -> Result<()> {
        self.vendors.load().context("initializing vendor list")?;
        self.findings.load().context("initializing findings")?;
        self.usage.load().context("initializing usage counter")?;
        Ok(())
    }

    pub fn vendor_list(&self) -> VendorList<'_> {
        VendorList::new(self.vendors.as_ref())
    }

    /// Data directory for file-backed workspaces.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

/// Writes `contents` to a uniquely named temp file beside `path` and renames
/// it into place, so concurrent writers never share a temp file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    let tmp = parent.join(format!(".tmp_{}", uuid::Uuid::new_v4()));

    fs::write(&tmp, contents).with_context(|| format!("writing {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("replacing {}", path.display()));
    }
    Ok(())
}
