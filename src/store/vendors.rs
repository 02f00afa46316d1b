//! Vendor list operations on top of a vendor [`Store`].

use thiserror::Error;
use tracing::info;

use super::Store;

/// Why a vendor mutation was refused.
#[derive(Debug, Error)]
pub enum VendorError {
    #[error("vendor name is empty")]
    EmptyName,

    #[error("vendor '{0}' already exists")]
    AlreadyExists(String),

    #[error("vendor '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl VendorError {
    /// True for refusals caused by the request rather than by storage.
    pub fn is_invalid_request(&self) -> bool {
        !matches!(self, VendorError::Storage(_))
    }
}

/// Add, remove and list vendors. Names are unique and kept in insertion order.
pub struct VendorList<'a> {
    store: &'a dyn Store<Vec<String>>,
}

impl<'a> VendorList<'a> {
    pub fn new(store: &'a dyn Store<Vec<String>>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<String>, VendorError> {
        Ok(self.store.load()?)
    }

    /// Appends `name` unless it is blank or already tracked.
    pub fn add(&self, name: &str) -> Result<String, VendorError> {
        let name = normalize(name)?;
        let mut vendors = self.store.load()?;

        if vendors.iter().any(|v| v == &name) {
            return Err(VendorError::AlreadyExists(name));
        }

        vendors.push(name.clone());
        self.store.save(&vendors)?;
        info!(vendor = %name, total = vendors.len(), "Vendor added");
        Ok(name)
    }

    /// Removes `name` if it is tracked.
    pub fn remove(&self, name: &str) -> Result<String, VendorError> {
        let name = normalize(name)?;
        let mut vendors = self.store.load()?;

        let Some(index) = vendors.iter().position(|v| v == &name) else {
            return Err(VendorError::NotFound(name));
        };

        vendors.remove(index);
        self.store.save(&vendors)?;
        info!(vendor = %name, total = vendors.len(), "Vendor removed");
        Ok(name)
    }
}

fn normalize(name: &str) -> Result<String, VendorError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VendorError::EmptyName);
    }
    Ok(name.to_string())
}
