//! JSON file-backed store.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::{write_atomic, Store};

/// Persists a single value as pretty-printed JSON.
///
/// A missing file is created holding `T::default()` on first load.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Store<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> Result<T> {
        if !self.path.exists() {
            let value = T::default();
            self.save(&value)?;
            return Ok(value);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save(&self, value: &T) -> Result<()> {
        let content = serde_json::to_vec_pretty(value)?;
        write_atomic(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiUsage, Finding, Findings};

    #[test]
    fn test_missing_file_created_with_default() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<ApiUsage> = JsonFileStore::new(dir.path().join("api_usage.json"));

        assert_eq!(store.load().unwrap(), ApiUsage::default());

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"usage_count": 0}));
    }

    #[test]
    fn test_reads_existing_usage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_usage.json");
        fs::write(&path, r#"{"usage_count": 42}"#).unwrap();

        let store: JsonFileStore<ApiUsage> = JsonFileStore::new(&path);
        assert_eq!(store.load().unwrap().usage_count, 42);
    }

    #[test]
    fn test_save_overwrites_findings_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Findings> = JsonFileStore::new(dir.path().join("bad_news.json"));

        let mut first = Findings::new();
        first.insert("Acme".to_string(), Finding::NoResults);
        first.insert("Globex".to_string(), Finding::NoResults);
        store.save(&first).unwrap();

        let mut second = Findings::new();
        second.insert(
            "Initech".to_string(),
            Finding::Found {
                body: "<p>fraud</p>".to_string(),
            },
        );
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_news.json");
        fs::write(&path, "not json").unwrap();

        let store: JsonFileStore<Findings> = JsonFileStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("bad_news.json"));
    }
}
