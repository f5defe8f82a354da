use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::table::PositionTable;

use super::StoreError;

pub struct BackupStore {
    path: PathBuf,
}

impl BackupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<PositionTable, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::Unavailable(err.to_string()),
        })?;
        serde_json::from_str(&raw).map_err(|err| StoreError::Malformed(err.to_string()))
    }

    // Takes the already-serialized snapshot; the engine serializes once
    // and sends the same blob here and to the remote store.
    pub fn write(&self, json: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        }
        fs::write(&self.path, json).map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::PositionRecord;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_round_trips_the_table() {
        let dir = TempDir::new().expect("temp dir");
        let store = BackupStore::new(dir.path().join("backup.json"));

        let mut table: PositionTable = HashMap::new();
        table.insert(
            "file:///podcasts/a.mp3".to_string(),
            PositionRecord::new(1700000000, 120, "alpha"),
        );
        table.insert(
            "file:///podcasts/b.mp3".to_string(),
            PositionRecord {
                timestamp: 1700000100,
                pos: 7,
                hosts: vec!["alpha".to_string(), "beta".to_string()],
            },
        );

        let json = serde_json::to_string_pretty(&table).expect("table should serialize");
        store.write(&json).expect("write should succeed");

        let loaded = store.read().expect("read should succeed");
        assert_eq!(loaded, table);
    }

    #[test]
    fn read_reports_missing_file_as_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let store = BackupStore::new(dir.path().join("missing.json"));
        assert!(matches!(store.read(), Err(StoreError::NotFound)));
    }

    #[test]
    fn read_reports_invalid_json_as_malformed() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("backup.json");
        std::fs::write(&path, "{not json").expect("seed file");
        let store = BackupStore::new(path);
        assert!(matches!(store.read(), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = TempDir::new().expect("temp dir");
        let store = BackupStore::new(dir.path().join("nested").join("backup.json"));
        store.write("{}").expect("write should create parents");
        assert!(store.path().is_file());
    }
}
