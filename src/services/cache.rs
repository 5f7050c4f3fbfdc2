//! Record snapshot cache
//!
//! Keeps the last record set successfully fetched from each source so the
//! dashboard can still show real numbers when the source is unreachable.
//! Every successful fetch replaces the snapshot wholesale (last write wins).

use crate::types::{CacheWarning, FieldMetricsError, InstallationRecord, Result};
use directories::BaseDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub source: String,
    pub updated_at: i64,
    pub records: Vec<InstallationRecord>,
}

pub struct SnapshotCacheService {
    cache_dir: PathBuf,
}

impl SnapshotCacheService {
    /// Snapshot directory under `~/.fieldmetrics/cache`
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| FieldMetricsError::Cache("Cannot determine home directory".into()))?;
        let cache_dir = base_dirs.home_dir().join(".fieldmetrics").join("cache");
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// `source` is a [`RecordSource::cache_key`](crate::sources::RecordSource::cache_key)
    pub fn snapshot_path(&self, source: &str) -> PathBuf {
        self.cache_dir.join(format!("{}_snapshot.json", source))
    }

    /// Load the snapshot for `source`.
    /// Uses shared file lock for concurrent read safety.
    pub fn load(&self, source: &str) -> (Option<RecordSnapshot>, Option<CacheWarning>) {
        let path = self.snapshot_path(source);
        if !path.exists() {
            return (None, None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                return (
                    None,
                    Some(CacheWarning::LoadFailed(format!(
                        "Failed to open snapshot: {}",
                        e
                    ))),
                );
            }
        };

        if let Err(e) = file.lock_shared() {
            return (
                None,
                Some(CacheWarning::LoadFailed(format!(
                    "Failed to acquire read lock: {}",
                    e
                ))),
            );
        }

        let mut content = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut content) {
            let _ = file.unlock();
            return (
                None,
                Some(CacheWarning::LoadFailed(format!(
                    "Failed to read snapshot: {}",
                    e
                ))),
            );
        }
        let _ = file.unlock();

        match serde_json::from_str::<RecordSnapshot>(&content) {
            Ok(snapshot) => {
                debug!(
                    source,
                    records = snapshot.records.len(),
                    "loaded record snapshot"
                );
                (Some(snapshot), None)
            }
            Err(e) => (
                None,
                Some(CacheWarning::Corrupted(format!(
                    "Corrupted snapshot file: {}",
                    e
                ))),
            ),
        }
    }

    /// Replace the snapshot for `source`.
    /// Atomic write (temp file + rename) with exclusive lock.
    pub fn save(&self, source: &str, records: &[InstallationRecord]) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let snapshot = RecordSnapshot {
            source: source.to_string(),
            updated_at: chrono::Utc::now().timestamp(),
            records: records.to_vec(),
        };

        let content = serde_json::to_string(&snapshot)
            .map_err(|e| FieldMetricsError::Cache(format!("Serialization failed: {}", e)))?;

        let path = self.snapshot_path(source);
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path).map_err(|e| {
                FieldMetricsError::Cache(format!("Failed to create temp file: {}", e))
            })?;
            file.write_all(content.as_bytes()).map_err(|e| {
                FieldMetricsError::Cache(format!("Failed to write temp file: {}", e))
            })?;
            file.sync_all().map_err(|e| {
                FieldMetricsError::Cache(format!("Failed to sync temp file: {}", e))
            })?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target.lock_exclusive().map_err(|e| {
            FieldMetricsError::Cache(format!("Failed to acquire write lock: {}", e))
        })?;

        fs::rename(&temp_path, &path)
            .map_err(|e| FieldMetricsError::Cache(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        debug!(source, records = records.len(), "saved record snapshot");
        Ok(())
    }

    pub fn clear(&self, source: &str) -> Result<()> {
        let path = self.snapshot_path(source);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_record(id: &str) -> InstallationRecord {
        InstallationRecord {
            id: id.to_string(),
            date: "2025-03-01".to_string(),
            month: "MARZO".to_string(),
            advisor: "ANA".to_string(),
            technician_1: Some("PEDRO".to_string()),
            power_go: true,
            ..Default::default()
        }
    }

    fn create_test_service() -> (SnapshotCacheService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SnapshotCacheService::with_cache_dir(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[test]
    fn test_missing_snapshot() {
        let (service, _temp) = create_test_service();
        let (snapshot, warning) = service.load("rest");
        assert!(snapshot.is_none());
        assert!(warning.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (service, _temp) = create_test_service();
        let records = vec![make_record("1"), make_record("2")];

        service.save("rest", &records).unwrap();
        let (snapshot, warning) = service.load("rest");

        assert!(warning.is_none());
        let snapshot = snapshot.unwrap();
        assert_eq!(snapshot.source, "rest");
        assert_eq!(snapshot.records, records);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let (service, _temp) = create_test_service();
        service.save("rest", &[make_record("old")]).unwrap();
        service.save("rest", &[make_record("new")]).unwrap();

        let (snapshot, _) = service.load("rest");
        let ids: Vec<String> = snapshot.unwrap().records.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["new".to_string()]);
    }

    #[test]
    fn test_corrupted_snapshot_warns() {
        let (service, _temp) = create_test_service();
        let path = service.snapshot_path("rest");
        fs::write(&path, "not valid json {{{").unwrap();

        let (snapshot, warning) = service.load("rest");

        assert!(snapshot.is_none());
        assert!(matches!(warning, Some(CacheWarning::Corrupted(_))));
    }

    #[test]
    fn test_snapshot_path_format() {
        let (service, temp) = create_test_service();
        assert_eq!(
            service.snapshot_path("files"),
            temp.path().join("files_snapshot.json")
        );
    }

    #[test]
    fn test_source_isolation() {
        let (service, _temp) = create_test_service();
        service.save("rest", &[make_record("r")]).unwrap();
        service.save("files", &[make_record("f1"), make_record("f2")]).unwrap();

        assert_eq!(service.load("rest").0.unwrap().records.len(), 1);
        assert_eq!(service.load("files").0.unwrap().records.len(), 2);
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let (service, _temp) = create_test_service();
        service.save("rest", &[make_record("1")]).unwrap();
        assert!(service.snapshot_path("rest").exists());

        service.clear("rest").unwrap();

        assert!(!service.snapshot_path("rest").exists());
        assert!(service.load("rest").0.is_none());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (service, _temp) = create_test_service();
        service.save("rest", &[make_record("1")]).unwrap();
        assert!(!service
            .snapshot_path("rest")
            .with_extension("json.tmp")
            .exists());
    }
}
