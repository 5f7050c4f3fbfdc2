//! JSON record exports on disk

use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{dedup_by_id, snapshot_key, RecordSource};
use crate::types::{FieldMetricsError, InstallationRecord, Result};

/// Accepted file layouts: a bare array, or an API-style `{"data": [...]}` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    List(Vec<InstallationRecord>),
    Envelope { data: Vec<InstallationRecord> },
}

/// Reads every JSON file matching a glob pattern
pub struct FileSource {
    pattern: String,
}

impl FileSource {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Files matching the pattern, sorted for a stable record order
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = glob::glob(&self.pattern)
            .map(|paths| paths.filter_map(|e| e.ok()).filter(|p| p.is_file()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Parse a single export file
    pub fn parse_file(path: &Path) -> Result<Vec<InstallationRecord>> {
        let mut bytes = fs::read(path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let file: RecordFile = simd_json::from_slice(&mut bytes)
            .map_err(|e| FieldMetricsError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(match file {
            RecordFile::List(records) => records,
            RecordFile::Envelope { data } => data,
        })
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> &str {
        "files"
    }

    fn cache_key(&self) -> String {
        snapshot_key(self.name(), &self.pattern)
    }

    /// Parse all files in parallel using rayon, with deduplication
    fn fetch_all(&self) -> Result<Vec<InstallationRecord>> {
        let files = self.collect_files();
        if files.is_empty() {
            return Err(FieldMetricsError::Source(format!(
                "no files match {}",
                self.pattern
            )));
        }
        debug!(pattern = %self.pattern, files = files.len(), "reading record files");

        let records: Vec<InstallationRecord> = files
            .par_iter()
            .flat_map(|f| match Self::parse_file(f) {
                Ok(records) => records,
                Err(e) => {
                    warn!("Failed to parse {}: {}", f.display(), e);
                    Vec::new()
                }
            })
            .collect();

        Ok(dedup_by_id(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURES: &str = "tests/fixtures/records";

    #[test]
    fn test_parse_array_file() {
        let records = FileSource::parse_file(Path::new("tests/fixtures/records/march.json")).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].advisor, "MARIA TORRES");
        assert!(records[0].has_add_on());
    }

    #[test]
    fn test_parse_envelope_file() {
        let records = FileSource::parse_file(Path::new("tests/fixtures/records/april.json")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].month, "ABRIL");
    }

    #[test]
    fn test_parse_invalid_file_errors() {
        let result = FileSource::parse_file(Path::new("tests/fixtures/broken.json"));
        assert!(matches!(result, Err(FieldMetricsError::Parse(_))));
    }

    #[test]
    fn test_parse_empty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.json");
        fs::write(&path, "\n").unwrap();
        assert!(FileSource::parse_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_all_fixtures_dedups() {
        let source = FileSource::new(format!("{}/*.json", FIXTURES));
        let records = source.fetch_all().unwrap();
        // march.json (4) + april.json (3), one april record repeats a march id
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn test_fetch_all_skips_broken_files() {
        let source = FileSource::new("tests/fixtures/**/*.json");
        let records = source.fetch_all().unwrap();
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn test_fetch_all_no_match_errors() {
        let source = FileSource::new("tests/fixtures/nonexistent/*.json");
        assert!(matches!(source.fetch_all(), Err(FieldMetricsError::Source(_))));
    }

    #[test]
    fn test_collect_files_sorted() {
        let source = FileSource::new(format!("{}/*.json", FIXTURES));
        let files = source.collect_files();
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
    }
}
