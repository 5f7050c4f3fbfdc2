//! Record loading service for CLI and library callers
//!
//! Retrieval never fails from the caller's point of view: when the
//! configured source cannot deliver, the loader falls back to the last good
//! snapshot and then to the placeholder dataset, so the aggregator always
//! receives a well-formed record set.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::services::placeholder::placeholder_records;
use crate::services::SnapshotCacheService;
use crate::sources::{self, RecordSource};
use crate::types::{InstallationRecord, Result};

/// Where the records of a [`LoadResult`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Freshly fetched from the configured source
    Live,
    /// Last good fetch, read from the snapshot cache
    Snapshot,
    /// Built-in synthetic dataset
    Placeholder,
}

/// Result of loading records
#[derive(Debug)]
pub struct LoadResult {
    pub records: Vec<InstallationRecord>,
    pub provenance: Provenance,
    /// Name of the configured source
    pub source: String,
    /// Why the live source was not used (if it wasn't)
    pub warning: Option<String>,
}

/// Loading strategy:
/// - Live: fetch from source, refresh the snapshot
/// - Snapshot: last good fetch for this source
/// - Placeholder: synthetic dataset of the same shape
pub struct DataLoaderService {
    source: Box<dyn RecordSource>,
    cache_service: Option<SnapshotCacheService>,
}

impl DataLoaderService {
    pub fn new(source: Box<dyn RecordSource>, cache_service: Option<SnapshotCacheService>) -> Self {
        Self {
            source,
            cache_service,
        }
    }

    /// Build source and snapshot cache from configuration
    pub fn from_config(config: &Config, input_override: Option<&str>) -> Result<Self> {
        let source = sources::from_config(&config.source, input_override)?;
        let cache_service = if config.cache.enabled {
            match &config.cache.dir {
                Some(dir) => Some(SnapshotCacheService::with_cache_dir(dir.clone())),
                None => match SnapshotCacheService::new() {
                    Ok(cs) => Some(cs),
                    Err(e) => {
                        warn!("Snapshot cache unavailable: {}", e);
                        None
                    }
                },
            }
        } else {
            None
        };
        Ok(Self::new(source, cache_service))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Load records: live → snapshot → placeholder
    pub fn load(&self) -> LoadResult {
        let name = self.source.name().to_string();
        let key = self.source.cache_key();

        let failure = match self.source.fetch_all() {
            Ok(records) if !records.is_empty() => {
                info!(source = %name, records = records.len(), "loaded records");
                self.save_snapshot(&key, &records);
                return LoadResult {
                    records,
                    provenance: Provenance::Live,
                    source: name,
                    warning: None,
                };
            }
            Ok(_) => format!("{} returned no records", name),
            Err(e) => format!("{} failed: {}", name, e),
        };
        warn!("{}", failure);

        if let Some(records) = self.load_snapshot(&key) {
            info!(source = %name, records = records.len(), "using record snapshot");
            return LoadResult {
                records,
                provenance: Provenance::Snapshot,
                source: name,
                warning: Some(format!("{}; showing last saved snapshot", failure)),
            };
        }

        info!("using placeholder records");
        LoadResult {
            records: placeholder_records(),
            provenance: Provenance::Placeholder,
            source: name,
            warning: Some(format!("{}; showing placeholder data", failure)),
        }
    }

    fn save_snapshot(&self, key: &str, records: &[InstallationRecord]) {
        if !self.source.cacheable() {
            return;
        }
        if let Some(cs) = &self.cache_service {
            if let Err(e) = cs.save(key, records) {
                warn!("Failed to save snapshot {}: {}", key, e);
            }
        }
    }

    fn load_snapshot(&self, key: &str) -> Option<Vec<InstallationRecord>> {
        let cs = self.cache_service.as_ref()?;
        let (snapshot, warning) = cs.load(key);
        if let Some(w) = warning {
            warn!("Snapshot {} unusable: {}", key, w);
        }
        snapshot
            .map(|s| s.records)
            .filter(|records| !records.is_empty())
    }
}
