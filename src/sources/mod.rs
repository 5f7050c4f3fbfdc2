//! Record sources: where installation records are retrieved from

mod file;
mod placeholder;
mod rest;

pub use file::FileSource;
pub use placeholder::PlaceholderSource;
pub use rest::RestSource;

use crate::config::{SourceConfig, SourceKind};
use crate::types::{InstallationRecord, Result};
use std::collections::HashSet;

/// Trait for retrieving the full installation record set
pub trait RecordSource: Send + Sync {
    /// Source kind name (e.g., "files")
    fn name(&self) -> &str;

    /// Filename-safe identity of this particular source; keys the snapshot
    /// cache, so two globs or two tables never share a snapshot
    fn cache_key(&self) -> String {
        self.name().to_string()
    }

    /// Retrieve every record the source holds
    fn fetch_all(&self) -> Result<Vec<InstallationRecord>>;

    /// Whether successful fetches are worth keeping as a snapshot
    fn cacheable(&self) -> bool {
        true
    }
}

/// Build the configured source. `input_override` (a file glob) wins over the
/// configured kind.
pub fn from_config(
    config: &SourceConfig,
    input_override: Option<&str>,
) -> Result<Box<dyn RecordSource>> {
    if let Some(pattern) = input_override {
        return Ok(Box::new(FileSource::new(pattern)));
    }
    Ok(match config.kind {
        SourceKind::Files => Box::new(FileSource::new(&config.glob)),
        SourceKind::Rest => Box::new(RestSource::from_config(config)?),
        SourceKind::Placeholder => Box::new(PlaceholderSource),
    })
}

/// `{kind}-{slug}-{hash}` for a source location such as a glob or URL.
///
/// The slug keeps the key readable; the FNV-1a hash of the full location
/// keeps it unique once the slug is truncated or two locations slug alike.
pub fn snapshot_key(kind: &str, location: &str) -> String {
    const MAX_SLUG: usize = 48;

    let slug: String = location
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let slug: String = slug.chars().take(MAX_SLUG).collect();

    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in location.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }

    format!("{}-{}-{:016x}", kind, slug, hash)
}

/// Drop records whose id was already seen; first occurrence wins.
/// Records without an id are always kept.
pub fn dedup_by_id(records: Vec<InstallationRecord>) -> Vec<InstallationRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped: Vec<InstallationRecord> = Vec::with_capacity(records.len());

    for record in records {
        let id = record.id.trim();
        if id.is_empty() || seen.insert(id.to_string()) {
            deduped.push(record);
        }
    }

    deduped
}
