//! Type definitions for fieldmetrics

mod error;
mod month;
mod record;
mod summary;

pub use error::*;
pub use month::Month;
pub use record::*;
pub use summary::*;

/// Snapshot loading warning types
#[derive(Debug, Clone, PartialEq)]
pub enum CacheWarning {
    /// Failed to open or read snapshot file
    LoadFailed(String),
    /// Snapshot file was corrupted (invalid JSON)
    Corrupted(String),
}

impl std::fmt::Display for CacheWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheWarning::LoadFailed(msg) | CacheWarning::Corrupted(msg) => f.write_str(msg),
        }
    }
}
