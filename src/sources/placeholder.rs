use super::RecordSource;
use crate::services::placeholder::placeholder_records;
use crate::types::{InstallationRecord, Result};

/// Serves the built-in placeholder dataset (demo deployments)
pub struct PlaceholderSource;

impl RecordSource for PlaceholderSource {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn fetch_all(&self) -> Result<Vec<InstallationRecord>> {
        Ok(placeholder_records())
    }

    fn cacheable(&self) -> bool {
        false
    }
}
