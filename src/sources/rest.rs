//! REST table endpoint (PostgREST-style `limit`/`offset` paging)

use std::time::Duration;
use tracing::debug;

use super::{dedup_by_id, snapshot_key, RecordSource};
use crate::config::SourceConfig;
use crate::types::{FieldMetricsError, InstallationRecord, Result};

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches the record table page by page.
///
/// Pages are requested sequentially. The server may cap a page below
/// `page_size` (PostgREST `max-rows`), so the offset advances by the rows
/// actually received and only an empty page ends the scan.
pub struct RestSource {
    base_url: String,
    table: String,
    api_key: Option<String>,
    page_size: usize,
    timeout: Duration,
}

impl RestSource {
    pub fn new(base_url: &str, table: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from `[source]`; the API key is read from `api_key_env`.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            FieldMetricsError::Config("source.base_url is required for rest sources".into())
        })?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            debug!(env = %config.api_key_env, "no API key set, requesting anonymously");
        }
        Ok(Self::new(base_url, &config.table)
            .with_api_key(api_key)
            .with_page_size(config.page_size)
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    /// URL of the page starting at `offset`
    pub fn page_url(&self, offset: usize) -> String {
        format!(
            "{}/rest/v1/{}?select=*&order=fecha.asc&limit={}&offset={}",
            self.base_url, self.table, self.page_size, offset
        )
    }

    fn fetch_page(
        &self,
        client: &reqwest::blocking::Client,
        offset: usize,
    ) -> Result<Vec<InstallationRecord>> {
        let mut request = client.get(self.page_url(offset));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| FieldMetricsError::Source(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FieldMetricsError::Source(format!(
                "HTTP {} fetching {}",
                status, self.table
            )));
        }

        response
            .json()
            .map_err(|e| FieldMetricsError::Parse(format!("JSON parse error: {}", e)))
    }
}

impl RecordSource for RestSource {
    fn name(&self) -> &str {
        "rest"
    }

    fn cache_key(&self) -> String {
        snapshot_key(self.name(), &format!("{}/{}", self.base_url, self.table))
    }

    fn fetch_all(&self) -> Result<Vec<InstallationRecord>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FieldMetricsError::Source(format!("HTTP client error: {}", e)))?;

        let records = collect_pages(|offset| {
            let page = self.fetch_page(&client, offset)?;
            debug!(table = %self.table, offset, fetched = page.len(), "fetched page");
            Ok(page)
        })?;

        Ok(dedup_by_id(records))
    }
}

/// Request pages from offset 0 until one comes back empty
fn collect_pages<T>(mut fetch_page: impl FnMut(usize) -> Result<Vec<T>>) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    loop {
        let page = fetch_page(rows.len())?;
        if page.is_empty() {
            return Ok(rows);
        }
        rows.extend(page);
    }
}
