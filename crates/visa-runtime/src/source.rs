//! Where the extract comes from, and how it is fetched.
//!
//! This is the only place in the dashboard that performs I/O on the extract.

use std::path::PathBuf;
use std::time::Duration;

use visa_core::error::{DashboardError, Result};
use visa_core::models::RawTable;
use visa_data::reader::parse_csv;

const USER_AGENT: &str = concat!("visa-panel/", env!("CARGO_PKG_VERSION"));

/// Configured extract location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// An `http(s)` link to a CSV export.
    Url(String),
    /// A CSV file on disk.
    File(PathBuf),
}

impl DataSource {
    /// Interpret a `--source` value: `http://` / `https://` prefixes are URLs,
    /// anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Short description used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Fetches and parses the extract from a [`DataSource`].
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    source: DataSource,
    http_client: reqwest::Client,
}

impl SourceFetcher {
    /// Build a fetcher whose HTTP requests give up after `timeout`.
    pub fn new(source: DataSource, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::source_unavailable(source.describe(), e))?;

        Ok(Self {
            source,
            http_client,
        })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Fetch the raw text of the extract.
    pub async fn fetch_text(&self) -> Result<String> {
        match &self.source {
            DataSource::Url(url) => self.fetch_url(url).await,
            DataSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| DashboardError::source_unavailable(path.display().to_string(), e)),
        }
    }

    /// Fetch and parse the extract into a [`RawTable`].
    pub async fn fetch_table(&self) -> Result<RawTable> {
        let text = self.fetch_text().await?;
        let table = parse_csv(&text, &self.source.describe())?;
        tracing::debug!(
            source = %self.source.describe(),
            rows = table.len(),
            "fetched extract"
        );
        Ok(table)
    }

    async fn fetch_url(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::source_unavailable(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::source_unavailable(
                url,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| DashboardError::source_unavailable(url, e))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
