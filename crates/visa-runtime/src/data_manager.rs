//! TTL-cached snapshot manager.
//!
//! Wraps fetch + normalize with a configurable time-to-live cache and retry.
//! Every successful refresh publishes a brand-new [`Arc<Snapshot>`]; readers
//! holding an older snapshot keep a complete, consistent table.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use visa_core::error::Result;
use visa_data::normalizer::{normalize, NormalizationReport, NormalizedTable};

use crate::source::SourceFetcher;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Maximum number of fetch attempts per refresh.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// One immutable, normalized copy of the extract.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: NormalizedTable,
    pub report: NormalizationReport,
    /// Description of the source it came from.
    pub source: String,
    pub fetched_at: DateTime<Local>,
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached access to the current [`Snapshot`].
pub struct DataManager {
    fetcher: SourceFetcher,
    cache_ttl: Duration,
    cache: Option<Arc<Snapshot>>,
    cache_timestamp: Option<Instant>,
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(fetcher: SourceFetcher, cache_ttl_secs: u64) -> Self {
        Self {
            fetcher,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the current snapshot, refreshing it when stale or when `force`
    /// is set.
    ///
    /// A failed refresh falls back to the previous snapshot when there is
    /// one (the error is kept in [`last_error`](Self::last_error)); with no
    /// previous snapshot the error is returned.
    pub async fn get_snapshot(&mut self, force: bool) -> Result<Arc<Snapshot>> {
        if !force && self.is_cache_valid() {
            if let Some(snapshot) = &self.cache {
                tracing::debug!("returning cached snapshot");
                return Ok(Arc::clone(snapshot));
            }
        }

        match self.fetch_with_retry().await {
            Ok(snapshot) => {
                tracing::info!(
                    rows = snapshot.table.len(),
                    undated = snapshot.report.undated,
                    source = %snapshot.source,
                    "snapshot refreshed"
                );
                let snapshot = Arc::new(snapshot);
                self.cache = Some(Arc::clone(&snapshot));
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                Ok(snapshot)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                match &self.cache {
                    Some(stale) => {
                        tracing::warn!(error = %e, "refresh failed; keeping previous snapshot");
                        Ok(Arc::clone(stale))
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Drop the cached snapshot so the next call fetches.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the cached snapshot, or `None` when nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Message of the last failed refresh, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Up to [`MAX_RETRY_ATTEMPTS`] attempts, backing off 0, 100 then 200 ms.
    /// Errors that cannot heal on retry (e.g. schema) stop immediately.
    async fn fetch_with_retry(&self) -> Result<Snapshot> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            }

            match self.fetch_fresh().await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    attempt += 1;
                    if !e.is_transient() || attempt >= MAX_RETRY_ATTEMPTS {
                        return Err(e);
                    }
                }
            }
        }
    }

    async fn fetch_fresh(&self) -> Result<Snapshot> {
        let raw = self.fetcher.fetch_table().await?;
        let (table, report) = normalize(&raw)?;
        Ok(Snapshot {
            table,
            report,
            source: self.fetcher.source().describe(),
            fetched_at: Local::now(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
