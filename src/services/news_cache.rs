use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::news::NewsItem;
use crate::utils::time::Clock;

/// Bumped whenever the shape of cached items changes; older files are ignored.
pub const CACHE_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    data: Option<Vec<NewsItem>>,
    /// Unix seconds of the fetch that produced `data`.
    timestamp: Option<i64>,
}

/// Headlines held in memory with a TTL, mirrored to a JSON file so a restart
/// does not trigger a refetch.
pub struct NewsCache {
    data: Option<Vec<NewsItem>>,
    fetched_at: Option<DateTime<Utc>>,
    ttl: Duration,
    path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl NewsCache {
    pub fn new(path: Option<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: None,
            fetched_at: None,
            ttl,
            path,
            clock,
        }
    }

    pub fn is_valid(&self) -> bool {
        match (&self.data, self.fetched_at) {
            (Some(_), Some(at)) => self.clock.now() - at < self.ttl,
            _ => false,
        }
    }

    /// Cached items, if they are still fresh.
    pub fn get(&self) -> Option<Vec<NewsItem>> {
        if self.is_valid() {
            self.data.clone()
        } else {
            None
        }
    }

    /// Replaces the in-memory state with the file contents and reports
    /// whether they are fresh. A file that cannot be used leaves the cache
    /// untouched.
    pub async fn load_from_file(&mut self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return false,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "failed to read news cache");
                return false;
            }
        };
        let file: CacheFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(error = %e, "news cache file is corrupt");
                return false;
            }
        };
        if file.version != CACHE_VERSION {
            tracing::info!(version = file.version, "ignoring news cache from another version");
            return false;
        }

        self.data = file.data;
        self.fetched_at = file
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());
        self.is_valid()
    }

    /// Stores freshly fetched items, stamped with the current time, and
    /// mirrors them to disk. A failed write is logged; the memory copy stays.
    pub async fn store(&mut self, items: Vec<NewsItem>) {
        let now = self.clock.now();
        self.data = Some(items);
        self.fetched_at = Some(now);

        let Some(path) = &self.path else {
            return;
        };
        let file = CacheFile {
            version: CACHE_VERSION,
            data: self.data.clone(),
            timestamp: Some(now.timestamp()),
        };
        if let Err(e) = write_cache_file(path, &file).await {
            tracing::warn!(error = ?e, path = %path.display(), "failed to write news cache");
        }
    }
}

async fn write_cache_file(path: &Path, file: &CacheFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_string_pretty(file)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}
