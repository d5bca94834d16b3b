// src/cache/mod.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::process::RawRow;

pub mod store;

pub use store::{FileStorage, MemoryStorage, Storage};

/// Five minutes.
pub const DEFAULT_TTL_MS: i64 = 5 * 60 * 1000;

/// Persisted shape: `{"ts": <epoch millis>, "data": [row, ...]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    pub ts: i64,
    pub data: Vec<RawRow>,
}

/// Storage key for a sheet's rows.
pub fn cache_key(sheet_key: &str) -> String {
    format!("csv:{}", sheet_key)
}

/// Time-boxed cache of parsed rows. Never returns an error: every storage or
/// decoding problem is a miss on read and a no-op on write.
pub struct CsvCache {
    storage: Box<dyn Storage>,
    ttl_ms: i64,
}

impl CsvCache {
    pub fn new(storage: Box<dyn Storage>, ttl_ms: i64) -> Self {
        Self { storage, ttl_ms }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()), DEFAULT_TTL_MS)
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    pub fn get(&self, key: &str) -> Option<Vec<RawRow>> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    pub fn set(&self, key: &str, rows: &[RawRow]) {
        self.set_at(key, rows, Utc::now().timestamp_millis())
    }

    /// Rows stored under `key` unless older than the TTL at `now_ms`.
    pub fn get_at(&self, key: &str, now_ms: i64) -> Option<Vec<RawRow>> {
        let raw = match self.storage.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "corrupt cache entry; treating as miss");
                return None;
            }
        };
        // a nonsense timestamp can overflow the age; that is a miss too
        match now_ms.checked_sub(entry.ts) {
            Some(age) if age <= self.ttl_ms => {
                debug!(key, rows = entry.data.len(), "cache hit");
                Some(entry.data)
            }
            Some(age) => {
                debug!(key, age_ms = age, "cache entry expired");
                None
            }
            None => {
                warn!(key, ts = entry.ts, "cache timestamp out of range; treating as miss");
                None
            }
        }
    }

    pub fn set_at(&self, key: &str, rows: &[RawRow], now_ms: i64) {
        let entry = CacheEntry {
            ts: now_ms,
            data: rows.to_vec(),
        };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "could not encode cache entry");
                return;
            }
        };
        if let Err(e) = self.storage.write(key, &json) {
            warn!(key, error = %e, "cache write failed; ignoring");
        }
    }
}
