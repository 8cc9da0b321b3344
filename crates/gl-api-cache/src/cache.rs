//! In-memory response cache with lazy expiry and optional JSON persistence

use crate::clock::{Clock, SystemClock};
use crate::DEFAULT_TTL;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CACHE_FILE_VERSION: u32 = 1;

/// A single cached payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Opaque payload, usually a JSON response body
    pub payload: String,
    /// When the payload was stored
    pub stored_at: DateTime<Utc>,
    /// Lifetime of the entry in milliseconds
    pub ttl_ms: u64,
}

impl CacheEntry {
    fn new(payload: String, stored_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            payload,
            stored_at,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// An entry is valid iff `now - stored_at < ttl`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = i64::try_from(self.ttl_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.stored_at) < ttl
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// On-disk representation
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

/// Short-lived response cache
///
/// Keys are free-form strings built by the caller from the request
/// parameters, so identical requests share an entry and last write wins.
#[derive(Debug)]
pub struct ResponseCache<C: Clock = SystemClock> {
    entries: HashMap<String, CacheEntry>,
    default_ttl: Duration,
    clock: C,
    path: Option<PathBuf>,
    hits: u64,
    misses: u64,
}

impl Default for ResponseCache<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache<SystemClock> {
    /// Create an empty, memory-only cache using wall-clock time
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, SystemClock)
    }

    /// Open a cache backed by a JSON file
    ///
    /// A missing file starts an empty cache. A corrupt file is logged and
    /// ignored; it is overwritten on the next [`save`](Self::save).
    pub fn open(path: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self::open_with_clock(path, default_ttl, SystemClock)
    }
}

impl<C: Clock> ResponseCache<C> {
    /// Create an empty, memory-only cache with a custom clock
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
            clock,
            path: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Open a file-backed cache with a custom clock
    pub fn open_with_clock(path: impl Into<PathBuf>, default_ttl: Duration, clock: C) -> Self {
        let path = path.into();
        let mut cache = Self::with_clock(default_ttl, clock);

        match read_cache_file(&path) {
            Ok(Some(file)) => {
                let now = cache.clock.now();
                cache.entries = file
                    .entries
                    .into_iter()
                    .filter(|(_, entry)| entry.is_valid_at(now))
                    .collect();
                info!(
                    "Loaded {} cached responses from {:?}",
                    cache.entries.len(),
                    path
                );
            }
            Ok(None) => debug!("No cache file at {:?}, starting empty", path),
            Err(e) => warn!("Ignoring unreadable cache file {:?}: {:#}", path, e),
        }

        cache.path = Some(path);
        cache
    }

    /// TTL used by [`set`](Self::set)
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a payload
    ///
    /// Returns `None` for unknown keys and for expired entries; an expired
    /// entry is removed as a side effect.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now();

        match self.entries.get(key) {
            Some(entry) if entry.is_valid_at(now) => {
                self.hits += 1;
                debug!("Cache HIT for '{}'", key);
                Some(entry.payload.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                debug!("Cache EXPIRED for '{}'", key);
                None
            }
            None => {
                self.misses += 1;
                debug!("Cache MISS for '{}'", key);
                None
            }
        }
    }

    /// Store a payload with the default TTL
    pub fn set(&mut self, key: impl Into<String>, payload: impl Into<String>) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, payload, ttl);
    }

    /// Store a payload with an explicit TTL, replacing any existing entry
    pub fn set_with_ttl(&mut self, key: impl Into<String>, payload: impl Into<String>, ttl: Duration) {
        let entry = CacheEntry::new(payload.into(), self.clock.now(), ttl);
        self.entries.insert(key.into(), entry);
    }

    /// Remove every entry whose key contains `pattern`
    ///
    /// Returns the number of removed entries.
    pub fn invalidate(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        let removed = before - self.entries.len();
        debug!("Invalidated {} cache entries matching '{}'", removed, pattern);
        removed
    }

    /// Drop all expired entries
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid_at(now));
        before - self.entries.len()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the still-valid entries to the backing file
    ///
    /// Does nothing for a memory-only cache.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let now = self.clock.now();
        let file = CacheFile {
            version: CACHE_FILE_VERSION,
            entries: self
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_valid_at(now))
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(&file).context("Failed to serialize cache")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write cache file: {:?}", path))?;

        debug!("Saved {} cache entries to {:?}", file.entries.len(), path);
        Ok(())
    }
}

fn read_cache_file(path: &Path) -> Result<Option<CacheFile>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cache file: {:?}", path))?;
    let file: CacheFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cache file: {:?}", path))?;

    if file.version != CACHE_FILE_VERSION {
        anyhow::bail!("Unsupported cache file version {}", file.version);
    }

    Ok(Some(file))
}
