//! Per-document memo of segmentation results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::items::DefinitionItem;

struct Entry {
    items: Arc<[DefinitionItem]>,
    last_access: Instant,
}

/// Segmentation results keyed by `uri#version`.
///
/// Entries expire once they have not been read for the idle window. Two
/// callers missing on the same key may both compute; the later insert wins
/// and both results are equal.
pub struct ItemCache {
    entries: DashMap<String, Entry>,
    idle_millis: AtomicU64,
}

impl ItemCache {
    pub const DEFAULT_IDLE: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            idle_millis: AtomicU64::new(duration_millis(idle)),
        }
    }

    #[must_use]
    pub fn key(uri: &str, version: i32) -> String {
        format!("{uri}#{version}")
    }

    #[must_use]
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_millis.load(Ordering::Relaxed))
    }

    pub fn set_idle(&self, idle: Duration) {
        self.idle_millis
            .store(duration_millis(idle), Ordering::Relaxed);
    }

    pub fn get_or_compute<F>(&self, uri: &str, version: i32, compute: F) -> Arc<[DefinitionItem]>
    where
        F: FnOnce() -> Vec<DefinitionItem>,
    {
        let key = Self::key(uri, version);
        let now = Instant::now();
        let idle = self.idle();
        if let Some(mut entry) = self.entries.get_mut(&key)
            && now.duration_since(entry.last_access) < idle
        {
            entry.last_access = now;
            tracing::debug!(key, "item cache hit");
            return Arc::clone(&entry.items);
        }

        self.evict_expired(now);
        tracing::debug!(key, "item cache miss");
        let items: Arc<[DefinitionItem]> = compute().into();
        self.entries.insert(
            key,
            Entry {
                items: Arc::clone(&items),
                last_access: Instant::now(),
            },
        );
        items
    }

    /// Drop entries idle for longer than the window, as of `now`.
    pub fn evict_expired(&self, now: Instant) {
        let idle = self.idle();
        self.entries
            .retain(|_, entry| now.duration_since(entry.last_access) < idle);
    }

    /// Drop every version of `uri`.
    pub fn invalidate(&self, uri: &str) {
        let prefix = format!("{uri}#");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_IDLE)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
