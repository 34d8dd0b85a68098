//! Bounded cache of per-file content metrics. Counting words is the one
//! expensive step of daily-note qualification, so results are cached by path,
//! invalidated by modification time, and concurrent requests for the same
//! unchanged file share a single in-flight read.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use parking_lot::Mutex;

use crate::vault::ContentReader;

/// Word and open-task counts for one file, computed in a single pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ContentMetrics {
    pub words: usize,
    pub open_tasks: usize,
}

#[derive(Clone, Copy)]
struct CacheEntry {
    modified: i64,
    metrics: ContentMetrics,
}

type InFlight = Shared<BoxFuture<'static, ContentMetrics>>;

pub struct WordCountCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    // Keyed by (path, modified): sharing is scoped to one version of one
    // file, so a read of a newer version never joins a parked older read.
    in_flight: Mutex<HashMap<(String, i64), InFlight>>,
}

impl WordCountCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Metrics for `path` at modification time `modified`. A cached entry
    /// with a different modification time is treated as stale and recomputed.
    /// Read failures count as zero words and zero tasks.
    pub async fn metrics<R: ContentReader + ?Sized>(
        &self,
        reader: &R,
        path: &str,
        modified: i64,
    ) -> ContentMetrics {
        if let Some(hit) = self.lookup(path, modified) {
            return hit;
        }

        let key = (path.to_string(), modified);
        let fut = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&key) {
                existing.clone()
            } else {
                let read = reader.read_content(path);
                let owned = path.to_string();
                let fut: BoxFuture<'static, ContentMetrics> = async move {
                    match read.await {
                        Ok(text) => count_metrics(&text),
                        Err(e) => {
                            log::debug!("content read failed for {owned}: {e}");
                            ContentMetrics::default()
                        }
                    }
                }
                .boxed();
                let shared = fut.shared();
                in_flight.insert(key.clone(), shared.clone());
                shared
            }
        };

        let metrics = fut.await;
        self.in_flight.lock().remove(&key);
        let mut entries = self.entries.lock();
        // A read of a newer version may have landed while this one was in
        // flight; never let an older completion shadow it.
        let newer_cached = entries.peek(path).is_some_and(|e| e.modified > modified);
        if !newer_cached {
            entries.put(key.0, CacheEntry { modified, metrics });
        }
        metrics
    }

    fn lookup(&self, path: &str, modified: i64) -> Option<ContentMetrics> {
        let mut entries = self.entries.lock();
        match entries.get(path) {
            Some(entry) if entry.modified == modified => Some(entry.metrics),
            Some(_) => {
                // Stale: the file changed since this entry was cached.
                entries.pop(path);
                None
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Count whitespace-separated words and unchecked task boxes.
fn count_metrics(text: &str) -> ContentMetrics {
    let words = text.split_whitespace().count();
    let open_tasks = text
        .lines()
        .filter(|line| {
            let t = line.trim_start();
            t.starts_with("- [ ]") || t.starts_with("* [ ]")
        })
        .count();
    ContentMetrics { words, open_tasks }
}
