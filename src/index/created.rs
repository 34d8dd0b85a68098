//! The created-day index: calendar day to the bucket of files created that
//! day. Built once by full scan, then patched incrementally from vault
//! events. A two-state machine keeps events safe during rebuilds: in `Ready`
//! mutations apply immediately; while `Rebuilding` they queue, and the queue
//! is drained exactly once against the fresh map when the build commits.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::config::VaultConventions;
use crate::core::bucket::CreatedDayBucket;
use crate::core::date_key::{date_key, day_of_millis};
use crate::error::IndexError;
use crate::vault::{FileEvent, FileKind, FileMeta};

/// Files classified per chunk before yielding back to the host's event loop,
/// so large vaults do not starve other work during a full rebuild.
const REBUILD_CHUNK: usize = 250;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Ready,
    Rebuilding { token: u64 },
}

struct Inner {
    buckets: HashMap<String, CreatedDayBucket>,
    mode: Mode,
    pending: Vec<FileEvent>,
    next_token: u64,
    last_error: Option<String>,
}

/// Aggregate view for the host's status display.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IndexStats {
    pub days: usize,
    pub files: usize,
}

pub struct CreatedDayIndexer {
    conventions: VaultConventions,
    inner: Mutex<Inner>,
}

impl CreatedDayIndexer {
    pub fn new(conventions: VaultConventions) -> Self {
        Self {
            conventions,
            inner: Mutex::new(Inner {
                buckets: HashMap::new(),
                mode: Mode::Ready,
                pending: Vec::new(),
                next_token: 0,
                last_error: None,
            }),
        }
    }

    /// Clone of the current day-to-bucket map, for the merger.
    pub fn snapshot(&self) -> HashMap<String, CreatedDayBucket> {
        self.inner.lock().buckets.clone()
    }

    pub fn stats(&self) -> IndexStats {
        let inner = self.inner.lock();
        IndexStats {
            days: inner.buckets.len(),
            files: inner.buckets.values().map(CreatedDayBucket::len).sum(),
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Apply one vault event: immediately when `Ready`, queued for replay
    /// when a rebuild is in flight. Events are never dropped to a race.
    pub fn apply_event(&self, event: FileEvent) {
        let mut inner = self.inner.lock();
        match inner.mode {
            Mode::Ready => apply_to(&mut inner.buckets, &self.conventions, &event),
            Mode::Rebuilding { .. } => inner.pending.push(event),
        }
    }

    /// Full rebuild from an enumeration of every vault file. Processes in
    /// bounded chunks with a yield between them; a rebuild started after this
    /// one invalidates it, and the stale build returns `Superseded` without
    /// touching the map.
    pub async fn rebuild(&self, files: Vec<FileMeta>) -> Result<(), IndexError> {
        let token = {
            let mut inner = self.inner.lock();
            inner.next_token += 1;
            let token = inner.next_token;
            inner.mode = Mode::Rebuilding { token };
            inner.last_error = None;
            token
        };

        let mut map: HashMap<String, CreatedDayBucket> = HashMap::new();
        for chunk in files.chunks(REBUILD_CHUNK) {
            if !self.is_current(token) {
                log::debug!("created-day rebuild {token} superseded mid-build");
                return Err(IndexError::Superseded);
            }
            for file in chunk {
                classify_into(&mut map, &self.conventions, file);
            }
            tokio::task::yield_now().await;
        }

        let mut inner = self.inner.lock();
        if inner.mode != (Mode::Rebuilding { token }) {
            log::debug!("created-day rebuild {token} superseded before commit");
            return Err(IndexError::Superseded);
        }
        inner.buckets = map;
        inner.mode = Mode::Ready;
        let pending = std::mem::take(&mut inner.pending);
        for event in &pending {
            apply_to(&mut inner.buckets, &self.conventions, event);
        }
        log::info!(
            "created-day index rebuilt: {} days, {} queued events replayed",
            inner.buckets.len(),
            pending.len()
        );
        Ok(())
    }

    /// Record a build-boundary failure: the index falls back to empty rather
    /// than keeping a half-built or stale map.
    pub fn reset_with_error(&self, message: String) {
        let mut inner = self.inner.lock();
        log::warn!("created-day index reset: {message}");
        inner.buckets.clear();
        inner.pending.clear();
        inner.mode = Mode::Ready;
        inner.last_error = Some(message);
    }

    fn is_current(&self, token: u64) -> bool {
        self.inner.lock().mode == (Mode::Rebuilding { token })
    }
}

fn classify_into(
    map: &mut HashMap<String, CreatedDayBucket>,
    conventions: &VaultConventions,
    file: &FileMeta,
) {
    if conventions.is_excluded(&file.path) {
        return;
    }
    // Files without a usable creation timestamp cannot be bucketed.
    let Some(created) = file.created else { return };
    let Some(day) = day_of_millis(created) else {
        return;
    };
    let kind = if conventions.is_note(&file.path) {
        FileKind::Note
    } else {
        FileKind::Other
    };
    map.entry(date_key(day)).or_default().insert(&file.path, kind);
}

fn apply_to(
    map: &mut HashMap<String, CreatedDayBucket>,
    conventions: &VaultConventions,
    event: &FileEvent,
) {
    match event {
        FileEvent::Created(file) => classify_into(map, conventions, file),
        FileEvent::Deleted { path, created } => remove_path(map, path, *created),
        FileEvent::Renamed {
            file,
            old_path,
            old_created,
        } => {
            remove_path(map, old_path, *old_created);
            // Guard against a stale duplicate already filed under the new
            // path before re-adding.
            remove_path(map, &file.path, file.created);
            classify_into(map, conventions, file);
        }
    }
}

/// Remove `path` from the index. With a known creation time the removal is a
/// single bucket lookup; without one every bucket is scanned, a rare fallback
/// for hosts that lose metadata on delete. Emptied buckets are dropped, not
/// kept empty.
fn remove_path(map: &mut HashMap<String, CreatedDayBucket>, path: &str, created: Option<i64>) {
    if let Some(day) = created.and_then(day_of_millis) {
        let key = date_key(day);
        if let Some(bucket) = map.get_mut(&key) {
            bucket.remove(path);
            if bucket.is_empty() {
                map.remove(&key);
            }
        }
        return;
    }
    map.retain(|_, bucket| {
        bucket.remove(path);
        !bucket.is_empty()
    });
}
