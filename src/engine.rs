//! The recompute pipeline. Vault events feed the created-day index, the
//! daily-note index feeds candidates, and each recompute merges both into
//! the snapshot handed to the rendering layer. All mutation happens on the
//! host's cooperative thread; correctness across `await` points rests on
//! generation counters checked at every resumption, so a stale pass
//! abandons its result instead of overwriting a fresher one (last started
//! wins, not last completed).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{Locale, NaiveDate};
use parking_lot::Mutex;

use crate::config::{ListSettings, VaultConventions};
use crate::core::candidate::build_candidates;
use crate::core::group::{ListGroupNode, build_list_groups};
use crate::core::list_item::{ListItem, build_list_items};
use crate::error::{IndexError, RecomputeError};
use crate::index::created::{CreatedDayIndexer, IndexStats};
use crate::vault::{ContentReader, DailyNoteIndex, FileEvent, Vault};
use crate::view_state::{ListViewState, reconcile};
use crate::wordcount::WordCountCache;

/// Quiet period after the last vault event before recomputing, so bulk
/// operations trigger one recompute instead of one per file.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// Word-count entries kept across recomputes.
const WORD_COUNT_CAPACITY: usize = 512;

/// What the consumer renders. `Ready` with no items is the explicit
/// "no qualifying items" state, distinct from loading and from error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListStatus {
    Loading,
    Ready,
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListSnapshot {
    pub status: ListStatus,
    pub items: Vec<ListItem>,
    pub groups: Vec<ListGroupNode>,
}

impl Default for ListSnapshot {
    fn default() -> Self {
        Self {
            status: ListStatus::Loading,
            items: Vec::new(),
            groups: Vec::new(),
        }
    }
}

pub struct ListViewEngine<V, D, R> {
    vault: V,
    daily_notes: D,
    reader: R,
    indexer: CreatedDayIndexer,
    cache: WordCountCache,
    settings: Mutex<ListSettings>,
    view_state: Mutex<ListViewState>,
    snapshot: Mutex<ListSnapshot>,
    locale: Mutex<Locale>,
    recompute_nonce: AtomicU64,
    debounce_nonce: AtomicU64,
}

impl<V, D, R> ListViewEngine<V, D, R>
where
    V: Vault,
    D: DailyNoteIndex,
    R: ContentReader,
{
    pub fn new(
        vault: V,
        daily_notes: D,
        reader: R,
        conventions: VaultConventions,
        settings: ListSettings,
        restored_state: ListViewState,
    ) -> Self {
        Self {
            vault,
            daily_notes,
            reader,
            indexer: CreatedDayIndexer::new(conventions),
            cache: WordCountCache::new(WORD_COUNT_CAPACITY),
            settings: Mutex::new(settings),
            view_state: Mutex::new(restored_state),
            snapshot: Mutex::new(ListSnapshot::default()),
            locale: Mutex::new(Locale::en_US),
            recompute_nonce: AtomicU64::new(0),
            debounce_nonce: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.snapshot.lock().clone()
    }

    pub fn view_state(&self) -> ListViewState {
        self.view_state.lock().clone()
    }

    /// Mutate the view state (open/close toggles flow through here so the
    /// host can persist the result).
    pub fn update_view_state(&self, f: impl FnOnce(&mut ListViewState)) -> ListViewState {
        let mut state = self.view_state.lock();
        f(&mut state);
        state.clone()
    }

    pub fn settings(&self) -> ListSettings {
        self.settings.lock().clone()
    }

    /// Adopt a settings snapshot pushed from the host's settings channel.
    /// The caller follows up with a recompute.
    pub fn update_settings(&self, settings: ListSettings) {
        *self.settings.lock() = settings;
    }

    /// Labels follow the host locale; ids do not, so no state is invalidated.
    pub fn set_locale(&self, locale: Locale) {
        *self.locale.lock() = locale;
    }

    pub fn index_stats(&self) -> IndexStats {
        self.indexer.stats()
    }

    /// Full refresh: enumerate the vault, rebuild the created-day index, then
    /// recompute. Used at startup, on feature re-enable, and on vault
    /// reindex. Enumeration failure empties the index and surfaces a
    /// readable error instead of keeping a stale map.
    pub async fn refresh_all(&self) {
        self.set_status(ListStatus::Loading);
        match self.rebuild_index().await {
            Ok(()) => self.recompute().await,
            // A newer refresh owns the result; nothing to surface.
            Err(IndexError::Superseded) => {}
            Err(e) => self.fail(e.to_string()),
        }
    }

    async fn rebuild_index(&self) -> Result<(), IndexError> {
        let files = self.vault.all_files().map_err(|e| {
            self.indexer.reset_with_error(e.clone());
            IndexError::Enumeration(e)
        })?;
        self.indexer.rebuild(files).await
    }

    /// Recompute the item list and group tree from current inputs.
    pub async fn recompute(&self) {
        self.recompute_at(chrono::Local::now().date_naive()).await;
    }

    pub async fn recompute_at(&self, today: NaiveDate) {
        let nonce = self.recompute_nonce.fetch_add(1, Ordering::SeqCst) + 1;
        match self.compute(nonce).await {
            Ok((items, groups)) => {
                if self.recompute_nonce.load(Ordering::SeqCst) != nonce {
                    log::debug!("recompute {nonce} superseded after compute");
                    return;
                }
                {
                    let preset = self.settings.lock().grouping;
                    let mut state = self.view_state.lock();
                    reconcile(&mut state, &groups, &items, today, preset);
                }
                *self.snapshot.lock() = ListSnapshot {
                    status: ListStatus::Ready,
                    items,
                    groups,
                };
            }
            Err(RecomputeError::Superseded) => {}
            Err(e) => self.fail(e.to_string()),
        }
    }

    async fn compute(
        &self,
        nonce: u64,
    ) -> Result<(Vec<ListItem>, Vec<ListGroupNode>), RecomputeError> {
        let settings = self.settings.lock().clone();
        let locale = *self.locale.lock();

        // An unconfigured daily-notes feature legitimately errors; the list
        // then shows created-day activity alone.
        let entries = match self.daily_notes.entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("daily-note index unavailable, treating as empty: {e}");
                Vec::new()
            }
        };

        let candidates =
            build_candidates(&entries, settings.min_word_count, &self.cache, &self.reader).await;
        if self.recompute_nonce.load(Ordering::SeqCst) != nonce {
            return Err(RecomputeError::Superseded);
        }

        let buckets = self.indexer.snapshot();
        let items = build_list_items(
            candidates,
            &buckets,
            settings.include_created_days,
            settings.sort_order,
        );
        let groups = build_list_groups(&items, settings.grouping, settings.sort_order, locale);
        Ok((items, groups))
    }

    fn set_status(&self, status: ListStatus) {
        self.snapshot.lock().status = status;
    }

    /// A failed pass clears the displayed list and surfaces the message; the
    /// next pass starts from a clean slate.
    fn fail(&self, message: String) {
        log::warn!("list recompute failed: {message}");
        *self.snapshot.lock() = ListSnapshot {
            status: ListStatus::Error(message),
            items: Vec::new(),
            groups: Vec::new(),
        };
    }
}

impl<V, D, R> ListViewEngine<V, D, R>
where
    V: Vault + 'static,
    D: DailyNoteIndex + 'static,
    R: ContentReader + 'static,
{
    /// Entry point for host vault notifications: patch the index now, then
    /// recompute once the burst quiets down.
    pub fn notify_change(self: &Arc<Self>, event: FileEvent) {
        self.indexer.apply_event(event);
        self.schedule_recompute();
    }

    /// Debounced recompute: each call restarts the quiet window, and only
    /// the task belonging to the latest window actually recomputes.
    pub fn schedule_recompute(self: &Arc<Self>) {
        let generation = self.debounce_nonce.fetch_add(1, Ordering::SeqCst) + 1;
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_WINDOW).await;
            if engine.debounce_nonce.load(Ordering::SeqCst) != generation {
                return;
            }
            engine.recompute().await;
        });
    }
}
