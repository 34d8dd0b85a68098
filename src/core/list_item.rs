use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{Datelike, NaiveDate};

use super::bucket::CreatedDayBucket;
use super::candidate::DailyNoteCandidate;
use super::date_key::{date_key, epoch_millis, parse_date_key};
use crate::config::SortOrder;

/// The unit rendered as a day row: one per included calendar day, unifying
/// daily-note presence and created-file activity. Recomputed on every
/// refresh, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub date: NaiveDate,
    pub date_key: String,
    pub epoch_millis: i64,
    pub year: i32,
    pub daily_note_exists: bool,
    /// Empty string when no daily note exists. Downstream active-file checks
    /// and title generation test against this sentinel, so it is never
    /// omitted or replaced by an option.
    pub file_path: String,
    pub modified: i64,
    /// Notes created that day, excluding the daily note's own file.
    pub created_notes_count: usize,
    pub created_files_count: usize,
}

impl ListItem {
    fn for_day(date: NaiveDate) -> Self {
        Self {
            date,
            date_key: date_key(date),
            epoch_millis: epoch_millis(date),
            year: date.year(),
            daily_note_exists: false,
            file_path: String::new(),
            modified: 0,
            created_notes_count: 0,
            created_files_count: 0,
        }
    }
}

/// Merge daily-note candidates and created-day buckets into the per-day item
/// list.
///
/// A day is included when its daily note qualifies, or when
/// `include_created_days` is set and the day's bucket still holds something
/// after excluding the daily note's own file. A day whose sole bucket content
/// is its disqualified daily note is excluded entirely rather than given a
/// placeholder with an empty children list.
pub fn build_list_items(
    candidates: Vec<DailyNoteCandidate>,
    buckets: &HashMap<String, CreatedDayBucket>,
    include_created_days: bool,
    sort_order: SortOrder,
) -> Vec<ListItem> {
    // Keep one candidate per day: the most recently modified wins.
    let mut by_day: HashMap<String, DailyNoteCandidate> = HashMap::new();
    for cand in candidates {
        match by_day.entry(cand.date_key.clone()) {
            Entry::Occupied(mut slot) => {
                if cand.modified > slot.get().modified {
                    slot.insert(cand);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(cand);
            }
        }
    }

    let mut items = Vec::with_capacity(by_day.len());

    // Days with a daily-note candidate, qualifying or not.
    for cand in by_day.values() {
        let (notes, files) = match buckets.get(&cand.date_key) {
            Some(bucket) => {
                let mut notes = bucket.notes.len();
                // The day row already represents the daily note itself;
                // subtract at most one match.
                if bucket.notes.iter().any(|p| *p == cand.file_path) {
                    notes -= 1;
                }
                (notes, bucket.files.len())
            }
            None => (0, 0),
        };
        let included = cand.qualifies || (include_created_days && notes + files > 0);
        if !included {
            continue;
        }
        let mut item = ListItem::for_day(cand.date);
        item.daily_note_exists = true;
        item.file_path = cand.file_path.clone();
        item.modified = cand.modified;
        item.created_notes_count = notes;
        item.created_files_count = files;
        items.push(item);
    }

    // Days with created activity but no daily note at all: placeholders.
    if include_created_days {
        for (key, bucket) in buckets {
            if by_day.contains_key(key) || bucket.is_empty() {
                continue;
            }
            let Some(date) = parse_date_key(key) else {
                log::debug!("skipping created-day bucket with unparseable key {key:?}");
                continue;
            };
            let mut item = ListItem::for_day(date);
            item.created_notes_count = bucket.notes.len();
            item.created_files_count = bucket.files.len();
            items.push(item);
        }
    }

    sort_items(&mut items, sort_order);
    items
}

/// Sort items by epoch per the global order. Stable, so re-sorting an already
/// sorted list is an identity.
pub fn sort_items(items: &mut [ListItem], sort_order: SortOrder) {
    match sort_order {
        SortOrder::Ascending => items.sort_by_key(|i| i.epoch_millis),
        SortOrder::Descending => items.sort_by_key(|i| std::cmp::Reverse(i.epoch_millis)),
    }
}
