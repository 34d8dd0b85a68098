use chrono::NaiveDate;

use super::date_key::parse_date_key;
use crate::vault::{ContentReader, FileMeta};
use crate::wordcount::WordCountCache;

/// One file recognized as the daily note for a calendar day. Rebuilt from the
/// host's daily-note index on every recompute, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyNoteCandidate {
    pub date: NaiveDate,
    pub date_key: String,
    pub file_path: String,
    pub modified: i64,
    /// Whether the note passes the configured content-length threshold.
    pub qualifies: bool,
}

/// Build candidates from the host's daily-note index entries.
///
/// Entries whose key does not parse as a calendar day are skipped; a single
/// malformed entry must not abort the build. A threshold of zero or less
/// qualifies every note without touching file content. Duplicate days are
/// allowed here; the merger keeps the most recently modified one.
pub async fn build_candidates<R: ContentReader + ?Sized>(
    entries: &[(String, FileMeta)],
    min_word_count: i64,
    cache: &WordCountCache,
    reader: &R,
) -> Vec<DailyNoteCandidate> {
    let mut candidates = Vec::with_capacity(entries.len());
    for (key, file) in entries {
        let Some(date) = parse_date_key(key) else {
            log::debug!("skipping daily-note entry with unparseable key {key:?}");
            continue;
        };
        let qualifies = if min_word_count <= 0 {
            true
        } else {
            let metrics = cache.metrics(reader, &file.path, file.modified).await;
            metrics.words as i64 >= min_word_count
        };
        candidates.push(DailyNoteCandidate {
            date,
            date_key: key.clone(),
            file_path: file.path.clone(),
            modified: file.modified,
            qualifies,
        });
    }
    candidates
}
