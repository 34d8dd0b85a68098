//! Persisted open/closed UI state and its reconciliation against a freshly
//! computed list. Keys are stable identities (group ids and date keys), so
//! the state survives recomputes, locale changes, and re-labeling;
//! entries for entities that no longer exist are pruned on every pass.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GroupingPreset;
use crate::core::date_key::parse_date_key;
use crate::core::group::{ListGroupNode, group_id_path};
use crate::core::list_item::ListItem;

/// Defensive cap per persisted map; anything larger is discarded wholesale on
/// load rather than truncated arbitrarily.
const MAX_MAP_ENTRIES: usize = 4096;

const MAX_DISPLAYED_MONTH_LEN: usize = 32;

/// Sub-sections of an expanded day row that carry their own toggle.
pub const DAY_CHILD_SECTIONS: [&str; 2] = ["notes", "files"];

/// The open-state key for one sub-section of one day row.
pub fn day_child_key(date_key: &str, section: &str) -> String {
    format!("{date_key}:{section}")
}

/// Everything the host persists for the list pane. Group entries keep
/// explicit true and false; the day-level maps keep only `true` entries to
/// stay compact (absence means collapsed, the default).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ListViewState {
    pub group_open: HashMap<String, bool>,
    pub day_open: HashMap<String, bool>,
    pub day_child_open: HashMap<String, bool>,
    pub displayed_month: Option<String>,
    pub list_pane_visible: bool,
}

impl ListViewState {
    pub fn is_group_open(&self, id: &str) -> bool {
        self.group_open.get(id).copied().unwrap_or(false)
    }

    pub fn is_day_open(&self, date_key: &str) -> bool {
        self.day_open.get(date_key).copied().unwrap_or(false)
    }

    pub fn is_day_child_open(&self, date_key: &str, section: &str) -> bool {
        self.day_child_open
            .get(&day_child_key(date_key, section))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_group_open(&mut self, id: &str, open: bool) {
        self.group_open.insert(id.to_string(), open);
    }

    pub fn set_day_open(&mut self, date_key: &str, open: bool) {
        if open {
            self.day_open.insert(date_key.to_string(), true);
        } else {
            self.day_open.remove(date_key);
        }
    }

    pub fn set_day_child_open(&mut self, date_key: &str, section: &str, open: bool) {
        let key = day_child_key(date_key, section);
        if open {
            self.day_child_open.insert(key, true);
        } else {
            self.day_child_open.remove(&key);
        }
    }
}

/// Rebuild the state from an untrusted persisted value. Malformed entries are
/// skipped rather than failing the load: non-boolean leaves, day keys that do
/// not parse, and maps beyond the defensive cap all degrade to defaults.
pub fn sanitize(value: &Value) -> ListViewState {
    let mut state = ListViewState::default();
    let Some(obj) = value.as_object() else {
        return state;
    };

    state.group_open = bool_map(obj.get("group_open"), |_| true);
    state.day_open = bool_map(obj.get("day_open"), |k| parse_date_key(k).is_some());
    state.day_child_open = bool_map(obj.get("day_child_open"), |k| {
        k.split_once(':').is_some_and(|(day, section)| {
            parse_date_key(day).is_some() && DAY_CHILD_SECTIONS.contains(&section)
        })
    });
    // Day-level maps are compacted to explicit-true on every save.
    state.day_open.retain(|_, v| *v);
    state.day_child_open.retain(|_, v| *v);

    if let Some(month) = obj.get("displayed_month").and_then(Value::as_str) {
        if month.len() <= MAX_DISPLAYED_MONTH_LEN {
            state.displayed_month = Some(month.to_string());
        }
    }
    state.list_pane_visible = obj
        .get("list_pane_visible")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    state
}

fn bool_map(value: Option<&Value>, key_ok: impl Fn(&str) -> bool) -> HashMap<String, bool> {
    let Some(map) = value.and_then(Value::as_object) else {
        return HashMap::new();
    };
    if map.len() > MAX_MAP_ENTRIES {
        log::warn!("persisted open-state map over cap ({} entries), dropping", map.len());
        return HashMap::new();
    }
    map.iter()
        .filter_map(|(k, v)| match v.as_bool() {
            Some(b) if key_ok(k) => Some((k.clone(), b)),
            _ => None,
        })
        .collect()
}

/// Map fresh items and groups onto the persisted state: prune keys whose
/// entity disappeared, keep every surviving explicit choice, and seed new
/// group entries open only along the path containing `today`. Running this
/// twice with unchanged inputs changes nothing.
pub fn reconcile(
    state: &mut ListViewState,
    groups: &[ListGroupNode],
    items: &[ListItem],
    today: NaiveDate,
    preset: GroupingPreset,
) {
    let mut live_groups = HashSet::new();
    collect_ids(groups, &mut live_groups);
    let today_path: HashSet<String> = group_id_path(today, preset).into_iter().collect();

    state.group_open.retain(|id, _| live_groups.contains(id));
    for id in &live_groups {
        if !state.group_open.contains_key(id) {
            state
                .group_open
                .insert(id.clone(), today_path.contains(id));
        }
    }

    let live_days: HashSet<&str> = items.iter().map(|i| i.date_key.as_str()).collect();
    state
        .day_open
        .retain(|key, open| *open && live_days.contains(key.as_str()));
    state.day_child_open.retain(|key, open| {
        *open
            && key
                .split_once(':')
                .is_some_and(|(day, _)| live_days.contains(day))
    });
}

fn collect_ids(nodes: &[ListGroupNode], out: &mut HashSet<String>) {
    for node in nodes {
        out.insert(node.id.clone());
        collect_ids(&node.children, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use chrono::Locale;
    use serde_json::json;

    use crate::config::SortOrder;
    use crate::core::date_key::{date_key, epoch_millis};
    use crate::core::group::build_list_groups;

    fn item(key: &str) -> ListItem {
        let date = parse_date_key(key).unwrap();
        ListItem {
            date,
            date_key: date_key(date),
            epoch_millis: epoch_millis(date),
            year: date.year(),
            daily_note_exists: true,
            file_path: format!("Daily/{key}.md"),
            modified: 0,
            created_notes_count: 0,
            created_files_count: 0,
        }
    }

    fn groups_for(items: &[ListItem], preset: GroupingPreset) -> Vec<ListGroupNode> {
        build_list_groups(items, preset, SortOrder::Descending, Locale::en_US)
    }

    #[test]
    fn seeds_open_along_todays_path_only() {
        let items = [item("2025-12-15"), item("2025-06-01"), item("2024-03-02")];
        let groups = groups_for(&items, GroupingPreset::YearMonth);
        let today = parse_date_key("2025-12-20").unwrap();

        let mut state = ListViewState::default();
        reconcile(&mut state, &groups, &items, today, GroupingPreset::YearMonth);

        assert!(state.is_group_open("2025"));
        assert!(state.is_group_open("2025/12"));
        assert!(!state.is_group_open("2025/06"));
        assert!(!state.is_group_open("2024"));
        assert!(!state.is_group_open("2024/03"));
    }

    #[test]
    fn prunes_dead_keys_and_preserves_choices() {
        let old_items = [item("2025-12-15"), item("2024-03-02")];
        let old_groups = groups_for(&old_items, GroupingPreset::Year);
        let today = parse_date_key("2025-12-20").unwrap();

        let mut state = ListViewState::default();
        reconcile(&mut state, &old_groups, &old_items, today, GroupingPreset::Year);
        state.set_group_open("2024", true);
        state.set_day_open("2025-12-15", true);
        state.set_day_child_open("2024-03-02", "notes", true);

        // 2024 disappears from the next computation.
        let new_items = [item("2025-12-15")];
        let new_groups = groups_for(&new_items, GroupingPreset::Year);
        reconcile(&mut state, &new_groups, &new_items, today, GroupingPreset::Year);

        assert!(!state.group_open.contains_key("2024"));
        assert!(!state.day_child_open.contains_key("2024-03-02:notes"));
        assert!(state.is_day_open("2025-12-15"), "surviving choice kept");
        assert!(state.is_group_open("2025"), "seeded value kept");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let items = [item("2025-12-15"), item("2025-11-02")];
        let groups = groups_for(&items, GroupingPreset::YearQuarter);
        let today = parse_date_key("2025-12-20").unwrap();

        let mut state = ListViewState::default();
        state.set_day_open("2025-11-02", true);
        reconcile(&mut state, &groups, &items, today, GroupingPreset::YearQuarter);
        let once = state.clone();
        reconcile(&mut state, &groups, &items, today, GroupingPreset::YearQuarter);
        assert_eq!(state, once);
    }

    #[test]
    fn day_maps_keep_only_true_entries() {
        let items = [item("2025-12-15")];
        let groups = groups_for(&items, GroupingPreset::Year);
        let today = items[0].date;

        let mut state = ListViewState::default();
        state.day_open.insert("2025-12-15".into(), false);
        state.day_child_open.insert("2025-12-15:files".into(), false);
        reconcile(&mut state, &groups, &items, today, GroupingPreset::Year);
        assert!(state.day_open.is_empty());
        assert!(state.day_child_open.is_empty());
    }

    #[test]
    fn sanitize_accepts_well_formed_state() {
        let value = json!({
            "group_open": { "2025": true, "2025/12": false },
            "day_open": { "2025-12-15": true },
            "day_child_open": { "2025-12-15:notes": true },
            "displayed_month": "2025-12",
            "list_pane_visible": true,
        });
        let state = sanitize(&value);
        assert!(state.is_group_open("2025"));
        assert!(!state.is_group_open("2025/12"));
        assert!(state.is_day_open("2025-12-15"));
        assert!(state.is_day_child_open("2025-12-15", "notes"));
        assert_eq!(state.displayed_month.as_deref(), Some("2025-12"));
        assert!(state.list_pane_visible);
    }

    #[test]
    fn sanitize_skips_malformed_entries() {
        let value = json!({
            "group_open": { "2025": "yes", "2024": true },
            "day_open": { "not-a-date": true, "2025-12-15": true, "2025-12-14": false },
            "day_child_open": { "2025-12-15:bogus": true, "2025-12-15:files": true },
            "displayed_month": 7,
        });
        let state = sanitize(&value);
        assert_eq!(state.group_open.len(), 1);
        assert_eq!(state.day_open.len(), 1);
        assert!(state.day_open.contains_key("2025-12-15"));
        assert_eq!(state.day_child_open.len(), 1);
        assert!(state.day_child_open.contains_key("2025-12-15:files"));
        assert_eq!(state.displayed_month, None);
    }

    #[test]
    fn sanitize_drops_oversized_maps_and_garbage() {
        let mut huge = serde_json::Map::new();
        for i in 0..5000 {
            huge.insert(format!("group-{i}"), json!(true));
        }
        let value = json!({ "group_open": Value::Object(huge) });
        assert!(sanitize(&value).group_open.is_empty());

        assert_eq!(sanitize(&json!("nonsense")), ListViewState::default());
        assert_eq!(sanitize(&json!(null)), ListViewState::default());
    }
}
