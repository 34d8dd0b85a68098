use chrono::{Datelike, Locale, NaiveDate};

use super::list_item::{ListItem, sort_items};
use crate::config::{GroupingPreset, SortOrder};

/// A node of the grouping tree. `id` is a stable, locale-independent path
/// built from numeric components ("2025/12"); `label` is the locale-facing
/// text and may change without touching `id`, so persisted open/closed state
/// keyed by `id` survives locale switches. Only leaf nodes hold items.
#[derive(Clone, Debug, PartialEq)]
pub struct ListGroupNode {
    pub id: String,
    pub label: String,
    pub children: Vec<ListGroupNode>,
    pub items: Vec<ListItem>,
    /// Descendant items with a daily note, summed recursively.
    pub daily_note_count: usize,
    /// Max item epoch in the subtree, used for sibling ordering.
    pub most_recent_epoch: i64,
}

impl ListGroupNode {
    fn new(id: String, label: String) -> Self {
        Self {
            id,
            label,
            children: Vec::new(),
            items: Vec::new(),
            daily_note_count: 0,
            most_recent_epoch: i64::MIN,
        }
    }
}

/// One id/label segment of a group path.
struct Segment {
    id_part: String,
    label: String,
}

fn segments(date: NaiveDate, preset: GroupingPreset, locale: Locale) -> Vec<Segment> {
    let year = Segment {
        id_part: date.year().to_string(),
        label: date.year().to_string(),
    };
    match preset {
        GroupingPreset::Flat => Vec::new(),
        GroupingPreset::Year => vec![year],
        GroupingPreset::YearMonth => {
            let month = format!("{:02}", date.month());
            vec![
                year,
                Segment {
                    id_part: month.clone(),
                    label: month,
                },
            ]
        }
        GroupingPreset::YearMonthName => vec![
            year,
            Segment {
                id_part: format!("{:02}", date.month()),
                label: date.format_localized("%B", locale).to_string(),
            },
        ],
        GroupingPreset::YearMonthDashName => vec![
            year,
            Segment {
                id_part: format!("{:02}", date.month()),
                label: format!(
                    "{:02} - {}",
                    date.month(),
                    date.format_localized("%B", locale)
                ),
            },
        ],
        GroupingPreset::YearQuarter => {
            let quarter = date.month0() / 3 + 1;
            vec![
                year,
                Segment {
                    id_part: format!("Q{quarter}"),
                    label: format!("Q{quarter}"),
                },
            ]
        }
        GroupingPreset::YearWeek => {
            let iso = date.iso_week();
            vec![
                Segment {
                    id_part: iso.year().to_string(),
                    label: iso.year().to_string(),
                },
                Segment {
                    id_part: format!("{:02}", iso.week()),
                    label: format!("W{:02}", iso.week()),
                },
            ]
        }
    }
}

/// The cumulative group ids containing `date` under `preset`, outermost
/// first: for `YearQuarter` on 2025-12-15, `["2025", "2025/Q4"]`. Locale has
/// no bearing on the result.
pub fn group_id_path(date: NaiveDate, preset: GroupingPreset) -> Vec<String> {
    let mut ids = Vec::new();
    let mut id = String::new();
    for seg in segments(date, preset, Locale::POSIX) {
        if !id.is_empty() {
            id.push('/');
        }
        id.push_str(&seg.id_part);
        ids.push(id.clone());
    }
    ids
}

/// Organize items into the grouping tree for `preset`. Returns an empty tree
/// for `Flat`, where consumers render the item list directly.
///
/// Siblings and leaf items are ordered by recency per `sort_order`; each
/// node's `daily_note_count` is the recursive sum over its subtree.
pub fn build_list_groups(
    items: &[ListItem],
    preset: GroupingPreset,
    sort_order: SortOrder,
    locale: Locale,
) -> Vec<ListGroupNode> {
    if preset == GroupingPreset::Flat {
        return Vec::new();
    }

    let mut roots: Vec<ListGroupNode> = Vec::new();
    for item in items {
        let segs = segments(item.date, preset, locale);
        let last = segs.len() - 1;
        let mut id = String::new();
        let mut cursor = &mut roots;
        for (depth, seg) in segs.into_iter().enumerate() {
            if !id.is_empty() {
                id.push('/');
            }
            id.push_str(&seg.id_part);

            let level = cursor;
            let pos = match level.iter().position(|n| n.id == id) {
                Some(pos) => {
                    // Node identity is id-keyed; a revisit with a different
                    // label overwrites rather than duplicates.
                    if level[pos].label != seg.label {
                        level[pos].label = seg.label;
                    }
                    pos
                }
                None => {
                    level.push(ListGroupNode::new(id.clone(), seg.label));
                    level.len() - 1
                }
            };
            let node = &mut level[pos];
            node.most_recent_epoch = node.most_recent_epoch.max(item.epoch_millis);
            if depth == last {
                node.items.push(item.clone());
            }
            cursor = &mut node.children;
        }
    }

    finalize(&mut roots, sort_order);
    roots
}

/// Post-order pass: order siblings and leaf items, sum daily-note counts
/// upward without re-scanning leaf items at every level.
fn finalize(nodes: &mut Vec<ListGroupNode>, sort_order: SortOrder) {
    for node in nodes.iter_mut() {
        finalize(&mut node.children, sort_order);
        sort_items(&mut node.items, sort_order);
        node.daily_note_count = node
            .children
            .iter()
            .map(|c| c.daily_note_count)
            .sum::<usize>()
            + node.items.iter().filter(|i| i.daily_note_exists).count();
    }
    match sort_order {
        SortOrder::Ascending => nodes.sort_by_key(|n| n.most_recent_epoch),
        SortOrder::Descending => nodes.sort_by_key(|n| std::cmp::Reverse(n.most_recent_epoch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date_key::{date_key, epoch_millis};

    fn item(key: &str, daily_note: bool) -> ListItem {
        let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").unwrap();
        ListItem {
            date,
            date_key: date_key(date),
            epoch_millis: epoch_millis(date),
            year: date.year(),
            daily_note_exists: daily_note,
            file_path: if daily_note {
                format!("Daily/{key}.md")
            } else {
                String::new()
            },
            modified: 0,
            created_notes_count: 0,
            created_files_count: 0,
        }
    }

    #[test]
    fn quarter_path_ids_and_labels() {
        let items = [item("2025-12-15", true)];
        let groups = build_list_groups(
            &items,
            GroupingPreset::YearQuarter,
            SortOrder::Descending,
            Locale::en_US,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "2025");
        assert_eq!(groups[0].label, "2025");
        assert_eq!(groups[0].children.len(), 1);
        let q = &groups[0].children[0];
        assert_eq!(q.id, "2025/Q4");
        assert_eq!(q.label, "Q4");
        assert_eq!(q.items.len(), 1);

        assert_eq!(
            group_id_path(items[0].date, GroupingPreset::YearQuarter),
            vec!["2025".to_string(), "2025/Q4".to_string()]
        );
    }

    #[test]
    fn year_grouping_ascending_order() {
        let items = [
            item("2025-12-15", true),
            item("2024-12-31", true),
            item("2025-01-01", true),
        ];
        let groups =
            build_list_groups(&items, GroupingPreset::Year, SortOrder::Ascending, Locale::en_US);
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["2024", "2025"]);
        let in_2025: Vec<&str> = groups[1].items.iter().map(|i| i.date_key.as_str()).collect();
        assert_eq!(in_2025, ["2025-01-01", "2025-12-15"]);
    }

    #[test]
    fn sibling_order_follows_most_recent_descendant() {
        // 2024 holds the newest item overall, so it sorts first descending
        // even though 2025 also has items.
        let items = [
            item("2025-03-10", true),
            item("2024-12-31", true),
            item("2024-01-05", true),
            item("2025-01-01", true),
        ];
        let mut newest_2024 = items.to_vec();
        newest_2024.push(item("2026-01-01", true));
        let groups = build_list_groups(
            &newest_2024,
            GroupingPreset::Year,
            SortOrder::Descending,
            Locale::en_US,
        );
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["2026", "2025", "2024"]);
        assert!(groups[1].most_recent_epoch > groups[2].most_recent_epoch);
    }

    #[test]
    fn month_name_label_changes_with_locale_but_id_does_not() {
        let items = [item("2025-12-15", true)];
        let en = build_list_groups(
            &items,
            GroupingPreset::YearMonthName,
            SortOrder::Descending,
            Locale::en_US,
        );
        let fr = build_list_groups(
            &items,
            GroupingPreset::YearMonthName,
            SortOrder::Descending,
            Locale::fr_FR,
        );
        assert_eq!(en[0].children[0].id, "2025/12");
        assert_eq!(fr[0].children[0].id, "2025/12");
        assert_eq!(en[0].children[0].label, "December");
        assert_eq!(fr[0].children[0].label, "décembre");
    }

    #[test]
    fn month_dash_name_label() {
        let items = [item("2025-03-02", true)];
        let groups = build_list_groups(
            &items,
            GroupingPreset::YearMonthDashName,
            SortOrder::Descending,
            Locale::en_US,
        );
        assert_eq!(groups[0].children[0].id, "2025/03");
        assert_eq!(groups[0].children[0].label, "03 - March");
    }

    #[test]
    fn iso_week_uses_week_year_at_boundary() {
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025.
        let items = [item("2024-12-30", true)];
        let groups = build_list_groups(
            &items,
            GroupingPreset::YearWeek,
            SortOrder::Descending,
            Locale::en_US,
        );
        assert_eq!(groups[0].id, "2025");
        assert_eq!(groups[0].children[0].id, "2025/01");
        assert_eq!(groups[0].children[0].label, "W01");
    }

    #[test]
    fn flat_preset_builds_no_tree() {
        let items = [item("2025-12-15", true)];
        let groups =
            build_list_groups(&items, GroupingPreset::Flat, SortOrder::Descending, Locale::en_US);
        assert!(groups.is_empty());
    }

    #[test]
    fn daily_note_count_ignores_placeholders() {
        let items = [
            item("2025-12-15", true),
            item("2025-12-14", false),
            item("2025-11-01", true),
        ];
        let groups = build_list_groups(
            &items,
            GroupingPreset::YearMonth,
            SortOrder::Descending,
            Locale::en_US,
        );
        assert_eq!(groups[0].daily_note_count, 2);
        let months: Vec<usize> = groups[0].children.iter().map(|c| c.daily_note_count).collect();
        assert_eq!(months, [1, 1]);
    }

    #[test]
    fn aggregate_counts_match_recount_on_random_tree() {
        use rand::Rng;

        fn recount(node: &ListGroupNode) -> usize {
            node.items.iter().filter(|i| i.daily_note_exists).count()
                + node.children.iter().map(recount).sum::<usize>()
        }

        let mut rng = rand::rng();
        let mut items = Vec::new();
        for _ in 0..200 {
            let year = rng.random_range(2023..=2025);
            let month = rng.random_range(1..=12);
            let day = rng.random_range(1..=28);
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let mut it = item(&date_key(date), rng.random_bool(0.5));
            // Collapse duplicate days to distinct items anyway; the grouping
            // engine does not require day uniqueness.
            it.modified = rng.random_range(0..1000);
            items.push(it);
        }

        let groups = build_list_groups(
            &items,
            GroupingPreset::YearMonth,
            SortOrder::Descending,
            Locale::en_US,
        );
        let total_expected = items.iter().filter(|i| i.daily_note_exists).count();
        let total: usize = groups.iter().map(|g| g.daily_note_count).sum();
        assert_eq!(total, total_expected);
        for year_node in &groups {
            assert_eq!(year_node.daily_note_count, recount(year_node));
            for month_node in &year_node.children {
                assert_eq!(month_node.daily_note_count, recount(month_node));
                assert!(month_node.children.is_empty());
                assert!(!month_node.items.is_empty());
            }
            assert!(year_node.items.is_empty(), "only leaves hold items");
        }
    }

    #[test]
    fn group_sort_is_idempotent() {
        let items = [
            item("2025-12-15", true),
            item("2024-06-01", true),
            item("2025-01-01", false),
        ];
        let a = build_list_groups(&items, GroupingPreset::YearMonth, SortOrder::Ascending, Locale::en_US);
        let b = build_list_groups(&items, GroupingPreset::YearMonth, SortOrder::Ascending, Locale::en_US);
        assert_eq!(a, b);
    }
}
