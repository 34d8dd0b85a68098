use serde::{Deserialize, Serialize};

/// How list items roll up into time-period groups.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingPreset {
    /// No grouping; consumers render the flat item list directly.
    #[default]
    Flat,
    Year,
    /// Year, then zero-padded month number ("12").
    YearMonth,
    /// Year, then locale month name ("December"); id stays numeric.
    YearMonthName,
    /// Year, then "12 - December"; id stays numeric.
    YearMonthDashName,
    /// Year, then quarter ("Q4").
    YearQuarter,
    /// ISO week-year, then ISO week ("W08"). The week-year may differ from
    /// the calendar year around January 1st.
    YearWeek,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Read-only snapshot of the host settings the list engine consumes. Writes
/// flow back through the host's own settings channel, never through here.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ListSettings {
    /// Minimum word count for a daily note to qualify; zero or less means
    /// every daily note qualifies without reading its content.
    pub min_word_count: i64,
    /// Whether days with created files but no daily note appear in the list.
    pub include_created_days: bool,
    pub grouping: GroupingPreset,
    pub sort_order: SortOrder,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            min_word_count: 0,
            include_created_days: true,
            grouping: GroupingPreset::Flat,
            sort_order: SortOrder::Descending,
        }
    }
}

/// Path and file-type conventions of the host vault.
#[derive(Clone, Debug)]
pub struct VaultConventions {
    /// Path prefixes never indexed: the host's configuration and trash
    /// storage.
    pub excluded_prefixes: Vec<String>,
    /// Extensions classified as note-like; everything else is a plain file.
    pub note_extensions: Vec<String>,
}

impl Default for VaultConventions {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec![".config/".into(), ".trash/".into()],
            note_extensions: vec!["md".into(), "canvas".into()],
        }
    }
}

impl VaultConventions {
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn is_note(&self, path: &str) -> bool {
        match path.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.note_extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_prefixes() {
        let conv = VaultConventions::default();
        assert!(conv.is_excluded(".config/plugins/data.json"));
        assert!(conv.is_excluded(".trash/old.md"));
        assert!(!conv.is_excluded("Daily/2025-12-15.md"));
    }

    #[test]
    fn note_classification() {
        let conv = VaultConventions::default();
        assert!(conv.is_note("Daily/2025-12-15.md"));
        assert!(conv.is_note("Boards/plan.CANVAS"));
        assert!(!conv.is_note("img/photo.png"));
        assert!(!conv.is_note("LICENSE"));
    }

    #[test]
    fn settings_roundtrip() {
        let settings = ListSettings {
            min_word_count: 50,
            include_created_days: false,
            grouping: GroupingPreset::YearQuarter,
            sort_order: SortOrder::Ascending,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: ListSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn settings_default_fills_missing_fields() {
        let back: ListSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(back, ListSettings::default());
    }
}
