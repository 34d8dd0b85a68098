use crate::vault::FileKind;

/// Files created on one calendar day, split into note-like and other.
/// Both lists stay sorted by path for stable rendering and diffing; a path
/// appears in exactly one of the two.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreatedDayBucket {
    pub notes: Vec<String>,
    pub files: Vec<String>,
}

impl CreatedDayBucket {
    /// Insert a path under its classification, keeping sort order. Inserting
    /// an already-present path is a no-op.
    pub fn insert(&mut self, path: &str, kind: FileKind) {
        let list = match kind {
            FileKind::Note => &mut self.notes,
            FileKind::Other => &mut self.files,
        };
        if let Err(pos) = list.binary_search_by(|p| p.as_str().cmp(path)) {
            list.insert(pos, path.to_string());
        }
    }

    /// Remove a path from whichever list holds it. Returns whether anything
    /// was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let mut removed = false;
        for list in [&mut self.notes, &mut self.files] {
            if let Ok(pos) = list.binary_search_by(|p| p.as_str().cmp(path)) {
                list.remove(pos);
                removed = true;
            }
        }
        removed
    }

    pub fn contains(&self, path: &str) -> bool {
        self.notes.binary_search_by(|p| p.as_str().cmp(path)).is_ok()
            || self.files.binary_search_by(|p| p.as_str().cmp(path)).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notes.len() + self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_paths_sorted_and_unique() {
        let mut bucket = CreatedDayBucket::default();
        bucket.insert("b.md", FileKind::Note);
        bucket.insert("a.md", FileKind::Note);
        bucket.insert("b.md", FileKind::Note);
        bucket.insert("z.png", FileKind::Other);
        assert_eq!(bucket.notes, vec!["a.md", "b.md"]);
        assert_eq!(bucket.files, vec!["z.png"]);
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn remove_clears_either_list() {
        let mut bucket = CreatedDayBucket::default();
        bucket.insert("a.md", FileKind::Note);
        bucket.insert("pic.png", FileKind::Other);
        assert!(bucket.remove("pic.png"));
        assert!(!bucket.remove("pic.png"));
        assert!(bucket.remove("a.md"));
        assert!(bucket.is_empty());
    }
}
