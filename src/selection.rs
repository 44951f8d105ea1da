use std::collections::HashSet;

use crate::pattern::WildcardMatcher;
use crate::types::EntryRef;

/// Direction of a pattern-driven bulk selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    Expand,
    Shrink,
}

impl PatternMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternMode::Expand => "expand",
            PatternMode::Shrink => "shrink",
        }
    }
}

/// Entries of one panel marked for bulk operations
///
/// Members are tracked by path. The parent link is never a member.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    members: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entry: &EntryRef) -> bool {
        self.members.contains(&entry.path)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Flip membership of `entry`; returns whether it is selected afterwards
    pub fn toggle(&mut self, entry: &EntryRef) -> bool {
        if entry.is_parent_link() {
            return false;
        }

        if self.members.remove(&entry.path) {
            false
        } else {
            self.members.insert(entry.path.clone());
            true
        }
    }

    pub fn select(&mut self, entry: &EntryRef) {
        if !entry.is_parent_link() {
            self.members.insert(entry.path.clone());
        }
    }

    pub fn unselect(&mut self, entry: &EntryRef) {
        self.members.remove(&entry.path);
    }

    /// Toggle every entry of the listing
    pub fn toggle_all(&mut self, entries: &[EntryRef]) {
        for entry in entries {
            self.toggle(entry);
        }
    }

    pub fn select_all(&mut self, entries: &[EntryRef]) {
        for entry in entries {
            self.select(entry);
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Drop members that are no longer part of `entries`
    pub fn retain_present(&mut self, entries: &[EntryRef]) {
        let present: HashSet<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        self.members.retain(|path| present.contains(path.as_str()));
    }

    /// Select every unselected entry whose name matches `pattern`
    ///
    /// Returns how many entries matched, not how many changed.
    pub fn expand_by_pattern(&mut self, entries: &[EntryRef], pattern: &str) -> usize {
        self.apply_pattern(entries, pattern, PatternMode::Expand)
    }

    /// Unselect every selected entry whose name matches `pattern`
    pub fn shrink_by_pattern(&mut self, entries: &[EntryRef], pattern: &str) -> usize {
        self.apply_pattern(entries, pattern, PatternMode::Shrink)
    }

    pub fn apply_pattern(&mut self, entries: &[EntryRef], pattern: &str, mode: PatternMode) -> usize {
        let matcher = WildcardMatcher::new(pattern);
        let mut matches = 0;

        for entry in entries {
            if entry.is_parent_link() || !matcher.is_match(&entry.name) {
                continue;
            }

            matches += 1;

            match mode {
                PatternMode::Expand => self.select(entry),
                PatternMode::Shrink => self.unselect(entry),
            }
        }

        tracing::debug!(
            "{} selection by '{}' matched {} of {} entries",
            mode.as_str(),
            pattern,
            matches,
            entries.len()
        );

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<EntryRef> {
        vec![
            EntryRef::parent_link("/docs/"),
            EntryRef::file("a.md", "/docs/a.md", 1),
            EntryRef::file("b.txt", "/docs/b.txt", 2),
            EntryRef::file("c.MD", "/docs/c.MD", 3),
        ]
    }

    #[test]
    fn test_toggle_skips_parent_link() {
        let entries = listing();
        let mut set = SelectionSet::new();

        assert!(!set.toggle(&entries[0]));
        assert!(set.is_empty());

        assert!(set.toggle(&entries[1]));
        assert!(set.contains(&entries[1]));
        assert!(!set.toggle(&entries[1]));
        assert!(set.is_empty());

        set.select(&entries[0]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_all_inverts() {
        let entries = listing();
        let mut set = SelectionSet::new();
        set.select(&entries[1]);

        set.toggle_all(&entries);
        assert!(!set.contains(&entries[0]));
        assert!(!set.contains(&entries[1]));
        assert!(set.contains(&entries[2]));
        assert!(set.contains(&entries[3]));
    }

    #[test]
    fn test_expand_counts_matches_not_changes() {
        let entries = listing();
        let mut set = SelectionSet::new();
        set.select(&entries[1]);

        let matched = set.expand_by_pattern(&entries, "*.md");
        assert_eq!(matched, 2);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&entries[3]));

        // idempotent
        assert_eq!(set.expand_by_pattern(&entries, "*.md"), 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_shrink() {
        let entries = listing();
        let mut set = SelectionSet::new();
        set.select_all(&entries);
        assert_eq!(set.len(), 3);

        assert_eq!(set.shrink_by_pattern(&entries, "*.txt"), 1);
        assert!(!set.contains(&entries[2]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parent_link_never_matches_pattern() {
        let entries = listing();
        let mut set = SelectionSet::new();

        assert_eq!(set.expand_by_pattern(&entries, "*"), 3);
        assert!(!set.contains(&entries[0]));
        assert_eq!(set.expand_by_pattern(&entries, "..*"), 0);
    }

    #[test]
    fn test_no_matches() {
        let entries = listing();
        let mut set = SelectionSet::new();
        assert_eq!(set.expand_by_pattern(&entries, "*.zzz"), 0);
        assert_eq!(set.expand_by_pattern(&entries, ""), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_bracket_and_brace_names_select_themselves() {
        let entries = vec![
            EntryRef::file("report[1].txt", "/r/report[1].txt", 1),
            EntryRef::file("[abc", "/r/[abc", 1),
            EntryRef::file("{a,b}.txt", "/r/{a,b}.txt", 1),
        ];

        for entry in &entries {
            let mut set = SelectionSet::new();
            assert_eq!(set.expand_by_pattern(&entries, &entry.name), 1);
            assert!(set.contains(entry));
        }
    }

    #[test]
    fn test_retain_present() {
        let entries = listing();
        let mut set = SelectionSet::new();
        set.select_all(&entries);

        set.retain_present(&entries[2..]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&entries[1]));
    }
}
