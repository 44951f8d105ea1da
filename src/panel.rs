use crate::selection::{PatternMode, SelectionSet};
use crate::types::{DirectoryListing, EntryRef, PanelPosition};

/// How to pick a current entry when none is given explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultCurrent {
    /// Leave the panel without a current entry
    Nothing,
    /// The first entry of the listing
    First,
    /// The entry with this name, or nothing when it is gone
    Named(String),
    /// The entry with this name, falling back to the first entry
    NamedOrFirst(Option<String>),
    /// The entry at this index, clamped to the last entry
    Clamped(usize),
}

/// State of one pane: its listing, cursor and selection
#[derive(Debug, Clone)]
pub struct PanelModel {
    position: PanelPosition,
    dir_path: String,
    entries: Vec<EntryRef>,
    current: Option<usize>,
    selected: SelectionSet,
    generation: u64,
}

impl PanelModel {
    pub fn new(position: PanelPosition) -> Self {
        Self {
            position,
            dir_path: "/".to_string(),
            entries: Vec::new(),
            current: None,
            selected: SelectionSet::new(),
            generation: 0,
        }
    }

    pub fn position(&self) -> PanelPosition {
        self.position
    }

    /// Directory currently listed, with a trailing slash
    pub fn dir_path(&self) -> &str {
        &self.dir_path
    }

    pub fn entries(&self) -> &[EntryRef] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the listing; current entry and selection are reset
    pub fn set_entries(&mut self, listing: DirectoryListing) {
        self.dir_path = listing.path;
        self.entries = listing.entries;
        self.current = None;
        self.selected.clear();
    }

    pub fn current(&self) -> Option<&EntryRef> {
        self.current.and_then(|idx| self.entries.get(idx))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_current(&self, entry: &EntryRef) -> bool {
        self.current().map_or(false, |current| current == entry)
    }

    /// Mark `entry` current, unmarking the previous one
    ///
    /// `None` clears the cursor. An entry that is not part of this listing
    /// leaves the panel untouched and returns `false`.
    pub fn set_current(&mut self, entry: Option<&EntryRef>) -> bool {
        match entry {
            None => {
                self.current = None;
                true
            }
            Some(entry) => match self.index_of(entry) {
                Some(idx) => {
                    self.current = Some(idx);
                    true
                }
                None => false,
            },
        }
    }

    pub fn set_current_index(&mut self, idx: usize) -> bool {
        if idx < self.entries.len() {
            self.current = Some(idx);
            true
        } else {
            false
        }
    }

    pub fn index_of(&self, entry: &EntryRef) -> Option<usize> {
        self.entries.iter().position(|e| e == entry)
    }

    pub fn entry_by_name(&self, name: &str) -> Option<&EntryRef> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entry_by_data_name(&self, data_name: &str) -> Option<&EntryRef> {
        self.entries.iter().find(|e| e.data_name() == data_name)
    }

    /// Index the given policy points at in the present listing
    pub fn resolve_default(&self, policy: &DefaultCurrent) -> Option<usize> {
        let first = if self.entries.is_empty() { None } else { Some(0) };
        let by_name = |name: &str| self.entries.iter().position(|e| e.name == name);

        match policy {
            DefaultCurrent::Nothing => None,
            DefaultCurrent::First => first,
            DefaultCurrent::Named(name) => by_name(name.as_str()),
            DefaultCurrent::NamedOrFirst(name) => name.as_deref().and_then(by_name).or(first),
            DefaultCurrent::Clamped(idx) => {
                if self.entries.is_empty() {
                    None
                } else {
                    Some((*idx).min(self.entries.len() - 1))
                }
            }
        }
    }

    /// Entries of the listing without the leading parent link
    pub fn all_files(&self) -> &[EntryRef] {
        match self.entries.first() {
            Some(first) if first.is_parent_link() => &self.entries[1..],
            _ => &self.entries,
        }
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selected
    }

    pub fn is_selected(&self, entry: &EntryRef) -> bool {
        self.selected.contains(entry)
    }

    /// Selected entries in listing order
    pub fn selected_entries(&self) -> Vec<&EntryRef> {
        self.entries.iter().filter(|e| self.selected.contains(e)).collect()
    }

    /// Entries a bulk operation should act on
    ///
    /// The selection when it is non-empty, otherwise the current entry alone,
    /// except that the parent link is never picked implicitly.
    pub fn active_entries(&self) -> Vec<EntryRef> {
        if !self.selected.is_empty() {
            return self.selected_entries().into_iter().cloned().collect();
        }

        match self.current() {
            Some(current) if !current.is_parent_link() => vec![current.clone()],
            _ => Vec::new(),
        }
    }

    pub fn toggle_selected(&mut self, entry: &EntryRef) -> bool {
        if self.index_of(entry).is_none() {
            return false;
        }
        self.selected.toggle(entry)
    }

    pub fn toggle_all_selected(&mut self) {
        self.selected.toggle_all(&self.entries);
    }

    pub fn select_all(&mut self) {
        self.selected.select_all(&self.entries);
    }

    pub fn unselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn select_by_pattern(&mut self, pattern: &str, mode: PatternMode) -> usize {
        self.selected.apply_pattern(&self.entries, pattern, mode)
    }

    /// Remove an entry from the listing after it was deleted or renamed
    ///
    /// If it was current, the cursor moves to the following entry, or the
    /// preceding one when it was last. The parent link is never removed.
    pub fn remove_entry(&mut self, entry: &EntryRef) -> bool {
        if entry.is_parent_link() {
            return false;
        }
        let Some(idx) = self.index_of(entry) else {
            return false;
        };

        self.entries.remove(idx);
        self.selected.unselect(entry);

        self.current = match self.current {
            Some(cur) if cur == idx => {
                if self.entries.is_empty() {
                    None
                } else {
                    Some(idx.min(self.entries.len() - 1))
                }
            }
            Some(cur) if cur > idx => Some(cur - 1),
            other => other,
        };

        true
    }

    /// Issue a new reload generation; older ones become stale
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub(crate) fn is_latest(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Names of the given entries, without the parent link
pub fn filenames(entries: &[EntryRef]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| !e.is_parent_link())
        .map(|e| e.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> PanelModel {
        let mut panel = PanelModel::new(PanelPosition::Left);
        panel.set_entries(DirectoryListing::new(
            "/work/",
            vec![
                EntryRef::parent_link("/work/"),
                EntryRef::directory("src", "/work/src"),
                EntryRef::file("a.rs", "/work/a.rs", 10),
                EntryRef::file("b.rs", "/work/b.rs", 20),
            ],
        ));
        panel
    }

    #[test]
    fn test_set_entries_resets_state() {
        let mut panel = panel();
        let entry = panel.entries()[2].clone();
        panel.set_current(Some(&entry));
        panel.toggle_selected(&entry);

        panel.set_entries(DirectoryListing::new("/other/", vec![entry.clone()]));
        assert_eq!(panel.dir_path(), "/other/");
        assert!(panel.current().is_none());
        assert!(panel.selection().is_empty());
    }

    #[test]
    fn test_single_current() {
        let mut panel = panel();
        let a = panel.entries()[2].clone();
        let b = panel.entries()[3].clone();

        assert!(panel.set_current(Some(&a)));
        assert!(panel.set_current(Some(&b)));
        assert!(panel.is_current(&b));
        assert!(!panel.is_current(&a));

        let stranger = EntryRef::file("x", "/elsewhere/x", 0);
        assert!(!panel.set_current(Some(&stranger)));
        assert!(panel.is_current(&b));

        assert!(panel.set_current(None));
        assert!(panel.current().is_none());
    }

    #[test]
    fn test_parent_link_can_be_current() {
        let mut panel = panel();
        let up = panel.entries()[0].clone();
        assert!(panel.set_current(Some(&up)));
        assert!(panel.active_entries().is_empty());
    }

    #[test]
    fn test_active_entries() {
        let mut panel = panel();
        let a = panel.entries()[2].clone();
        let b = panel.entries()[3].clone();
        panel.set_current(Some(&a));
        assert_eq!(panel.active_entries(), vec![a.clone()]);

        panel.toggle_selected(&b);
        assert_eq!(panel.active_entries(), vec![b]);
    }

    #[test]
    fn test_resolve_default() {
        let panel = panel();
        assert_eq!(panel.resolve_default(&DefaultCurrent::Nothing), None);
        assert_eq!(panel.resolve_default(&DefaultCurrent::First), Some(0));
        assert_eq!(panel.resolve_default(&DefaultCurrent::Named("b.rs".into())), Some(3));
        assert_eq!(panel.resolve_default(&DefaultCurrent::Named("gone".into())), None);
        assert_eq!(
            panel.resolve_default(&DefaultCurrent::NamedOrFirst(Some("gone".into()))),
            Some(0)
        );
        assert_eq!(panel.resolve_default(&DefaultCurrent::NamedOrFirst(None)), Some(0));
        assert_eq!(panel.resolve_default(&DefaultCurrent::Clamped(1)), Some(1));
        assert_eq!(panel.resolve_default(&DefaultCurrent::Clamped(40)), Some(3));

        let empty = PanelModel::new(PanelPosition::Right);
        assert_eq!(empty.resolve_default(&DefaultCurrent::Clamped(2)), None);
        assert_eq!(empty.resolve_default(&DefaultCurrent::First), None);
    }

    #[test]
    fn test_all_files_skips_parent_link() {
        let panel = panel();
        let names = filenames(panel.all_files());
        assert_eq!(names, vec!["src", "a.rs", "b.rs"]);
        assert_eq!(filenames(panel.entries()), names);
    }

    #[test]
    fn test_select_all_excludes_parent_link() {
        let mut panel = panel();
        panel.select_all();
        assert_eq!(panel.selection().len(), 3);
        assert!(!panel.is_selected(&panel.entries()[0].clone()));

        panel.toggle_all_selected();
        assert!(panel.selection().is_empty());
    }

    #[test]
    fn test_remove_current_moves_cursor() {
        let mut panel = panel();
        let a = panel.entries()[2].clone();
        let b = panel.entries()[3].clone();

        panel.set_current(Some(&a));
        assert!(panel.remove_entry(&a));
        assert!(panel.is_current(&b));

        assert!(panel.remove_entry(&b));
        assert_eq!(panel.current().map(|e| e.name.as_str()), Some("src"));

        let up = panel.entries()[0].clone();
        assert!(!panel.remove_entry(&up));
    }

    #[test]
    fn test_remove_before_current_keeps_cursor() {
        let mut panel = panel();
        let src = panel.entries()[1].clone();
        let b = panel.entries()[3].clone();
        panel.set_current(Some(&b));

        panel.remove_entry(&src);
        assert!(panel.is_current(&b));
    }

    #[test]
    fn test_generations() {
        let mut panel = panel();
        let first = panel.next_generation();
        let second = panel.next_generation();
        assert!(!panel.is_latest(first));
        assert!(panel.is_latest(second));
    }
}
