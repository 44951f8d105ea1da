use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::{
    cache::{CacheLookup, ContentCache, Store},
    config::NavigatorConfig,
    error::{NavError, Result},
    history::{history_path, path_from_history, title},
    panel::{DefaultCurrent, PanelModel},
    selection::PatternMode,
    source::{ContentSource, DirectoryLoader, Notification, PanelShell, PromptOutcome, Prompter, ReloadRequest},
    types::{as_dir_path, dir_name, parent_dir_path, DirectoryListing, EntryRef, FileContent, PanelPosition},
};

const NO_MATCHES: &str = "No matches found!";

/// External services the controller drives
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn ContentSource>,
    pub loader: Arc<dyn DirectoryLoader>,
    pub shell: Arc<dyn PanelShell>,
    pub prompter: Arc<dyn Prompter>,
}

/// Options for [`DualPaneController::set_current_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCurrentOptions {
    pub update_history: bool,
}

impl Default for SetCurrentOptions {
    fn default() -> Self {
        Self { update_history: true }
    }
}

impl SetCurrentOptions {
    pub fn without_history() -> Self {
        Self { update_history: false }
    }
}

/// Handle for a reload in flight
///
/// Only the most recently issued ticket of a panel may apply its listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    generation: u64,
    request: ReloadRequest,
}

impl ReloadTicket {
    pub fn request(&self) -> &ReloadRequest {
        &self.request
    }
}

/// Snapshot of the current entry and its surroundings
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentInfo {
    pub name: String,
    pub path: String,
    pub ext: String,
    pub dir: String,
    pub dir_path: String,
    pub parent_dir_path: String,
    pub is_dir: bool,
    pub is_selected: bool,
    pub panel: PanelPosition,
    pub panel_passive: PanelPosition,
    pub is_one_panel: bool,
}

/// Owns both panels and every navigation entry point
///
/// Panels are only mutated through this type. Panel resolution is total:
/// there is always exactly one left and one right panel.
pub struct DualPaneController {
    left: PanelModel,
    right: PanelModel,
    active: PanelPosition,
    single_panel_mode: bool,
    tab_memory: HashMap<PanelPosition, String>,
    last_path: Option<String>,
    select_pattern: String,
    config: NavigatorConfig,
    collaborators: Collaborators,
    cache: ContentCache,
}

impl DualPaneController {
    /// Create a controller caching content in memory
    pub fn new(config: NavigatorConfig, collaborators: Collaborators) -> Self {
        let cache = ContentCache::new(
            Arc::new(crate::cache::MemoryStore::new()),
            config.cache_size_ceiling,
        );
        Self::with_cache(config, collaborators, cache)
    }

    /// Create a controller caching content in the given store
    pub fn with_store(config: NavigatorConfig, collaborators: Collaborators, store: Arc<dyn Store>) -> Self {
        let cache = ContentCache::new(store, config.cache_size_ceiling);
        Self::with_cache(config, collaborators, cache)
    }

    pub fn with_cache(config: NavigatorConfig, collaborators: Collaborators, cache: ContentCache) -> Self {
        Self {
            left: PanelModel::new(PanelPosition::Left),
            right: PanelModel::new(PanelPosition::Right),
            active: PanelPosition::Left,
            single_panel_mode: false,
            tab_memory: HashMap::new(),
            last_path: None,
            select_pattern: config.default_select_pattern.clone(),
            config,
            collaborators,
            cache,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn panel(&self, position: PanelPosition) -> &PanelModel {
        match position {
            PanelPosition::Left => &self.left,
            PanelPosition::Right => &self.right,
        }
    }

    fn panel_mut(&mut self, position: PanelPosition) -> &mut PanelModel {
        match position {
            PanelPosition::Left => &mut self.left,
            PanelPosition::Right => &mut self.right,
        }
    }

    // Panel resolution

    pub fn is_one_panel(&self) -> bool {
        self.single_panel_mode
    }

    pub fn set_single_panel_mode(&mut self, single: bool) {
        if single != self.single_panel_mode {
            debug!("Single panel mode {}", if single { "on" } else { "off" });
        }
        self.single_panel_mode = single;
    }

    /// Derive single-panel mode from the viewport width
    pub fn set_viewport_width(&mut self, width: u32) {
        self.set_single_panel_mode(width < self.config.min_one_panel_width);
    }

    /// Position receiving keyboard navigation; always left when collapsed
    pub fn active_position(&self) -> PanelPosition {
        if self.single_panel_mode {
            PanelPosition::Left
        } else {
            self.active
        }
    }

    /// Position of the other panel; also left when collapsed
    pub fn passive_position(&self) -> PanelPosition {
        if self.single_panel_mode {
            PanelPosition::Left
        } else {
            self.active.opposite()
        }
    }

    pub fn resolve_active_panel(&self) -> &PanelModel {
        self.panel(self.active_position())
    }

    pub fn resolve_passive_panel(&self) -> &PanelModel {
        self.panel(self.passive_position())
    }

    fn owner_of(&self, entry: &EntryRef) -> Option<PanelPosition> {
        [self.active, self.active.opposite()]
            .into_iter()
            .find(|position| self.panel(*position).index_of(entry).is_some())
    }

    // Current entry

    pub fn current_file(&self) -> Option<&EntryRef> {
        self.resolve_active_panel().current()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_file().map(|entry| entry.name.as_str())
    }

    pub fn current_dir_path(&self) -> &str {
        self.resolve_active_panel().dir_path()
    }

    /// Directory of the panel that is not current
    pub fn not_current_dir_path(&self) -> &str {
        self.resolve_passive_panel().dir_path()
    }

    pub fn current_dir_name(&self) -> String {
        dir_name(self.current_dir_path())
    }

    pub fn current_info(&self) -> Option<CurrentInfo> {
        let panel = self.resolve_active_panel();
        let current = panel.current()?;

        Some(CurrentInfo {
            name: current.name.clone(),
            path: current.path.clone(),
            ext: current.ext().to_string(),
            dir: dir_name(panel.dir_path()),
            dir_path: panel.dir_path().to_string(),
            parent_dir_path: parent_dir_path(panel.dir_path()),
            is_dir: current.is_directory,
            is_selected: panel.is_selected(current),
            panel: self.active_position(),
            panel_passive: self.passive_position(),
            is_one_panel: self.single_panel_mode,
        })
    }

    /// Make `entry` the current entry of whichever panel lists it
    ///
    /// `None` is a no-op. An entry listed by neither panel is a caller bug
    /// and is reported as [`NavError::EntryNotFound`].
    pub fn set_current_file(&mut self, entry: Option<&EntryRef>, options: SetCurrentOptions) -> Result<()> {
        let Some(entry) = entry else {
            return Ok(());
        };

        let position = self.owner_of(entry).ok_or_else(|| NavError::EntryNotFound {
            path: entry.path.clone(),
        })?;

        let entry = entry.clone();
        self.set_current_in(position, &entry, options);
        Ok(())
    }

    /// Make the entry called `name` in the active panel current
    pub fn set_current_by_name(&mut self, name: &str) -> Result<bool> {
        let Some(entry) = self.resolve_active_panel().entry_by_name(name).cloned() else {
            return Ok(false);
        };
        self.set_current_file(Some(&entry), SetCurrentOptions::default())?;
        Ok(true)
    }

    fn set_current_in(&mut self, position: PanelPosition, entry: &EntryRef, options: SetCurrentOptions) {
        let path_was = self.last_path.take();

        let panel = self.panel_mut(position);
        if !panel.set_current(Some(entry)) {
            self.last_path = path_was;
            return;
        }
        let path = panel.dir_path().to_string();
        self.active = position;

        let shell = Arc::clone(&self.collaborators.shell);

        if path_was.as_deref() != Some(path.as_str()) {
            shell.render_title(&title(&self.config.app_name, &path));

            if options.update_history {
                shell.push_history(&history_path(&self.config.prefix, &path));
            }
        }
        self.last_path = Some(path.clone());

        shell.scroll_into_view(position, entry);

        shell.emit(Notification::CurrentFile(entry.clone()));
        shell.emit(Notification::CurrentPath(path));
        shell.emit(Notification::CurrentName(entry.name.clone()));
    }

    // Panel switching

    /// Move focus to the other panel, restoring its remembered entry
    pub fn change_panel(&mut self) -> Result<()> {
        let outgoing = self.active_position();
        let incoming = self.passive_position();
        let shell = Arc::clone(&self.collaborators.shell);

        shell.emit(Notification::PassiveDir(self.panel(outgoing).dir_path().to_string()));

        if let Some(name) = self.panel(outgoing).current().map(|e| e.name.clone()) {
            self.tab_memory.insert(outgoing, name);
        }

        let remembered = self
            .tab_memory
            .get(&incoming)
            .cloned()
            .or_else(|| self.panel(incoming).current().map(|e| e.name.clone()));

        let target = self.panel(incoming);
        let restored = target
            .resolve_default(&DefaultCurrent::NamedOrFirst(remembered))
            .map(|idx| target.entries()[idx].clone());

        self.active = incoming;
        match restored {
            Some(entry) => self.set_current_in(incoming, &entry, SetCurrentOptions::default()),
            None => debug!("Panel {} has no entries to restore", incoming.as_str()),
        }

        shell.emit(Notification::ActiveDir(self.panel(incoming).dir_path().to_string()));

        info!("Changed panel {} -> {}", outgoing.as_str(), incoming.as_str());
        Ok(())
    }

    // Reloads

    /// Register a reload; any earlier ticket for the same panel goes stale
    pub fn begin_reload(&mut self, request: ReloadRequest) -> ReloadTicket {
        let generation = self.panel_mut(request.panel).next_generation();
        ReloadTicket { generation, request }
    }

    /// Apply a listing obtained for `ticket`
    ///
    /// Returns `false` and leaves the panel alone when a newer reload was
    /// started for the panel in the meantime.
    pub fn apply_reload(&mut self, ticket: ReloadTicket, listing: DirectoryListing) -> bool {
        let ReloadTicket { generation, request } = ticket;
        let position = request.panel;

        if !self.panel(position).is_latest(generation) {
            debug!("Discarding stale listing of {} for {} panel", listing.path, position.as_str());
            return false;
        }

        let panel = self.panel_mut(position);
        panel.set_entries(listing);
        debug!(
            "Loaded {} entries of {} into {} panel",
            panel.entries().len(),
            panel.dir_path(),
            position.as_str()
        );

        if request.no_current {
            return true;
        }

        let policy = match request.select_current_name {
            Some(name) => DefaultCurrent::NamedOrFirst(Some(name)),
            None => DefaultCurrent::First,
        };

        let Some(idx) = panel.resolve_default(&policy) else {
            return true;
        };

        if position == self.active_position() {
            let entry = self.panel(position).entries()[idx].clone();
            let options = SetCurrentOptions {
                update_history: request.update_history,
            };
            self.set_current_in(position, &entry, options);
        } else {
            self.panel_mut(position).set_current_index(idx);
        }

        true
    }

    /// Reload a panel through the directory collaborator
    pub async fn load_dir(&mut self, request: ReloadRequest) -> Result<bool> {
        let loader = Arc::clone(&self.collaborators.loader);
        let ticket = self.begin_reload(request);
        let listing = loader.load(ticket.request()).await?;
        Ok(self.apply_reload(ticket, listing))
    }

    /// Re-read the active panel's directory, keeping the cursor on the same name
    pub async fn refresh(&mut self) -> Result<bool> {
        let panel = self.resolve_active_panel();
        let mut request = ReloadRequest::new(panel.dir_path(), panel.position()).without_history();
        if let Some(name) = panel.current().map(|e| e.name.clone()) {
            request = request.with_current_name(name);
        }
        self.load_dir(request).await
    }

    /// Show in the passive panel what the active panel points at
    pub async fn duplicate_panel(&mut self) -> Result<bool> {
        let active = self.resolve_active_panel();
        let path = match active.current() {
            Some(current) if current.is_directory => as_dir_path(&current.path),
            _ => active.dir_path().to_string(),
        };

        let mut request = ReloadRequest::new(path, self.passive_position());
        if self.single_panel_mode {
            request = request.without_current();
        }

        info!("Duplicating {} into {} panel", request.path, request.panel.as_str());
        self.load_dir(request).await
    }

    /// Exchange the directories of both panels, keeping the cursor index
    pub async fn swap_panels(&mut self) -> Result<()> {
        let active_position = self.active_position();
        let passive_position = self.passive_position();

        let path = self.current_dir_path().to_string();
        let passive_path = self.not_current_dir_path().to_string();
        let current_index = self.resolve_active_panel().current_index().unwrap_or(0);

        self.load_dir(ReloadRequest::new(path, passive_position).without_current())
            .await?;
        let applied = self
            .load_dir(ReloadRequest::new(passive_path, active_position).without_current())
            .await?;

        if !applied {
            return Ok(());
        }

        let panel = self.panel(active_position);
        match panel.resolve_default(&DefaultCurrent::Clamped(current_index)) {
            Some(idx) => {
                let entry = panel.entries()[idx].clone();
                self.set_current_in(active_position, &entry, SetCurrentOptions::default());
            }
            None => warn!("Swapped into an empty listing; no current entry"),
        }

        info!("Swapped panels");
        Ok(())
    }

    /// Prompt for a directory and show it in the active panel
    pub async fn go_to_directory(&mut self) -> Result<bool> {
        let prompter = Arc::clone(&self.collaborators.prompter);
        let default = self.current_dir_path().to_string();

        match prompter.prompt("Go to directory:", &default).await {
            PromptOutcome::Cancelled => Ok(false),
            PromptOutcome::Value(path) => self.go_to_directory_with(Some(path)).await,
        }
    }

    /// Show `path` in the active panel; nothing or an empty string means the
    /// current directory
    pub async fn go_to_directory_with(&mut self, path: Option<String>) -> Result<bool> {
        let path = match path {
            Some(path) if !path.trim().is_empty() => path,
            _ => self.current_dir_path().to_string(),
        };

        self.load_dir(ReloadRequest::new(path, self.active_position())).await
    }

    /// Navigate back to the directory recorded in a history URL
    ///
    /// Does not push a new history entry. Returns `false` for URLs this
    /// controller did not produce.
    pub async fn restore_from_history(&mut self, url: &str) -> Result<bool> {
        let Some(path) = path_from_history(&self.config.prefix, url) else {
            debug!("Ignoring foreign history entry {}", url);
            return Ok(false);
        };

        let request = ReloadRequest::new(path, self.active_position()).without_history();
        self.load_dir(request).await
    }

    // Selection

    /// Toggle selection of `entry`, or of the current entry when `None`
    pub fn toggle_selected_file(&mut self, entry: Option<&EntryRef>) -> bool {
        let position = self.active_position();
        let Some(entry) = entry.cloned().or_else(|| self.current_file().cloned()) else {
            return false;
        };
        self.panel_mut(position).toggle_selected(&entry)
    }

    pub fn toggle_all_selected_files(&mut self) {
        let position = self.active_position();
        self.panel_mut(position).toggle_all_selected();
    }

    pub fn select_all_files(&mut self) {
        let position = self.active_position();
        self.panel_mut(position).select_all();
    }

    pub fn unselect_files(&mut self) {
        let position = self.active_position();
        self.panel_mut(position).unselect_all();
    }

    pub fn selected_files(&self) -> Vec<EntryRef> {
        self.resolve_active_panel()
            .selected_entries()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Selection of the active panel, or its current entry when nothing is selected
    pub fn active_files(&self) -> Vec<EntryRef> {
        self.resolve_active_panel().active_entries()
    }

    pub fn all_files(&self) -> &[EntryRef] {
        self.resolve_active_panel().all_files()
    }

    /// Apply `pattern` to the active panel, alerting when nothing matched
    pub fn select_by_pattern(&mut self, mode: PatternMode, pattern: &str) -> usize {
        let position = self.active_position();
        let matches = self.panel_mut(position).select_by_pattern(pattern, mode);

        if matches == 0 {
            self.collaborators.shell.alert(NO_MATCHES);
        }
        matches
    }

    /// Prompt for a pattern and select the matching entries
    ///
    /// `None` when the prompt was cancelled.
    pub async fn expand_selection(&mut self) -> Option<usize> {
        self.prompt_pattern(PatternMode::Expand).await
    }

    /// Prompt for a pattern and unselect the matching entries
    pub async fn shrink_selection(&mut self) -> Option<usize> {
        self.prompt_pattern(PatternMode::Shrink).await
    }

    async fn prompt_pattern(&mut self, mode: PatternMode) -> Option<usize> {
        let prompter = Arc::clone(&self.collaborators.prompter);
        let message = format!("Specify file type for {} selection", mode.as_str());

        let pattern = match prompter.prompt(&message, &self.select_pattern).await {
            PromptOutcome::Cancelled => return None,
            PromptOutcome::Value(pattern) => pattern,
        };

        self.select_pattern = pattern.clone();
        Some(self.select_by_pattern(mode, &pattern))
    }

    /// Pattern offered by the next selection prompt
    pub fn last_select_pattern(&self) -> &str {
        &self.select_pattern
    }

    // Listing edits

    /// Drop the current entry from the active listing after it was removed
    pub fn delete_current(&mut self) {
        let position = self.active_position();
        let Some(current) = self.current_file().cloned() else {
            return;
        };

        if !self.panel_mut(position).remove_entry(&current) {
            return;
        }

        if let Some(next) = self.panel(position).current().cloned() {
            self.set_current_in(position, &next, SetCurrentOptions::default());
        }
    }

    /// Drop every selected entry from the active listing
    pub fn delete_selected(&mut self) {
        let position = self.active_position();
        let selected = self.selected_files();
        let current_was = self.current_file().cloned();

        let panel = self.panel_mut(position);
        for entry in &selected {
            panel.remove_entry(entry);
        }

        let next = panel.current().cloned();
        if let Some(next) = next {
            if current_was.as_ref() != Some(&next) {
                self.set_current_in(position, &next, SetCurrentOptions::default());
            }
        }
    }

    // Content

    /// Content of the current entry
    ///
    /// Files are served from the cache when the remote hash still matches;
    /// directories always go to the source. The parent link has no content.
    pub async fn current_data(&self) -> Result<FileContent> {
        let current = match self.current_file() {
            Some(current) if !current.is_parent_link() => current.clone(),
            _ => return Err(NavError::NoFilesSelected),
        };
        let source = Arc::clone(&self.collaborators.source);

        if current.is_directory {
            let content = source.fetch_data(&current.path).await?;
            return Ok(FileContent {
                content,
                source_path: current.path,
                hash: None,
                from_cache: false,
            });
        }

        match self.cache.get(&current.path, source.as_ref()).await? {
            CacheLookup::Hit { data, hash } => Ok(FileContent {
                content: data,
                source_path: current.path,
                hash: Some(hash),
                from_cache: true,
            }),
            CacheLookup::Miss { remote_hash } => {
                debug!("Reading {} from {}", current.path, source.identifier());
                let content = source.fetch_data(&current.path).await?;
                self.store_content(&current, content.clone(), &remote_hash).await;

                Ok(FileContent {
                    content,
                    source_path: current.path,
                    hash: Some(remote_hash),
                    from_cache: false,
                })
            }
        }
    }

    async fn store_content(&self, entry: &EntryRef, content: Bytes, hash: &str) {
        if !self.cache.is_cacheable(entry, content.len() as u64) {
            debug!("Not caching {} ({} bytes)", entry.path, content.len());
            return;
        }

        if let Err(e) = self.cache.put(&entry.path, content, hash).await {
            warn!("Failed to cache {}: {}", entry.path, e);
        }
    }

    /// Save content written by an editor so the next read is served locally
    pub async fn save_data_to_cache(&self, entry: &EntryRef, content: Bytes) -> Result<()> {
        if entry.is_directory {
            return Ok(());
        }

        let hash = self.collaborators.source.fetch_hash(&entry.path).await?;
        self.cache.put(&entry.path, content, &hash).await
    }

    pub async fn current_hash(&self) -> Result<String> {
        let current = self.current_file().ok_or(NavError::NoFilesSelected)?;
        self.collaborators.source.fetch_hash(&current.path).await
    }

    pub async fn current_time(&self) -> Result<String> {
        let current = self.current_file().ok_or(NavError::NoFilesSelected)?;
        self.collaborators.source.fetch_time(&current.path).await
    }

    pub async fn current_size(&self) -> Result<String> {
        match self.current_file() {
            Some(current) if !current.is_parent_link() => {
                self.collaborators.source.fetch_size(&current.path).await
            }
            _ => Err(NavError::NoFilesSelected),
        }
    }
}
