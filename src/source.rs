use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    error::Result,
    types::{DirectoryListing, EntryRef, PanelPosition},
};

/// Remote read access to file contents and their fingerprints
///
/// Implementors talk to the file server; errors are handed back to the
/// caller unchanged.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Server-computed hash of the file at `path`
    async fn fetch_hash(&self, path: &str) -> Result<String>;

    /// Raw bytes of the file, or the rendered listing for a directory
    async fn fetch_data(&self, path: &str) -> Result<Bytes>;

    /// Modification time as reported by the server
    async fn fetch_time(&self, path: &str) -> Result<String>;

    /// Size as reported by the server (recursive for directories)
    async fn fetch_size(&self, path: &str) -> Result<String>;

    /// Get a human-readable identifier for this source (for logging/debugging)
    fn identifier(&self) -> String;
}

/// Parameters of a directory reload for one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    /// Directory to list
    pub path: String,
    /// Panel that receives the listing
    pub panel: PanelPosition,
    /// Name to make current once the listing is in place
    pub select_current_name: Option<String>,
    /// Leave the reloaded panel without a current entry
    pub no_current: bool,
    /// Push a history entry when the reload moves the cursor to a new path
    pub update_history: bool,
}

impl ReloadRequest {
    pub fn new(path: impl Into<String>, panel: PanelPosition) -> Self {
        Self {
            path: path.into(),
            panel,
            select_current_name: None,
            no_current: false,
            update_history: true,
        }
    }

    pub fn with_current_name(mut self, name: impl Into<String>) -> Self {
        self.select_current_name = Some(name.into());
        self
    }

    pub fn without_current(mut self) -> Self {
        self.no_current = true;
        self
    }

    pub fn without_history(mut self) -> Self {
        self.update_history = false;
        self
    }
}

/// Produces directory listings
#[async_trait]
pub trait DirectoryLoader: Send + Sync {
    async fn load(&self, request: &ReloadRequest) -> Result<DirectoryListing>;
}

/// Events published for the rest of the interface
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    CurrentFile(EntryRef),
    CurrentPath(String),
    CurrentName(String),
    ActiveDir(String),
    PassiveDir(String),
}

impl Notification {
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::CurrentFile(_) => "current-file",
            Notification::CurrentPath(_) => "current-path",
            Notification::CurrentName(_) => "current-name",
            Notification::ActiveDir(_) => "active-dir",
            Notification::PassiveDir(_) => "passive-dir",
        }
    }
}

/// Browser-side integration: title, history, scrolling and the event bus
///
/// All calls are fire-and-forget.
pub trait PanelShell: Send + Sync {
    fn render_title(&self, title: &str);

    fn push_history(&self, url: &str);

    fn scroll_into_view(&self, panel: PanelPosition, entry: &EntryRef);

    fn emit(&self, notification: Notification);

    /// Informational notice such as "No matches found!"
    fn alert(&self, message: &str);
}

/// Answer to a prompt dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Cancelled,
    Value(String),
}

#[async_trait]
pub trait Prompter: Send + Sync {
    async fn prompt(&self, message: &str, default: &str) -> PromptOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let entry = EntryRef::file("a", "/a", 0);
        assert_eq!(Notification::CurrentFile(entry).event_name(), "current-file");
        assert_eq!(Notification::CurrentPath("/".into()).event_name(), "current-path");
        assert_eq!(Notification::CurrentName("a".into()).event_name(), "current-name");
        assert_eq!(Notification::ActiveDir("/".into()).event_name(), "active-dir");
        assert_eq!(Notification::PassiveDir("/".into()).event_name(), "passive-dir");
    }

    #[test]
    fn test_reload_request_builders() {
        let request = ReloadRequest::new("/tmp/", PanelPosition::Right)
            .with_current_name("a.txt")
            .without_current();
        assert_eq!(request.path, "/tmp/");
        assert_eq!(request.select_current_name.as_deref(), Some("a.txt"));
        assert!(request.no_current);
        assert!(request.update_history);
        assert!(!request.without_history().update_history);
    }
}
