pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod panel;
pub mod pattern;
pub mod selection;
pub mod source;
pub mod types;

pub use cache::{CacheLookup, ContentCache, DiskStore, MemoryStore, NoStore, Store};
pub use config::NavigatorConfig;
pub use controller::{Collaborators, CurrentInfo, DualPaneController, ReloadTicket, SetCurrentOptions};
pub use error::{NavError, Result};
pub use panel::{filenames, DefaultCurrent, PanelModel};
pub use pattern::WildcardMatcher;
pub use selection::{PatternMode, SelectionSet};
pub use source::{
    ContentSource, DirectoryLoader, Notification, PanelShell, PromptOutcome, Prompter, ReloadRequest,
};
pub use types::{DirectoryListing, EntryRef, FileContent, PanelPosition, PARENT_LINK};
