use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::utf8_percent_encode;
use serde::{Deserialize, Serialize};

use crate::history::ENCODE_URI;

/// Name of the parent-directory link rendered at the top of a listing
pub const PARENT_LINK: &str = "..";

/// Which of the two panes an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    Left,
    Right,
}

impl PanelPosition {
    pub fn opposite(self) -> Self {
        match self {
            PanelPosition::Left => PanelPosition::Right,
            PanelPosition::Right => PanelPosition::Left,
        }
    }

    /// Name the renderer uses for the panel element (`js-left`, `js-right`)
    pub fn data_name(self) -> &'static str {
        match self {
            PanelPosition::Left => "js-left",
            PanelPosition::Right => "js-right",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PanelPosition::Left => "left",
            PanelPosition::Right => "right",
        }
    }
}

/// One filesystem entry rendered in a panel
///
/// Two entries are the same entity when their paths are equal; the
/// display metadata does not take part in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRef {
    /// Raw (decoded) file or directory name
    pub name: String,
    /// Absolute decoded path
    pub path: String,
    #[serde(default)]
    pub is_directory: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl EntryRef {
    pub fn file(name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: false,
            size,
            mode: None,
            owner: None,
            modified_at: None,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: true,
            size: 0,
            mode: None,
            owner: None,
            modified_at: None,
        }
    }

    /// Parent link for a listing of `dir_path`
    pub fn parent_link(dir_path: &str) -> Self {
        Self::directory(PARENT_LINK, parent_dir_path(dir_path))
    }

    pub fn is_parent_link(&self) -> bool {
        self.name == PARENT_LINK
    }

    /// Key renderers attach to the entry element: `js-file-` followed by the
    /// base64 of the URI-encoded name
    pub fn data_name(&self) -> String {
        data_name_for(&self.name)
    }

    /// Extension of the name without the dot, empty when there is none
    pub fn ext(&self) -> &str {
        match self.name.rfind('.') {
            Some(0) | None => "",
            Some(idx) => &self.name[idx + 1..],
        }
    }
}

impl PartialEq for EntryRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for EntryRef {}

pub(crate) fn data_name_for(name: &str) -> String {
    let encoded = utf8_percent_encode(name, ENCODE_URI).to_string();
    format!("js-file-{}", STANDARD.encode(encoded.as_bytes()))
}

/// `path` with exactly one trailing slash, the form panels keep their
/// directory in
pub fn as_dir_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    format!("{}/", trimmed)
}

/// Last segment of a directory path, `/` for the root
pub fn dir_name(dir_path: &str) -> String {
    let trimmed = dir_path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) if idx + 1 < trimmed.len() => trimmed[idx + 1..].to_string(),
        _ => "/".to_string(),
    }
}

/// Path of the directory containing `dir_path`, with a trailing slash
pub fn parent_dir_path(dir_path: &str) -> String {
    if dir_path == "/" {
        return dir_path.to_string();
    }

    let trimmed = dir_path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Listing produced by the directory collaborator for one panel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Directory that was listed, with a trailing slash
    pub path: String,
    /// Entries in display order, parent link first when present
    pub entries: Vec<EntryRef>,
}

impl DirectoryListing {
    pub fn new(path: impl Into<String>, entries: Vec<EntryRef>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }
}

/// Content of the current entry together with where it came from
#[derive(Debug, Clone)]
pub struct FileContent {
    /// The raw bytes of the file or directory listing
    pub content: bytes::Bytes,
    /// Path the content was read for
    pub source_path: String,
    /// Remote content hash when one was fetched
    pub hash: Option<String>,
    /// Whether the bytes were served from the local cache
    pub from_cache: bool,
}
