use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::DEFAULT_SIZE_CEILING;
use crate::error::{NavError, Result};

/// Settings of the navigation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Shown before the directory path in the window title
    pub app_name: String,
    /// Prepended to every URL pushed to history
    pub prefix: String,
    /// Viewport width below which only the left panel is shown
    pub min_one_panel_width: u32,
    /// Payloads of this many bytes or more are not cached
    pub cache_size_ceiling: u64,
    /// Pattern offered the first time a pattern selection is prompted
    pub default_select_pattern: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            app_name: "Cloud Commander".to_string(),
            prefix: String::new(),
            min_one_panel_width: 1155,
            cache_size_ceiling: DEFAULT_SIZE_CEILING,
            default_select_pattern: "*.*".to_string(),
        }
    }
}

impl NavigatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_one_panel_width == 0 {
            return Err(NavError::InvalidConfig {
                message: "min_one_panel_width must be greater than zero".to_string(),
            });
        }
        if self.prefix.ends_with('/') {
            return Err(NavError::InvalidConfig {
                message: format!("prefix '{}' must not end with '/'", self.prefix),
            });
        }
        Ok(())
    }
}
