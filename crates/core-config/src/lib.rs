//! Configuration loading and parsing.
//!
//! Parses `lineledger.toml` (or an override path supplied by the embedder):
//!
//! ```toml
//! [editor]
//! tab_width = 8
//!
//! [undo]
//! max_records = 1000
//! ```
//!
//! Missing files, unreadable files and parse errors all fall back to defaults.
//! Unknown fields are ignored. A `tab_width` of 0 is corrected to 1 when the
//! effective value is requested.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Name of the configuration file looked up by `discover`.
pub const CONFIG_FILE_NAME: &str = "lineledger.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_width")]
    pub tab_width: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
        }
    }
}

impl EditorConfig {
    const fn default_tab_width() -> usize {
        8
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UndoConfig {
    /// Maximum number of undoable records kept; 0 keeps everything.
    #[serde(default = "UndoConfig::default_max_records")]
    pub max_records: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_records: Self::default_max_records(),
        }
    }
}

impl UndoConfig {
    const fn default_max_records() -> usize {
        1000
    }

    pub const fn unlimited() -> Self {
        Self { max_records: 0 }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("lineledger").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Config::from_toml_str(&content)),
        Err(_) => {
            info!(target: "config", path = %path.display(), "config_missing_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Parse configuration text; malformed input yields defaults.
    pub fn from_toml_str(content: &str) -> Self {
        match toml::from_str::<ConfigFile>(content) {
            Ok(file) => Self {
                raw: Some(content.to_string()),
                file,
            },
            Err(e) => {
                warn!(target: "config", error = %e, "config_parse_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Tab width clamped to at least 1.
    pub fn effective_tab_width(&self) -> usize {
        let raw = self.file.editor.tab_width;
        if raw == 0 {
            warn!(target: "config", raw, clamped = 1, "tab_width_clamped");
            return 1;
        }
        raw
    }

    pub fn undo(&self) -> &UndoConfig {
        &self.file.undo
    }
}
