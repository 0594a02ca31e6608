//! Capability switches, read from `<config dir>/mdpad/config.toml`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watch the open file and reload it when another program changes it.
    pub watch_files: bool,
    /// Append opened files to the recent-documents list.
    pub recent_documents: bool,
    /// Ask before closing a window with unsaved edits.
    pub confirm_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_files: true,
            recent_documents: true,
            confirm_close: true,
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mdpad").join("config.toml"))
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load the user config, falling back to defaults on any problem.
    pub fn load() -> Self {
        Self::path().map_or_else(Self::default, |path| Self::load_from(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("ignoring config {}: {err}", path.display());
                return Self::default();
            }
        };

        match Self::from_toml(&source) {
            Ok(config) => {
                log::debug!("loaded config from {}: {config:?}", path.display());
                config
            }
            Err(err) => {
                log::warn!("ignoring config {}: {err}", path.display());
                Self::default()
            }
        }
    }
}
