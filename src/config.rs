//! User settings and the directories they live in
//!
//! Settings are read from `config.json` in the config directory:
//!
//! 1. `INDEPTAX_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/indeptax` on Linux)
//!
//! Every field is optional; command-line flags override the file.

use crate::tax::StatusTablePolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DIR_ENV_VAR: &str = "INDEPTAX_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine a home directory")]
    NoHomeDirectory,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Rate table JSON; the built-in table for the reference year when unset
    #[serde(default)]
    pub rates_file: Option<PathBuf>,

    /// Where yearly data files are kept
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub status_table_policy: StatusTablePolicy,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            rates_file: None,
            data_dir: None,
            status_table_policy: StatusTablePolicy::default(),
            bind_address: default_bind_address(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Resolved locations for settings and data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Paths, ConfigError> {
        if let Ok(custom) = std::env::var(DIR_ENV_VAR) {
            return Ok(Paths::with_base_dir(PathBuf::from(custom)));
        }
        let dirs = ProjectDirs::from("be", "indeptax", "indeptax").ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Paths {
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Settings and data under a single directory
    pub fn with_base_dir(base_dir: PathBuf) -> Paths {
        Paths {
            data_dir: base_dir.join("data"),
            config_dir: base_dir,
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
