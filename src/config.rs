//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/currimap/currimap.toml`
//! 3. Environment variables: `CURRIMAP_*` prefix

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// User-tunable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for `responses_<epoch>` capture folders
    pub capture_dir: PathBuf,
    /// Directory export artifacts are written to
    pub output_dir: PathBuf,
    /// Default sort directive: none | asc | desc
    pub sort: String,
    /// Default output format directive: csv | workbook
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capture_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            sort: "none".to_string(),
            format: "csv".to_string(),
        }
    }
}

/// Path of the global config file, when a home directory exists.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "currimap").map(|dirs| dirs.config_dir().join("currimap.toml"))
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path));
            }
        }

        builder = builder.add_source(Environment::with_prefix("CURRIMAP"));

        let loaded: Settings = builder.build()?.try_deserialize()?;
        Ok(loaded)
    }

    /// TOML template written by `config init`.
    pub fn template(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
