//! Application settings and config file loading.
//!
//! Defaults root the data directory under the user's documents folder; an
//! optional `config.toml` inside the data directory overrides filenames and
//! report defaults, and the `--data-dir` flag overrides the location itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_DATABASE_FILENAME: &str = "registry.db";
pub const DEFAULT_ATTACHMENTS_SUBDIR: &str = "attachments";
pub const DEFAULT_CONTRACTS_FOLDER: &str = "Contracts";
pub const DEFAULT_EXPIRY_THRESHOLD_DAYS: i64 = 30;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside the data directory.
    pub database_filename: String,
    /// Attachment directory name inside the data directory.
    pub attachments_subdir: String,
    /// Top-level folder the expiry report scans.
    pub contracts_folder: String,
    /// Default threshold for the expiry report, in days.
    pub expiry_threshold_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: documents dir -> home dir -> current dir.
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docregistry");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            attachments_subdir: DEFAULT_ATTACHMENTS_SUBDIR.to_string(),
            contracts_folder: DEFAULT_CONTRACTS_FOLDER.to_string(),
            expiry_threshold_days: DEFAULT_EXPIRY_THRESHOLD_DAYS,
        }
    }
}

/// Optional overrides read from `config.toml` in the data directory.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database_filename: Option<String>,
    attachments_subdir: Option<String>,
    contracts_folder: Option<String>,
    expiry_threshold_days: Option<i64>,
}

impl Settings {
    /// Resolve settings from defaults, the data-dir override, and the
    /// config file (when present).
    pub fn load(data_dir_override: Option<&str>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(dir) = data_dir_override {
            settings.data_dir = PathBuf::from(shellexpand::tilde(dir).into_owned());
        }

        let config_path = settings.data_dir.join(CONFIG_FILENAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)?;
            let file: ConfigFile = toml::from_str(&raw)?;
            if let Some(filename) = file.database_filename {
                settings.database_filename = filename;
            }
            if let Some(subdir) = file.attachments_subdir {
                settings.attachments_subdir = subdir;
            }
            if let Some(folder) = file.contracts_folder {
                settings.contracts_folder = folder;
            }
            if let Some(days) = file.expiry_threshold_days {
                settings.expiry_threshold_days = days;
            }
        }

        Ok(settings)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.data_dir.join(&self.attachments_subdir)
    }

    /// Create the data and attachment directories if missing.
    pub fn ensure_directories(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.attachments_dir())?;
        Ok(())
    }

    /// Settings rooted at an explicit directory.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            ..Self::default()
        }
    }
}
