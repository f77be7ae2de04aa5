//! Corpus configuration.
//!
//! # Responsibility
//! - Load the JSON config naming the corpus root and its areas.
//! - Map human area names to their storage directory names.
//!
//! # Invariants
//! - A loaded config always has a non-empty repo path and at least one area.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::repo::layout::CorpusLayout;

const DEFAULT_CONFIG_DIR: &str = ".config/execution-system-mcp";
const DEFAULT_CONFIG_FILE: &str = "config.json";

/// One area of focus, e.g. `{"name": "Health", "kebab": "health"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    pub kebab: String,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecConfig {
    execution_system_repo_path: PathBuf,
    areas: Vec<AreaConfig>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_dir: Option<String>,
}

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    /// No config file at the resolved path.
    Missing(PathBuf),
    /// The file exists but cannot be read.
    Io { path: PathBuf, source: io::Error },
    /// The file is not valid JSON for the config shape.
    Parse { path: PathBuf, source: serde_json::Error },
    /// Parsed but semantically unusable.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => {
                write!(f, "configuration file not found: {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "failed to read configuration `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid configuration JSON `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "configuration error: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ExecConfig {
    /// Loads and validates the config at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Loads `$HOME/.config/execution-system-mcp/config.json`.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(default_config_path()?)
    }

    /// Parses and validates config JSON text.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.execution_system_repo_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "execution_system_repo_path must not be empty".to_string(),
            ));
        }
        if self.areas.is_empty() {
            return Err(ConfigError::Invalid("areas must be non-empty".to_string()));
        }
        for area in &self.areas {
            if area.name.trim().is_empty() || area.kebab.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "every area needs a non-empty name and kebab".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn repo_path(&self) -> &Path {
        &self.execution_system_repo_path
    }

    pub fn areas(&self) -> &[AreaConfig] {
        &self.areas
    }

    /// Case-insensitive lookup from area name to its directory name.
    pub fn find_area_kebab(&self, area_name: &str) -> Option<&str> {
        let wanted = area_name.trim().to_lowercase();
        self.areas
            .iter()
            .find(|area| area.name.to_lowercase() == wanted)
            .map(|area| area.kebab.as_str())
    }

    /// Reverse lookup from directory name to display name.
    pub fn area_name(&self, kebab: &str) -> Option<&str> {
        self.areas
            .iter()
            .find(|area| area.kebab == kebab)
            .map(|area| area.name.as_str())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.log_dir.as_deref()
    }

    /// Path layout rooted at the configured repo.
    pub fn layout(&self) -> CorpusLayout {
        CorpusLayout::new(self.execution_system_repo_path.clone())
    }
}

/// Resolves the default config location from `$HOME`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::Invalid("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home)
        .join(DEFAULT_CONFIG_DIR)
        .join(DEFAULT_CONFIG_FILE))
}
