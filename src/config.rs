//! Connection-string configuration providers.
//!
//! # Responsibility
//! - Resolve named connection strings for repository subtypes.
//! - Load connection-string maps from JSON configuration files.
//!
//! # Invariants
//! - A missing key is a fatal configuration error; providers never guess or
//!   fall back to a default database.

use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration error taxonomy: surfaced immediately, never retried.
#[derive(Debug)]
pub enum ConfigError {
    /// No connection string registered under the requested key.
    MissingConnectionString { key: String },
    /// Configuration file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration file is not valid JSON of the expected shape.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingConnectionString { key } => {
                write!(f, "no connection string configured for key `{key}`")
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "failed to read configuration file `{}`: {source}",
                    path.display()
                )
            }
            Self::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse configuration file `{}`: {source}",
                    path.display()
                )
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingConnectionString { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Provider contract: key to connection string, one lookup per call.
pub trait ConnectionStrings {
    fn connection_string(&self, key: &str) -> Option<String>;
}

/// In-memory provider for tests and embedding hosts.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    entries: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection string, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl ConnectionStrings for MapConfig {
    fn connection_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    connection_strings: HashMap<String, String>,
}

/// JSON-file-backed provider.
///
/// Expected shape:
/// `{ "connection_strings": { "<key>": "<path or :memory:>" } }`
#[derive(Debug, Clone)]
pub struct FileConfig {
    entries: HashMap<String, String>,
}

impl FileConfig {
    /// Loads and parses a configuration file.
    ///
    /// # Errors
    /// - `Io` when the file cannot be read.
    /// - `Parse` when the contents are not the expected JSON shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: ConfigFile =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            entries: parsed.connection_strings,
        })
    }
}

impl ConnectionStrings for FileConfig {
    fn connection_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}
