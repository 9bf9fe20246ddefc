//! Configuration management for pgportal.
//!
//! Handles loading configuration from a TOML file with named connections,
//! the default cursor plan, and output settings.

use crate::error::{PortalError, Result};
use crate::printer::DEFAULT_COLUMN_WIDTH;
use crate::sequence::{CursorPlan, DEFAULT_CURSOR, DEFAULT_QUERY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure for pgportal.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Cursor settings.
    #[serde(default)]
    pub cursor: CursorConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Named database connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Cursor name and the query it runs over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorConfig {
    #[serde(default = "default_cursor_name")]
    pub name: String,

    #[serde(default = "default_query")]
    pub query: String,
}

fn default_cursor_name() -> String {
    DEFAULT_CURSOR.to_string()
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            name: default_cursor_name(),
            query: default_query(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Width each field is padded to.
    #[serde(default = "default_column_width")]
    pub column_width: usize,
}

fn default_column_width() -> usize {
    DEFAULT_COLUMN_WIDTH
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            column_width: default_column_width(),
        }
    }
}

/// A named database connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Keyword/value descriptor or connection URL.
    pub conninfo: String,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pgportal")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PortalError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    ///
    /// Errors are reported on one line as `<path>:<line>: <message>`.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            let message = e.message().split_whitespace().collect::<Vec<_>>().join(" ");
            let location = match e.span() {
                Some(span) => {
                    let before = &content.as_bytes()[..span.start.min(content.len())];
                    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
                    format!("{}:{}", path.display(), line)
                }
                None => path.display().to_string(),
            };
            PortalError::config(format!("{location}: {message}"))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }

    /// Returns the cursor plan described by the file.
    pub fn cursor_plan(&self) -> CursorPlan {
        CursorPlan {
            cursor: self.cursor.name.clone(),
            query: self.cursor.query.clone(),
            column_width: self.output.column_width,
        }
    }
}
