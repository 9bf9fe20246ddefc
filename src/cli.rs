//! Command-line argument parsing for pgportal.
//!
//! Uses clap to parse CLI arguments and merges them with the config file.

use crate::config::Config;
use crate::conninfo::DEFAULT_CONNINFO;
use crate::error::{PortalError, Result};
use crate::sequence::CursorPlan;
use clap::Parser;
use std::path::PathBuf;

/// Fetches every row of a query through a server-side cursor and prints it.
#[derive(Parser, Debug)]
#[command(name = "pgportal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Connection descriptor, e.g. "host=localhost dbname=postgres" or postgres://user@host/db
    #[arg(value_name = "CONNINFO")]
    pub conninfo: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", env = "PGPORTAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cursor name
    #[arg(long, value_name = "NAME")]
    pub cursor: Option<String>,

    /// Query the cursor is declared for
    #[arg(short = 'q', long, value_name = "SQL")]
    pub query: Option<String>,

    /// Width each printed field is padded to
    #[arg(short = 'w', long, value_name = "N")]
    pub width: Option<usize>,

    /// Use mock database (in-memory, for testing)
    #[arg(long)]
    pub mock_db: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Picks the connection descriptor with precedence:
    /// 1. Positional CONNINFO (highest)
    /// 2. Named connection from config
    /// 3. Default connection from config
    /// 4. The built-in default descriptor
    pub fn resolve_conninfo(&self, config: &Config) -> Result<String> {
        if let Some(conninfo) = &self.conninfo {
            return Ok(conninfo.clone());
        }

        if let Some(name) = self.connection.as_deref() {
            return config
                .get_connection(Some(name))
                .map(|c| c.conninfo.clone())
                .ok_or_else(|| {
                    PortalError::config(format!("Connection '{name}' not found in config file"))
                });
        }

        Ok(config
            .get_connection(None)
            .map(|c| c.conninfo.clone())
            .unwrap_or_else(|| DEFAULT_CONNINFO.to_string()))
    }

    /// Builds the cursor plan, letting CLI flags override the config file.
    pub fn cursor_plan(&self, config: &Config) -> CursorPlan {
        let mut plan = config.cursor_plan();
        if let Some(cursor) = &self.cursor {
            plan.cursor = cursor.clone();
        }
        if let Some(query) = &self.query {
            plan.query = query.clone();
        }
        if let Some(width) = self.width {
            plan.column_width = width;
        }
        plan
    }
}
