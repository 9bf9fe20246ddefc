//! Connection descriptor parsing.
//!
//! Accepts the two forms PostgreSQL clients understand:
//! keyword/value strings (`host=localhost dbname = postgres`) and
//! `postgres://` / `postgresql://` URLs.

use crate::error::{PortalError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Descriptor used when none is given anywhere.
pub const DEFAULT_CONNINFO: &str = "dbname = postgres";

/// A parsed connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnInfo {
    /// Keyword/value pairs in the order they were written.
    KeyValue(Vec<(String, String)>),
    /// A connection URL.
    Url(Url),
}

impl ConnInfo {
    /// Parses a descriptor, detecting its form from the prefix.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let trimmed = descriptor.trim();
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            Self::parse_url(trimmed)
        } else {
            Self::parse_keyword_value(trimmed)
        }
    }

    fn parse_url(descriptor: &str) -> Result<Self> {
        let url = Url::parse(descriptor)
            .map_err(|e| PortalError::config(format!("Invalid connection URL: {e}")))?;
        Ok(Self::Url(url))
    }

    /// Parses `keyword = value` pairs separated by whitespace.
    ///
    /// Values may be single-quoted; a backslash escapes the next character
    /// both inside and outside quotes.
    fn parse_keyword_value(descriptor: &str) -> Result<Self> {
        let mut params = Vec::new();
        let mut chars = descriptor.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.peek().is_none() {
                break;
            }

            let mut keyword = String::new();
            while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
                keyword.push(c);
            }

            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.next() != Some('=') {
                return Err(PortalError::config(format!(
                    "missing \"=\" after \"{keyword}\" in connection info string"
                )));
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}

            let mut value = String::new();
            if chars.next_if_eq(&'\'').is_some() {
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '\'' => {
                            closed = true;
                            break;
                        }
                        _ => value.push(c),
                    }
                }
                if !closed {
                    return Err(PortalError::config(
                        "unterminated quoted string in connection info string",
                    ));
                }
            } else {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    if c == '\\' {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    } else {
                        value.push(c);
                    }
                }
            }

            params.push((keyword, value));
        }

        Ok(Self::KeyValue(params))
    }

    /// Returns the value of a keyword; the last occurrence wins.
    ///
    /// For URLs only query parameters are searched.
    pub fn get(&self, keyword: &str) -> Option<String> {
        match self {
            Self::KeyValue(params) => params
                .iter()
                .rev()
                .find(|(k, _)| k == keyword)
                .map(|(_, v)| v.clone()),
            Self::Url(url) => url
                .query_pairs()
                .filter(|(k, _)| k == keyword)
                .last()
                .map(|(_, v)| v.into_owned()),
        }
    }

    /// The `connect_timeout` keyword, in whole seconds.
    ///
    /// Zero, negative or unparsable values mean no timeout, as libpq treats them.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.get("connect_timeout")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns a display-safe string (no password) for logs.
    pub fn display_string(&self) -> String {
        match self {
            Self::KeyValue(params) => params
                .iter()
                .map(|(k, v)| {
                    if k == "password" {
                        format!("{k}=****")
                    } else {
                        format!("{k}={v}")
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            Self::Url(url) => {
                let mut redacted = url.clone();
                if redacted.password().is_some() {
                    let _ = redacted.set_password(Some("****"));
                }
                redacted.to_string()
            }
        }
    }
}

impl Default for ConnInfo {
    fn default() -> Self {
        Self::KeyValue(vec![("dbname".to_string(), "postgres".to_string())])
    }
}

impl fmt::Display for ConnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}
