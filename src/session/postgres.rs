//! PostgreSQL session implementation.
//!
//! Provides the `PgSession` struct that implements the `Session` trait
//! over a single sqlx `PgConnection`. Commands go through the simple query
//! protocol, so every field arrives from the server already in text form.

use super::{ConnStatus, Session};
use crate::conninfo::ConnInfo;
use crate::error::PortalError;
use crate::runner::CommandOutcome;
use async_trait::async_trait;
use sqlx::postgres::{
    PgConnectOptions, PgConnection, PgDatabaseError, PgRow, PgSeverity, PgSslMode,
};
use sqlx::{Column, Connection, Executor, Row, Statement};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A session backed by one PostgreSQL connection.
#[derive(Debug)]
pub struct PgSession {
    conn: Option<PgConnection>,
    status: ConnStatus,
    error: Option<String>,
}

impl PgSession {
    /// Parses `descriptor` and connects to the endpoint it names.
    ///
    /// Does not retry. On failure, including a malformed descriptor, the
    /// returned session has status [`ConnStatus::Failed`] and carries the
    /// reason.
    pub async fn open(descriptor: &str) -> Self {
        match ConnInfo::parse(descriptor) {
            Ok(info) => Self::open_with(&info).await,
            Err(PortalError::Config(message)) => Self::failed(message),
            Err(e) => Self::failed(e.to_string()),
        }
    }

    /// Connects to the endpoint described by an already parsed descriptor.
    pub async fn open_with(info: &ConnInfo) -> Self {
        debug!("Connecting to {}", info);

        match connect(info).await {
            Ok(conn) => {
                info!("Connected to {}", info);
                Self {
                    conn: Some(conn),
                    status: ConnStatus::Ok,
                    error: None,
                }
            }
            Err(message) => {
                debug!("Connection failed: {}", message);
                Self::failed(message)
            }
        }
    }

    fn failed(message: String) -> Self {
        Self {
            conn: None,
            status: ConnStatus::Failed,
            error: Some(message),
        }
    }
}

#[async_trait]
impl Session for PgSession {
    fn status(&self) -> ConnStatus {
        self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    async fn exec(&mut self, command: &str) -> CommandOutcome {
        let conn = match self.conn.as_mut() {
            Some(conn) if self.status == ConnStatus::Ok => conn,
            _ => {
                return CommandOutcome::error(
                    self.error
                        .clone()
                        .unwrap_or_else(|| "no connection to the server".to_string()),
                )
            }
        };

        match execute(conn, command).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format_error(&e);
                if is_transport_error(&e) {
                    warn!("Lost connection to the server: {}", message);
                    self.status = ConnStatus::Failed;
                }
                self.error = Some(message.clone());
                CommandOutcome::error(message)
            }
        }
    }

    async fn close(self) {
        if let Some(conn) = self.conn {
            if let Err(e) = conn.close().await {
                debug!("Ignoring error while closing connection: {}", e);
            }
        }
    }
}

/// Establishes the connection, honoring `connect_timeout` when present.
async fn connect(info: &ConnInfo) -> Result<PgConnection, String> {
    let options = connect_options(info)?;
    let connecting = PgConnection::connect_with(&options);

    let result = match info.connect_timeout() {
        Some(limit) => tokio::time::timeout(limit, connecting)
            .await
            .map_err(|_| format!("timeout expired after {} seconds", limit.as_secs()))?,
        None => connecting.await,
    };

    result.map_err(|e| format_error(&e))
}

/// Builds sqlx connect options from a descriptor.
///
/// Keywords that are not given fall back to the `PG*` environment variables
/// and library defaults.
pub(crate) fn connect_options(info: &ConnInfo) -> Result<PgConnectOptions, String> {
    let params = match info {
        ConnInfo::Url(url) => {
            return PgConnectOptions::from_str(url.as_str()).map_err(|e| e.to_string());
        }
        ConnInfo::KeyValue(params) => params,
    };

    let mut options = PgConnectOptions::new();
    for (keyword, value) in params {
        options = match keyword.as_str() {
            "host" | "hostaddr" => options.host(value),
            "port" => {
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port number: \"{value}\""))?;
                options.port(port)
            }
            "dbname" => options.database(value),
            "user" => options.username(value),
            "password" => options.password(value),
            "sslmode" => {
                let mode = PgSslMode::from_str(value)
                    .map_err(|_| format!("invalid sslmode value: \"{value}\""))?;
                options.ssl_mode(mode)
            }
            "sslrootcert" => options.ssl_root_cert(value),
            "application_name" => options.application_name(value),
            "connect_timeout" => options,
            other => return Err(format!("invalid connection option \"{other}\"")),
        };
    }

    Ok(options)
}

/// Runs one command and classifies the response.
async fn execute(conn: &mut PgConnection, command: &str) -> Result<CommandOutcome, sqlx::Error> {
    let rows: Vec<PgRow> = (&mut *conn).fetch_all(sqlx::raw_sql(command)).await?;

    if let Some(first) = rows.first() {
        let columns = column_names(first);
        let rows = rows
            .iter()
            .map(row_to_text)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(CommandOutcome::tuples(columns, rows));
    }

    if !may_return_rows(command) {
        return Ok(CommandOutcome::command_ok());
    }

    // No rows came back. Describe the statement to tell an empty row set
    // (e.g. FETCH on an exhausted cursor) from a plain acknowledgement.
    match (&mut *conn).prepare(command).await {
        Ok(statement) if !statement.columns().is_empty() => {
            let columns = statement
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect();
            Ok(CommandOutcome::tuples(columns, Vec::new()))
        }
        Ok(_) => Ok(CommandOutcome::command_ok()),
        Err(e) => {
            debug!("Could not describe '{}', assuming no rows: {}", command, e);
            Ok(CommandOutcome::command_ok())
        }
    }
}

/// Whether a command can produce a row set, judged by its leading keyword.
///
/// Only these commands are worth describing when no rows come back; the
/// describe would otherwise leave a prepared statement on the server for
/// every BEGIN, DECLARE, CLOSE and END.
fn may_return_rows(command: &str) -> bool {
    let command = command.trim_start().to_ascii_uppercase();
    let keyword = command
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();

    match keyword {
        "FETCH" | "SELECT" | "VALUES" | "TABLE" | "WITH" | "SHOW" | "EXPLAIN" => true,
        "INSERT" | "UPDATE" | "DELETE" | "MERGE" => command.contains("RETURNING"),
        _ => false,
    }
}

fn column_names(row: &PgRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect()
}

/// Reads every field of a text-format row. NULL becomes an empty string.
fn row_to_text(row: &PgRow) -> Result<Vec<String>, sqlx::Error> {
    (0..row.len())
        .map(|i| {
            row.try_get_unchecked::<Option<String>, _>(i)
                .map(Option::unwrap_or_default)
        })
        .collect()
}

/// Determines if an error means the connection itself is gone.
///
/// Besides socket and protocol failures, this covers the server ending the
/// session with a FATAL or PANIC error response, such as when the backend
/// is terminated.
fn is_transport_error(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_error) => db_error
            .try_downcast_ref::<PgDatabaseError>()
            .is_some_and(|pg_error| ends_session(pg_error.severity(), pg_error.code())),
        _ => false,
    }
}

/// Whether a server error with this severity and SQLSTATE closes the session.
///
/// Class 57P is operator intervention: admin or crash shutdown, and the
/// like.
fn ends_session(severity: PgSeverity, code: &str) -> bool {
    matches!(severity, PgSeverity::Fatal | PgSeverity::Panic) || code.starts_with("57P")
}

fn severity_label(severity: PgSeverity) -> &'static str {
    match severity {
        PgSeverity::Panic => "PANIC",
        PgSeverity::Fatal => "FATAL",
        _ => "ERROR",
    }
}

/// Formats an error as a single line, with server detail and hint if available.
fn format_error(error: &sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let pg_error = db_error.try_downcast_ref::<PgDatabaseError>();
    let label = pg_error.map_or("ERROR", |e| severity_label(e.severity()));

    let mut result = format!("{label}: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = pg_error {
        if let Some(detail) = pg_error.detail() {
            result.push_str("  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
