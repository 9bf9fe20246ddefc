//! Mock session for testing.
//!
//! Provides an in-memory session that answers commands from a script,
//! used by the unit tests and by `--mock-db`.

use super::{ConnStatus, Session};
use crate::runner::CommandOutcome;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of what a [`MockSession`] was asked to do.
///
/// Stays readable after the session itself has been consumed by `close`.
#[derive(Debug, Clone, Default)]
pub struct MockSessionLog {
    commands: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl MockSessionLog {
    /// Commands executed so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Number of times the session was closed.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A session that returns predefined results.
///
/// Unless overridden with [`MockSession::with_response`], `FETCH` and
/// `SELECT` commands return the configured table and everything else is
/// acknowledged.
#[derive(Debug)]
pub struct MockSession {
    status: ConnStatus,
    error: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    responses: Vec<(String, CommandOutcome)>,
    log: MockSessionLog,
}

impl MockSession {
    /// Creates a connected mock session with an empty table.
    pub fn new() -> Self {
        Self {
            status: ConnStatus::Ok,
            error: None,
            columns: Vec::new(),
            rows: Vec::new(),
            responses: Vec::new(),
            log: MockSessionLog::default(),
        }
    }

    /// Creates a session that failed to connect.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ConnStatus::Failed,
            error: Some(message.into()),
            ..Self::new()
        }
    }

    /// Creates a session holding a small catalog-like table.
    pub fn sample() -> Self {
        Self::new().with_table(
            &["datname", "datdba", "encoding", "datistemplate"],
            &[
                &["postgres", "10", "6", "f"],
                &["template1", "10", "6", "t"],
                &["template0", "10", "6", "t"],
            ],
        )
    }

    /// Sets the table returned by row-producing commands.
    pub fn with_table(mut self, columns: &[&str], rows: &[&[&str]]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.rows = rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        self
    }

    /// Answers every command starting with `prefix` (case-insensitive) with `outcome`.
    ///
    /// Earlier overrides win over later ones.
    pub fn with_response(mut self, prefix: &str, outcome: CommandOutcome) -> Self {
        self.responses.push((prefix.to_uppercase(), outcome));
        self
    }

    /// Returns a handle for inspecting the session after it is closed.
    pub fn log(&self) -> MockSessionLog {
        self.log.clone()
    }

    fn respond(&self, command: &str) -> CommandOutcome {
        let upper = command.trim_start().to_uppercase();

        if let Some((_, outcome)) = self
            .responses
            .iter()
            .find(|(prefix, _)| upper.starts_with(prefix.as_str()))
        {
            return outcome.clone();
        }

        if upper.starts_with("FETCH") || upper.starts_with("SELECT") {
            CommandOutcome::tuples(self.columns.clone(), self.rows.clone())
        } else {
            CommandOutcome::command_ok()
        }
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Session for MockSession {
    fn status(&self) -> ConnStatus {
        self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    async fn exec(&mut self, command: &str) -> CommandOutcome {
        if let Ok(mut commands) = self.log.commands.lock() {
            commands.push(command.to_string());
        }

        if self.status == ConnStatus::Failed {
            return CommandOutcome::error(
                self.error
                    .clone()
                    .unwrap_or_else(|| "no connection to the server".to_string()),
            );
        }

        let outcome = self.respond(command);
        if let Some(message) = outcome.error_message() {
            self.error = Some(message.to_string());
        }
        outcome
    }

    async fn close(self) {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
    }
}
