//! Command execution and outcome classification.
//!
//! Every command sent over a [`Session`] produces a [`CommandOutcome`]. The
//! helpers here decide what to do with an outcome whose status is not the one
//! a step needs: required steps fail the sequence, teardown steps only log.

use crate::error::{PortalError, Result};
use crate::session::Session;
use std::fmt;
use tracing::{debug, warn};

/// Classified status of one executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// The command completed and returned no row description.
    CommandOk,
    /// The command returned a (possibly empty) set of rows.
    TuplesOk,
    /// The server or the transport reported an error.
    Error,
}

impl ExecStatus {
    /// Returns the status as a short label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommandOk => "command-ok",
            Self::TuplesOk => "tuples-ok",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column names and text rows carried by a tuples-ok outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Tuples {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

/// The result of executing a single command.
///
/// An outcome owns everything the server sent back for the command and is
/// released when dropped or consumed by [`crate::table::materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    status: ExecStatus,
    error_message: Option<String>,
    tuples: Option<Tuples>,
}

impl CommandOutcome {
    /// An acknowledgement with no rows.
    pub fn command_ok() -> Self {
        Self {
            status: ExecStatus::CommandOk,
            error_message: None,
            tuples: None,
        }
    }

    /// A row-returning outcome. `rows` may be empty.
    pub fn tuples(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            status: ExecStatus::TuplesOk,
            error_message: None,
            tuples: Some(Tuples { columns, rows }),
        }
    }

    /// A failed command.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Error,
            error_message: Some(message.into()),
            tuples: None,
        }
    }

    pub fn status(&self) -> ExecStatus {
        self.status
    }

    /// The error text, present only when the status is [`ExecStatus::Error`].
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Number of rows carried, zero for non-tuples outcomes.
    pub fn row_count(&self) -> usize {
        self.tuples.as_ref().map_or(0, |t| t.rows.len())
    }

    pub(crate) fn into_tuples(self) -> Option<Tuples> {
        self.tuples
    }
}

/// Sends one command and returns its classified outcome.
///
/// Never retries. Transport failures are reported by the session as an
/// error outcome.
pub async fn run<S: Session>(session: &mut S, command: &str) -> CommandOutcome {
    debug!("Executing: {}", command);
    let outcome = session.exec(command).await;
    debug!(
        "{} -> {} ({} rows)",
        command,
        outcome.status(),
        outcome.row_count()
    );
    outcome
}

/// Runs a command that must finish with `expected`.
///
/// Any other status becomes a [`PortalError::Command`] labelled with `step`.
pub async fn run_expecting<S: Session>(
    session: &mut S,
    step: &str,
    command: &str,
    expected: ExecStatus,
) -> Result<CommandOutcome> {
    let outcome = run(session, command).await;
    if outcome.status() == expected {
        return Ok(outcome);
    }

    let message = outcome.error_message().map(str::to_string);
    Err(PortalError::command(step, expected, outcome.status(), message))
}

/// Runs a teardown command whose failure must not affect the result.
pub async fn run_best_effort<S: Session>(session: &mut S, command: &str) {
    let outcome = run(session, command).await;
    if outcome.status() != ExecStatus::CommandOk {
        warn!(
            "Ignoring failure of '{}': {}",
            command,
            outcome.error_message().unwrap_or(outcome.status().as_str())
        );
    }
}
