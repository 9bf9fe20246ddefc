//! Session abstraction for pgportal.
//!
//! A session is one exclusive connection to a database endpoint. The trait
//! keeps the command sequence independent of the backend, so the same
//! sequence runs against PostgreSQL or the in-memory mock.

mod mock;
mod postgres;

pub use mock::{MockSession, MockSessionLog};
pub use postgres::PgSession;

use crate::runner::CommandOutcome;
use async_trait::async_trait;

/// Connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnStatus {
    Ok,
    Failed,
}

/// Trait defining the interface for database sessions.
///
/// Opening is backend-specific and never fails outright: a session that
/// could not connect reports [`ConnStatus::Failed`] and can only be closed.
#[async_trait]
pub trait Session: Send {
    /// Returns the current connection status.
    fn status(&self) -> ConnStatus;

    /// Returns the most recent error reported by the session, if any.
    fn error_message(&self) -> Option<&str>;

    /// Sends one command and waits for the server to finish with it.
    async fn exec(&mut self, command: &str) -> CommandOutcome;

    /// Closes the session and releases its resources.
    ///
    /// Takes the session by value so it cannot be closed twice. Errors while
    /// closing are not reported.
    async fn close(self);
}
