//! The cursor sequence.
//!
//! Runs `BEGIN`, declares a cursor over a query, fetches all of its rows,
//! renders them, then closes the cursor and ends the transaction. The
//! session is closed exactly once whichever step fails.

use crate::error::{PortalError, Result};
use crate::printer::{self, DEFAULT_COLUMN_WIDTH};
use crate::runner::{run_best_effort, run_expecting, ExecStatus};
use crate::session::{ConnStatus, Session};
use crate::table::materialize;
use tracing::{debug, info};

/// Cursor name used when none is configured.
pub const DEFAULT_CURSOR: &str = "myportal";

/// Query the cursor runs over when none is configured.
pub const DEFAULT_QUERY: &str = "select * from pg_database";

/// Longest identifier PostgreSQL keeps without truncating.
const MAX_IDENTIFIER_LEN: usize = 63;

/// What to fetch and how to print it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPlan {
    pub cursor: String,
    pub query: String,
    pub column_width: usize,
}

impl Default for CursorPlan {
    fn default() -> Self {
        Self {
            cursor: DEFAULT_CURSOR.to_string(),
            query: DEFAULT_QUERY.to_string(),
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl CursorPlan {
    /// Creates a plan for `query` using the default cursor name and width.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Checks that the cursor name can be spliced into commands unquoted.
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.cursor.chars();
        let starts_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

        if !starts_ok || !rest_ok || self.cursor.len() > MAX_IDENTIFIER_LEN {
            return Err(PortalError::config(format!(
                "Invalid cursor name '{}': expected a plain SQL identifier",
                self.cursor
            )));
        }

        if self.query.trim().is_empty() {
            return Err(PortalError::config("Cursor query must not be empty"));
        }

        Ok(())
    }

    fn declare_command(&self) -> String {
        format!("DECLARE {} CURSOR FOR {}", self.cursor, self.query)
    }

    fn fetch_command(&self) -> String {
        format!("FETCH ALL in {}", self.cursor)
    }

    fn close_command(&self) -> String {
        format!("CLOSE {}", self.cursor)
    }
}

/// Runs the full sequence over `session` and returns the rendered table.
///
/// The session is consumed and closed before returning, on success and on
/// every failure path. A session that failed to open yields
/// [`PortalError::Connection`].
pub async fn run_cursor<S: Session>(mut session: S, plan: &CursorPlan) -> Result<String> {
    let result = fetch_through_cursor(&mut session, plan).await;

    debug!("Closing session");
    session.close().await;

    result
}

async fn fetch_through_cursor<S: Session>(session: &mut S, plan: &CursorPlan) -> Result<String> {
    if session.status() != ConnStatus::Ok {
        return Err(PortalError::connection(
            session.error_message().unwrap_or("unknown error"),
        ));
    }
    plan.validate()?;

    // Cursors only live inside a transaction block.
    run_expecting(session, "BEGIN command", "BEGIN", ExecStatus::CommandOk).await?;
    run_expecting(
        session,
        "DECLARE CURSOR",
        &plan.declare_command(),
        ExecStatus::CommandOk,
    )
    .await?;
    let outcome = run_expecting(
        session,
        "FETCH ALL",
        &plan.fetch_command(),
        ExecStatus::TuplesOk,
    )
    .await?;

    let table = materialize(outcome)?;
    info!(
        "Fetched {} rows, {} columns from cursor {}",
        table.row_count(),
        table.columns().len(),
        plan.cursor
    );
    let rendered = printer::render(&table, plan.column_width);

    // Teardown is best-effort; errors here never change the result.
    run_best_effort(session, &plan.close_command()).await;
    run_best_effort(session, "END").await;

    Ok(rendered)
}
