//! Materialized query results.
//!
//! A [`ResultTable`] is the read-only, all-text form of a tuples-ok outcome.

use crate::error::{PortalError, Result};
use crate::runner::{CommandOutcome, ExecStatus};

/// Column names and rows of text fields, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Creates a table, checking that every row is as wide as the column list.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(PortalError::invalid_state(format!(
                "row {} has {} fields but the result has {} columns",
                index,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Column names; duplicates are allowed.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Converts a tuples-ok outcome into a [`ResultTable`], consuming it.
///
/// Calling this on any other outcome is a programming error and returns
/// [`PortalError::InvalidState`].
pub fn materialize(outcome: CommandOutcome) -> Result<ResultTable> {
    let status = outcome.status();
    if status != ExecStatus::TuplesOk {
        return Err(PortalError::invalid_state(format!(
            "cannot materialize a {status} outcome"
        )));
    }

    let tuples = outcome
        .into_tuples()
        .ok_or_else(|| PortalError::invalid_state("tuples-ok outcome carries no tuples"))?;
    ResultTable::new(tuples.columns, tuples.rows)
}
