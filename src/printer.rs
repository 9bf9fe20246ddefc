//! Fixed-width text rendering of result tables.

use crate::table::ResultTable;
use std::fmt::Write;

/// Default field width, in characters.
pub const DEFAULT_COLUMN_WIDTH: usize = 15;

/// Renders a table as a header line, a blank line, then one line per row.
///
/// Every field is left-justified and padded to `width` characters. Longer
/// values are printed in full, pushing the rest of the line to the right.
pub fn render(table: &ResultTable, width: usize) -> String {
    let mut out = String::new();

    for column in table.columns() {
        push_field(&mut out, column, width);
    }
    out.push_str("\n\n");

    for row in table.rows() {
        for field in row {
            push_field(&mut out, field, width);
        }
        out.push('\n');
    }

    out
}

fn push_field(out: &mut String, value: &str, width: usize) {
    // Writing into a String cannot fail.
    let _ = write!(out, "{value:<width$}");
}
