//! Column binding: header lookup and cell injection

use crate::config::ColumnNames;
use crate::types::{Cell, ColumnIndex, Highlight, Row, Table};
use tracing::warn;

/// Index of the first header cell whose text starts with `name`.
///
/// The match is case-sensitive and anchored at the start of the cell text.
/// The scan stops at the last header cell.
pub fn resolve_column(table: &Table, name: &str) -> Option<usize> {
    let found = table
        .header()?
        .cells
        .iter()
        .position(|cell| cell.text.starts_with(name));
    if found.is_none() {
        warn!(table = table.position, column = name, "unable to find column header");
    }
    found
}

/// Resolve every column the engine needs.
///
/// On failure returns the name of the first missing column; what happens to
/// the table then is up to the caller's [`crate::config::MissingColumnPolicy`].
pub fn resolve_columns(
    table: &Table,
    names: &ColumnNames,
    with_destination: bool,
) -> Result<ColumnIndex, String> {
    let find = |name: &str| resolve_column(table, name).ok_or_else(|| name.to_string());

    let pay = find(&names.pay)?;
    let distance = find(&names.distance)?;
    let cargo = find(&names.cargo)?;
    let destination = if with_destination {
        Some(find(&names.destination)?)
    } else {
        None
    };

    Ok(ColumnIndex {
        pay,
        distance,
        cargo,
        destination,
    })
}

/// Append a header cell. No check against existing headers.
pub fn add_column_header(table: &mut Table, label: &str) {
    if let Some(header) = table.header_mut() {
        header.cells.push(Cell::new(label));
    }
}

/// Append a numeric data cell, optionally spanning `span` rows with a highlight
pub fn add_cell(
    row: &mut Row,
    text: impl Into<String>,
    span: Option<usize>,
    highlight: Option<Highlight>,
) {
    let mut cell = Cell::numeric(text);
    cell.row_span = span;
    cell.highlight = highlight;
    row.cells.push(cell);
}
