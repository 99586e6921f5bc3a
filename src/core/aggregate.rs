//! Per-destination totals
//!
//! Rows are expected sorted by distance so that every destination forms one
//! contiguous run with a single distance. The totals are computed in one pass
//! and rendered as one spanning cell per run.

use super::binder::{add_cell, add_column_header};
use super::extract::{get_price, parse_range};
use super::metrics::{format_amount, format_fixed, round_to};
use crate::types::{ColumnIndex, DestinationGroup, Highlight, Row, Table};
use serde::Serialize;
use std::collections::HashMap;

pub const AGGREGATE_HEADER: &str = "Total per destination";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    /// Groups in order of first appearance
    pub groups: Vec<DestinationGroup>,
    /// Best sum per NM over all groups, `None` when no group has a number
    pub max_per_range: Option<f64>,
}

impl Aggregation {
    pub fn group(&self, destination: &str) -> Option<&DestinationGroup> {
        self.groups.iter().find(|g| g.destination == destination)
    }

    /// Ties with the maximum count as maximum
    pub fn highlight(&self, group: &DestinationGroup) -> Highlight {
        match self.max_per_range {
            Some(max) if group.per_range == max => Highlight::Max,
            _ => Highlight::Other,
        }
    }
}

fn destination_key(row: &Row, column: usize) -> String {
    row.text(column).unwrap_or_default().trim().to_string()
}

/// Sum pay per destination.
///
/// `rows` must already be sorted by the distance column: the sum per NM of a
/// group is recomputed on every row with that row's distance.
pub fn aggregate_destinations(
    rows: &[Row],
    columns: &ColumnIndex,
    destination: usize,
    digits: u32,
) -> Aggregation {
    let mut groups: Vec<DestinationGroup> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = destination_key(row, destination);
        let price = get_price(row.text(columns.pay).unwrap_or_default());
        let range = parse_range(row.text(columns.distance).unwrap_or_default());

        let slot = *by_key.entry(key.clone()).or_insert_with(|| {
            groups.push(DestinationGroup::new(key));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.sum += price;
        group.count += 1;
        group.per_range = round_to(group.sum / range, digits);
    }

    let max_per_range = groups
        .iter()
        .map(|g| g.per_range)
        .filter(|v| !v.is_nan())
        .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))));

    Aggregation {
        groups,
        max_per_range,
    }
}

/// Summary text of one destination group
pub fn summary_text(group: &DestinationGroup, digits: u32) -> String {
    format!(
        "${} from {} assignments (per NM = ${})",
        format_amount(group.sum),
        group.count,
        format_fixed(group.per_range, digits)
    )
}

/// Append the totals column: one spanning cell on the first row of each run
/// of equal destinations, nothing on the rows it covers. Footer rows get no cell.
pub fn render_destination_totals(
    table: &mut Table,
    destination: usize,
    aggregation: &Aggregation,
    digits: u32,
) {
    add_column_header(table, AGGREGATE_HEADER);

    let keys: Vec<String> = table
        .body_rows()
        .iter()
        .map(|row| destination_key(row, destination))
        .collect();

    let rows = table.body_rows_mut();
    let mut start = 0;
    while start < keys.len() {
        let run = keys[start..]
            .iter()
            .take_while(|k| **k == keys[start])
            .count();
        if let Some(group) = aggregation.group(&keys[start]) {
            add_cell(
                &mut rows[start],
                summary_text(group, digits),
                Some(run),
                Some(aggregation.highlight(group)),
            );
        }
        start += run;
    }
}
