//! Sorting collaborator
//!
//! On the live site the table is sorted by a third-party sorting widget that
//! gives no completion callback. Here the collaborator exposes the completion
//! as the future returned by [`SortCollaborator::sort`]; callers bound it with
//! a timeout.

use super::extract::parse_range;
use crate::error::EnhanceResult;
use crate::types::{SortOrder, Table};
use async_trait::async_trait;
use std::cmp::Ordering;

#[async_trait]
pub trait SortCollaborator: Send + Sync {
    /// Sort the body rows of `table` ascending by `column`; footer rows stay put.
    ///
    /// Resolves once the sort is done and the header of `column` carries the
    /// ascending marker.
    async fn sort(&self, table: &mut Table, column: usize) -> EnhanceResult<()>;

    /// Pick up columns added since the table was first seen
    fn refresh(&self, table: &mut Table);
}

/// Sorts in place, numerically, keeping rows without a number at the end
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessSorter;

impl InProcessSorter {
    fn compare(a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }
}

#[async_trait]
impl SortCollaborator for InProcessSorter {
    async fn sort(&self, table: &mut Table, column: usize) -> EnhanceResult<()> {
        table.body_rows_mut().sort_by(|a, b| {
            let left = parse_range(a.text(column).unwrap_or_default());
            let right = parse_range(b.text(column).unwrap_or_default());
            Self::compare(left, right)
        });

        if let Some(header) = table.header_mut() {
            for (index, cell) in header.cells.iter_mut().enumerate() {
                cell.sort = (index == column).then_some(SortOrder::Ascending);
            }
        }
        Ok(())
    }

    fn refresh(&self, table: &mut Table) {
        table.refreshed = true;
    }
}
