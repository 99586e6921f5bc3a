//! Per-table orchestration
//!
//! For each located table: resolve columns (or apply the missing-column
//! policy), add the per-row metric, then optionally sort by distance, wait for
//! the sort and add the destination totals.

use super::aggregate::{aggregate_destinations, render_destination_totals};
use super::binder::resolve_columns;
use super::metrics::{apply_row_metrics, RowMetric};
use super::sorter::{InProcessSorter, SortCollaborator};
use crate::config::{EngineConfig, MissingColumnPolicy};
use crate::error::{EnhanceError, EnhanceResult};
use crate::parser;
use crate::types::{ColumnIndex, DestinationGroup, SortOrder, Table};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableStatus {
    Augmented,
    Skipped { missing_column: String },
}

/// Outcome for one located table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: String,
    #[serde(flatten)]
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnIndex>,
    pub rows: Vec<RowMetric>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<DestinationGroup>,
}

impl TableReport {
    fn new(table: &Table, kind: String, status: TableStatus) -> Self {
        Self {
            position: table.position,
            id: table.id.clone(),
            kind,
            status,
            columns: None,
            rows: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn is_augmented(&self) -> bool {
        self.status == TableStatus::Augmented
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnhanceReport {
    pub tables: Vec<TableReport>,
}

impl EnhanceReport {
    pub fn augmented(&self) -> usize {
        self.tables.iter().filter(|t| t.is_augmented()).count()
    }

    pub fn skipped(&self) -> usize {
        self.tables.len() - self.augmented()
    }

    pub fn rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }
}

/// Runs the metric engine over located tables
pub struct Enhancer<S = InProcessSorter> {
    config: EngineConfig,
    sorter: S,
}

impl Enhancer<InProcessSorter> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sorter(config, InProcessSorter)
    }
}

impl<S: SortCollaborator> Enhancer<S> {
    pub fn with_sorter(config: EngineConfig, sorter: S) -> Self {
        Self { config, sorter }
    }

    /// Parse a page, keep the recognized tables and augment them
    pub async fn enhance_html(&self, html: &str) -> EnhanceResult<(Vec<Table>, EnhanceReport)> {
        let mut tables = parser::locate_tables(
            parser::parse_tables(html)?,
            &self.config.recognized_classes,
        );
        let report = self.enhance(&mut tables).await?;
        Ok((tables, report))
    }

    /// Augment tables one after the other.
    ///
    /// Under [`MissingColumnPolicy::Abort`] the first table with a missing
    /// column stops the run; tables before it stay augmented.
    pub async fn enhance(&self, tables: &mut [Table]) -> EnhanceResult<EnhanceReport> {
        let mut report = EnhanceReport::default();
        for table in tables.iter_mut() {
            report.tables.push(self.enhance_table(table).await?);
        }
        info!(
            augmented = report.augmented(),
            skipped = report.skipped(),
            "enhancement done"
        );
        Ok(report)
    }

    pub async fn enhance_table(&self, table: &mut Table) -> EnhanceResult<TableReport> {
        let kind = table
            .kind(&self.config.recognized_classes)
            .map(|k| k.label().to_string())
            .unwrap_or_default();

        let columns = match resolve_columns(
            table,
            &self.config.columns,
            self.config.aggregate_destinations,
        ) {
            Ok(columns) => columns,
            Err(missing) => match self.config.missing_column_policy {
                MissingColumnPolicy::Skip => {
                    info!(table = table.position, column = %missing, "skipping table");
                    return Ok(TableReport::new(
                        table,
                        kind,
                        TableStatus::Skipped {
                            missing_column: missing,
                        },
                    ));
                }
                MissingColumnPolicy::Abort => {
                    return Err(EnhanceError::ColumnNotFound {
                        table: table.position,
                        column: missing,
                    });
                }
            },
        };

        if let Err(msg) = table.validate_widths() {
            warn!(table = table.position, "{}", msg);
        }

        let mut report = TableReport::new(table, kind, TableStatus::Augmented);
        report.columns = Some(columns);
        report.rows = apply_row_metrics(table, &columns, &self.config);

        if let Some(destination) = columns.destination {
            self.sort_by(table, columns.distance).await?;
            let digits = self.config.default_rounding_digits;
            let aggregation =
                aggregate_destinations(table.body_rows(), &columns, destination, digits);
            render_destination_totals(table, destination, &aggregation, digits);
            report.groups = aggregation.groups;
        }

        self.sorter.refresh(table);
        Ok(report)
    }

    /// Ask the collaborator to sort and wait, bounded, until the sort is visible
    async fn sort_by(&self, table: &mut Table, column: usize) -> EnhanceResult<()> {
        let timeout = self.config.sort_timeout();
        let position = table.position;
        tokio::time::timeout(timeout, self.sorter.sort(table, column))
            .await
            .map_err(|_| EnhanceError::SortTimeout {
                table: position,
                timeout,
            })??;

        let marked = table
            .header()
            .and_then(|h| h.cells.get(column))
            .and_then(|c| c.sort)
            == Some(SortOrder::Ascending);
        if !marked {
            return Err(EnhanceError::SortNotObserved {
                table: position,
                column,
            });
        }
        Ok(())
    }
}
