//! Per-row metric: pay per distance unit per passenger or cargo unit

use super::binder::{add_cell, add_column_header};
use super::extract::{get_price, parse_cargo, parse_range};
use crate::config::EngineConfig;
use crate::types::{CargoDescriptor, ColumnIndex, Table};
use serde::Serialize;
use tracing::{debug, warn};

pub const METRIC_HEADER: &str = "Price per nm/qty";

/// A rounded metric and the number of decimals it was rounded to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub value: f64,
    pub digits: u32,
}

impl Metric {
    /// Currency-prefixed display text, `$NaN` for a missing metric
    pub fn display(metric: Option<Metric>) -> String {
        match metric {
            Some(m) => format!("${}", format_fixed(m.value, m.digits)),
            None => "$NaN".to_string(),
        }
    }
}

/// What the engine computed for one data row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMetric {
    /// Row index as parsed
    pub row: usize,
    pub quantity: f64,
    pub passengers: bool,
    pub range: f64,
    pub price: f64,
    pub metric: Option<Metric>,
    pub display: String,
}

/// Round half up to `digits` decimals
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Fixed-decimal formatting, with the browser's spelling for non-finite values
pub fn format_fixed(value: f64, digits: u32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{:.*}", digits as usize, value)
    }
}

/// Shortest formatting of an amount: `60`, `60.5`
pub fn format_amount(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        format_fixed(value, 0)
    }
}

fn truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// `price / quantity / range` rounded per config.
///
/// Returns `None` when any input is zero or not a number. With
/// `minimum_nonzero_precision` the number of decimals grows until the rounded
/// value is nonzero or `max_rounding_digits` is reached.
pub fn compute_metric(
    price: f64,
    quantity: f64,
    range: f64,
    config: &EngineConfig,
) -> Option<Metric> {
    if !(truthy(quantity) && truthy(range) && truthy(price)) {
        return None;
    }

    let raw = price / quantity / range;
    let mut digits = config.default_rounding_digits;
    let mut value = round_to(raw, digits);
    if config.minimum_nonzero_precision {
        while value == 0.0 && digits < config.max_rounding_digits {
            digits += 1;
            value = round_to(raw, digits);
        }
    }
    Some(Metric { value, digits })
}

/// Append the metric column to `table` and return what was computed per row.
///
/// Weight-based cargo cells get a ` (<n> passengers)` note appended.
pub fn apply_row_metrics(
    table: &mut Table,
    columns: &ColumnIndex,
    config: &EngineConfig,
) -> Vec<RowMetric> {
    add_column_header(table, METRIC_HEADER);

    let mut results = Vec::with_capacity(table.data_rows().len());
    for row in table.data_rows_mut() {
        let cargo_text = row.text(columns.cargo).unwrap_or_default();
        let cargo = parse_cargo(cargo_text).unwrap_or_else(|e| {
            warn!(row = row.index, error = %e, "cargo cell not understood, counting one unit");
            CargoDescriptor::Absent
        });

        let quantity = cargo.quantity(config.man_weight_kg);
        if cargo.is_weight() {
            if let Some(cell) = row.cells.get_mut(columns.cargo) {
                cell.text.push_str(&format!(" ({quantity} passengers)"));
            }
        }

        let range = parse_range(row.text(columns.distance).unwrap_or_default());
        let price = get_price(row.text(columns.pay).unwrap_or_default());
        debug!(
            row = row.index,
            passengers = cargo.is_weight(),
            quantity,
            range,
            price,
            "row inputs"
        );

        let metric = compute_metric(price, quantity, range, config);
        let display = Metric::display(metric);
        add_cell(row, display.clone(), None, None);

        results.push(RowMetric {
            row: row.index,
            quantity,
            passengers: cargo.is_weight(),
            range,
            price,
            metric,
            display,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Row;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn two_decimals() -> EngineConfig {
        EngineConfig {
            minimum_nonzero_precision: false,
            ..EngineConfig::default()
        }
    }

    fn columns() -> ColumnIndex {
        ColumnIndex {
            pay: 0,
            distance: 1,
            cargo: 2,
            destination: None,
        }
    }

    fn table(rows: &[[&str; 3]]) -> Table {
        let mut all = vec![Row::from_texts(0, &["Pay", "NM", "Cargo"])];
        for (i, r) in rows.iter().enumerate() {
            all.push(Row::from_texts(i + 1, r));
        }
        Table::new(0, vec!["assignmentTable".to_string()], all)
    }

    #[test]
    fn test_compute_metric_basic() {
        let m = compute_metric(100.0, 2.0, 50.0, &config()).unwrap();
        assert_eq!(m.value, 1.0);
        assert_eq!(Metric::display(Some(m)), "$1.00");
    }

    #[test]
    fn test_compute_metric_zero_price_is_nan() {
        let m = compute_metric(0.0, 2.0, 50.0, &config());
        assert!(m.is_none());
        assert_eq!(Metric::display(m), "$NaN");
    }

    #[test]
    fn test_compute_metric_nan_range_is_nan() {
        assert!(compute_metric(100.0, 1.0, f64::NAN, &config()).is_none());
    }

    #[test]
    fn test_compute_metric_escalates_precision() {
        let m = compute_metric(1.0, 1.0, 1_000_000.0, &config()).unwrap();
        assert_eq!(m.digits, 6);
        assert_eq!(Metric::display(Some(m)), "$0.000001");
    }

    #[test]
    fn test_compute_metric_fixed_precision_can_round_to_zero() {
        let m = compute_metric(1.0, 1.0, 1_000_000.0, &two_decimals()).unwrap();
        assert_eq!(Metric::display(Some(m)), "$0.00");
    }

    #[test]
    fn test_compute_metric_precision_is_bounded() {
        let cfg = EngineConfig {
            max_rounding_digits: 4,
            ..EngineConfig::default()
        };
        let m = compute_metric(1.0, 1.0, 1e9, &cfg).unwrap();
        assert_eq!(m.digits, 4);
        assert_eq!(m.value, 0.0);
    }

    #[test]
    fn test_round_to_half_up() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(60.0), "60");
        assert_eq!(format_amount(60.5), "60.5");
        assert_eq!(format_amount(f64::NAN), "NaN");
    }

    #[test]
    fn test_apply_row_metrics_passengers() {
        let mut t = table(&[["$1,540", "100", "150kg Passengers"]]);
        let results = apply_row_metrics(&mut t, &columns(), &config());

        assert_eq!(t.rows[0].text(3), Some(METRIC_HEADER));
        assert_eq!(t.rows[1].text(2), Some("150kg Passengers (2 passengers)"));
        assert_eq!(t.rows[1].text(3), Some("$7.70"));
        assert!(t.rows[1].cells[3].numeric);
        assert_eq!(results[0].quantity, 2.0);
        assert!(results[0].passengers);
    }

    #[test]
    fn test_apply_row_metrics_counts_and_absent() {
        let mut t = table(&[
            ["$500", "50", "5 Crates"],
            ["$500", "50", "Package"],
        ]);
        let results = apply_row_metrics(&mut t, &columns(), &config());
        assert_eq!(t.rows[1].text(3), Some("$2.00"));
        assert_eq!(t.rows[2].text(3), Some("$10.00"));
        assert_eq!(t.rows[1].text(2), Some("5 Crates"));
        assert_eq!(results[1].quantity, 1.0);
    }

    #[test]
    fn test_apply_row_metrics_malformed_cargo_defaults_to_one() {
        let mut t = table(&[["$100", "10", "kg"]]);
        let results = apply_row_metrics(&mut t, &columns(), &config());
        assert_eq!(results[0].quantity, 1.0);
        assert!(!results[0].passengers);
        assert_eq!(t.rows[1].text(2), Some("kg"));
        assert_eq!(t.rows[1].text(3), Some("$10.00"));
    }

    #[test]
    fn test_apply_row_metrics_non_ascii_weight_defaults_to_one() {
        let mut t = table(&[["$100", "10", "٣٠٠kg Passengers"]]);
        let results = apply_row_metrics(&mut t, &columns(), &config());
        assert_eq!(results[0].quantity, 1.0);
        assert!(!results[0].passengers);
        assert_eq!(t.rows[1].text(2), Some("٣٠٠kg Passengers"));
        assert_eq!(t.rows[1].text(3), Some("$10.00"));
    }

    #[test]
    fn test_apply_row_metrics_missing_values_render_nan() {
        let mut t = table(&[["$0", "10", "1 Box"], ["$10", "", "1 Box"]]);
        apply_row_metrics(&mut t, &columns(), &config());
        assert_eq!(t.rows[1].text(3), Some("$NaN"));
        assert_eq!(t.rows[2].text(3), Some("$NaN"));
    }

    #[test]
    fn test_apply_row_metrics_twice_duplicates_cells() {
        let mut t = table(&[["$100", "10", "1 Box"]]);
        apply_row_metrics(&mut t, &columns(), &config());
        apply_row_metrics(&mut t, &columns(), &config());
        assert_eq!(t.rows[0].len(), 5);
        assert_eq!(t.rows[1].len(), 5);
    }
}
