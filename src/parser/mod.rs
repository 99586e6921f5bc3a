//! Page parsing and table location
//!
//! Turns a saved FS Economy page into [`Table`]s and picks out the ones the
//! engine works on.

use crate::error::{EnhanceError, EnhanceResult};
use crate::types::{Cell, Row, Table};
use scraper::{ElementRef, Html, Selector};

/// Parse every `<table>` of a page, in document order.
///
/// Rows follow the DOM `table.rows` order: `<thead>` rows first, then body
/// rows, then `<tfoot>` rows. Rows belonging to nested tables are not counted
/// for the outer table.
pub fn parse_tables(html: &str) -> EnhanceResult<Vec<Table>> {
    let document = Html::parse_document(html);
    let selector = table_selector()?;

    Ok(document
        .select(&selector)
        .enumerate()
        .map(|(position, element)| table_from_element(position, element))
        .collect())
}

pub(crate) fn table_selector() -> EnhanceResult<Selector> {
    Selector::parse("table").map_err(|e| EnhanceError::Parse(format!("table selector: {e}")))
}

/// Keep the tables carrying one of `recognized` classes and at least one row
pub fn locate_tables(tables: Vec<Table>, recognized: &[String]) -> Vec<Table> {
    tables
        .into_iter()
        .filter(|table| is_candidate(table, recognized))
        .collect()
}

pub fn is_candidate(table: &Table, recognized: &[String]) -> bool {
    if table.row_count() == 0 {
        return false;
    }
    table.kind(recognized).is_some()
}

fn table_from_element(position: usize, element: ElementRef<'_>) -> Table {
    let classes = element.value().classes().map(str::to_string).collect();

    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();
    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => body.push(child),
            "thead" => head.extend(section_rows(child)),
            "tbody" => body.extend(section_rows(child)),
            "tfoot" => foot.extend(section_rows(child)),
            _ => {}
        }
    }

    let footer_len = foot.len();
    let rows = head
        .into_iter()
        .chain(body)
        .chain(foot)
        .enumerate()
        .map(|(index, tr)| row_from_element(index, tr))
        .collect();

    let mut table = Table::new(position, classes, rows);
    table.id = element.value().attr("id").map(str::to_string);
    table.footer_len = footer_len;
    table
}

fn section_rows(section: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "tr")
        .collect()
}

fn row_from_element(index: usize, tr: ElementRef<'_>) -> Row {
    let cells = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| matches!(child.value().name(), "td" | "th"))
        .map(|cell| {
            let mut parsed = Cell::new(cell.text().collect::<String>());
            parsed.numeric = cell.value().classes().any(|c| c == "numeric");
            parsed
        })
        .collect();
    Row::new(index, cells)
}
