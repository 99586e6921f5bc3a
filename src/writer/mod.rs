//! Output sinks: the saved page with its augmented tables, computed values as JSON

use crate::core::EnhanceReport;
use crate::error::EnhanceResult;
use crate::parser::table_selector;
use crate::types::{Cell, Row, SortOrder, Table};
use scraper::Html;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Escape text for element content and double-quoted attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_cell(out: &mut String, tag: &str, cell: &Cell) {
    let _ = write!(out, "<{tag}");
    if cell.numeric {
        out.push_str(r#" class="numeric""#);
    }
    if let Some(span) = cell.row_span {
        let _ = write!(out, r#" rowspan="{span}""#);
    }
    if let Some(highlight) = cell.highlight {
        let _ = write!(out, r#" style="background-color: {}""#, highlight.color());
    }
    if cell.sort == Some(SortOrder::Ascending) {
        out.push_str(r#" aria-sort="ascending""#);
    }
    let _ = write!(out, ">{}</{tag}>", escape(&cell.text));
}

fn render_section(out: &mut String, tag: &str, rows: &[Row]) {
    let _ = writeln!(out, "  <{tag}>");
    for row in rows {
        out.push_str("    <tr>");
        for cell in &row.cells {
            render_cell(out, "td", cell);
        }
        out.push_str("</tr>\n");
    }
    let _ = writeln!(out, "  </{tag}>");
}

/// One `<table>` element, header row in `<thead>`, footer rows in `<tfoot>`
pub fn render_table(table: &Table) -> String {
    let mut out = String::new();
    out.push_str("<table");
    if let Some(id) = &table.id {
        let _ = write!(out, r#" id="{}""#, escape(id));
    }
    if !table.classes.is_empty() {
        let _ = write!(out, r#" class="{}""#, escape(&table.classes.join(" ")));
    }
    out.push_str(">\n");

    if let Some(header) = table.header() {
        out.push_str("  <thead><tr>");
        for cell in &header.cells {
            render_cell(&mut out, "th", cell);
        }
        out.push_str("</tr></thead>\n");
    }

    render_section(&mut out, "tbody", table.body_rows());
    if !table.footer_rows().is_empty() {
        render_section(&mut out, "tfoot", table.footer_rows());
    }
    out.push_str("</table>\n");
    out
}

/// The saved page with each of `tables` written back in place of the
/// `<table>` at the same position. Everything else is serialized as parsed.
pub fn render_page(page: &str, tables: &[Table]) -> EnhanceResult<String> {
    let document = Html::parse_document(page);
    let selector = table_selector()?;
    let serialized = document.html();

    let mut out = String::with_capacity(serialized.len());
    let mut cursor = 0;
    for (position, element) in document.select(&selector).enumerate() {
        let Some(table) = tables.iter().find(|t| t.position == position) else {
            continue;
        };
        let original = element.html();
        match serialized[cursor..].find(&original) {
            Some(offset) => {
                let start = cursor + offset;
                out.push_str(&serialized[cursor..start]);
                out.push_str(&render_table(table));
                cursor = start + original.len();
            }
            None => warn!(table = position, "table not found in page output, left as parsed"),
        }
    }
    out.push_str(&serialized[cursor..]);
    Ok(out)
}

pub fn render_json(report: &EnhanceReport) -> EnhanceResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write rendered output, creating parent directories as needed
pub fn write_output(path: &Path, content: &str) -> EnhanceResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Highlight;
    use tempfile::TempDir;

    fn table() -> Table {
        let mut header = Row::from_texts(0, &["Dest", "NM"]);
        header.cells[1].sort = Some(SortOrder::Ascending);
        let mut row = Row::from_texts(1, &["A&B", "4"]);
        let mut summary = Cell::numeric("$60 <total>");
        summary.row_span = Some(3);
        summary.highlight = Some(Highlight::Max);
        row.cells.push(summary);
        let mut t = Table::new(0, vec!["assignmentTable".to_string()], vec![header, row]);
        t.id = Some("jobs".to_string());
        t
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_render_table_attributes() {
        let html = render_table(&table());
        assert!(html.starts_with(r#"<table id="jobs" class="assignmentTable">"#));
        assert!(html.contains(r#"<th aria-sort="ascending">NM</th>"#));
        assert!(html.contains("<td>A&amp;B</td>"));
        assert!(html.contains(
            r#"<td class="numeric" rowspan="3" style="background-color: lightgreen">$60 &lt;total&gt;</td>"#
        ));
    }

    #[test]
    fn test_render_table_footer_section() {
        let mut t = table();
        t.rows.push(Row::from_texts(2, &["Total", "4"]));
        t.footer_len = 1;
        let html = render_table(&t);
        assert!(html.contains("<tfoot>\n    <tr><td>Total</td><td>4</td></tr>\n  </tfoot>"));

        let parsed = crate::parser::parse_tables(&html).unwrap();
        assert_eq!(parsed[0].footer_len, 1);
        assert_eq!(parsed[0].body_rows().len(), 1);
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Airport EHAM</title></head><body>
<p>Logged in as pilot</p>
<table class="flightTable"><tr><td>untouched</td></tr></table>
<table class="assignmentTable" id="jobs"><tr><th>Dest</th></tr><tr><td>A&amp;B</td></tr></table>
<p>Footer text</p>
</body></html>"#;

    #[test]
    fn test_render_page_replaces_table_in_place() {
        let mut t = table();
        t.position = 1;
        let html = render_page(PAGE, &[t]).unwrap();

        assert!(html.contains("<title>Airport EHAM</title>"));
        assert!(html.contains("<p>Logged in as pilot</p>"));
        assert!(html.contains("<td>untouched</td>"));
        assert!(html.find("Logged in").unwrap() < html.find("$60 &lt;total&gt;").unwrap());
        assert!(html.find("$60 &lt;total&gt;").unwrap() < html.find("Footer text").unwrap());

        let tables = crate::parser::parse_tables(&html).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].rows[1].text(0), Some("A&B"));
        assert_eq!(tables[1].rows[1].text(2), Some("$60 <total>"));
        assert!(tables[1].rows[1].cells[2].numeric);
    }

    #[test]
    fn test_render_page_without_tables_keeps_page() {
        let html = render_page(PAGE, &[]).unwrap();
        let tables = crate::parser::parse_tables(&html).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].rows[1].text(0), Some("A&B"));
        assert!(html.contains("Footer text"));
    }

    #[test]
    fn test_render_json_empty_report() {
        let json = render_json(&EnhanceReport::default()).unwrap();
        assert!(json.contains("\"tables\": []"));
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("page.html");
        write_output(&path, "<p></p>").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "<p></p>");
    }
}
