use serde::Serialize;

//==============================================================================
// Table Kinds
//==============================================================================

/// Kind of table, derived from the class attribute that selected it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// `assignmentTable` (and the `assigmentTable` spelling still served by the site)
    Assignment,
    /// `holdTable` - assignments put on hold
    Hold,
    /// Any other class the configuration chose to recognize
    Other(String),
}

impl TableKind {
    pub fn from_class(class: &str) -> Self {
        match class {
            "assignmentTable" | "assigmentTable" => TableKind::Assignment,
            "holdTable" => TableKind::Hold,
            other => TableKind::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TableKind::Assignment => "assignment",
            TableKind::Hold => "hold",
            TableKind::Other(class) => class,
        }
    }
}

//==============================================================================
// Cells, Rows, Tables
//==============================================================================

/// Sort marker carried by a header cell once the sorting collaborator is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
}

/// Highlight of a destination summary cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    /// Group with the best sum per NM (ties included)
    Max,
    Other,
}

impl Highlight {
    pub fn color(&self) -> &'static str {
        match self {
            Highlight::Max => "lightgreen",
            Highlight::Other => "lightgray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    /// Rendered with the `numeric` class
    pub numeric: bool,
    /// Number of rows this cell covers, starting at its own row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            numeric: false,
            row_span: None,
            highlight: None,
            sort: None,
        }
    }

    pub fn numeric(text: impl Into<String>) -> Self {
        Self {
            numeric: true,
            ..Self::new(text)
        }
    }
}

/// One `<tr>`: cell texts plus the row's position in the table as parsed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub index: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    pub fn from_texts<S: AsRef<str>>(index: usize, texts: &[S]) -> Self {
        Self::new(index, texts.iter().map(|t| Cell::new(t.as_ref())).collect())
    }

    pub fn text(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(|c| c.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A table taken from the page. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Position among all `<table>` elements of the page
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub rows: Vec<Row>,
    /// Number of trailing rows that came from `<tfoot>`. They are not sorted
    /// and not grouped by destination.
    #[serde(skip_serializing_if = "is_zero")]
    pub footer_len: usize,
    /// Set once the sorting collaborator has been told to pick up new columns
    #[serde(skip)]
    pub refreshed: bool,
}

impl Table {
    pub fn new(position: usize, classes: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            position,
            id: None,
            classes,
            rows,
            footer_len: 0,
            refreshed: false,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// First class in `recognized` carried by this table
    pub fn kind(&self, recognized: &[String]) -> Option<TableKind> {
        recognized
            .iter()
            .find(|class| self.has_class(class))
            .map(|class| TableKind::from_class(class))
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn header_mut(&mut self) -> Option<&mut Row> {
        self.rows.first_mut()
    }

    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn data_rows_mut(&mut self) -> &mut [Row] {
        match self.rows.len() {
            0 => &mut [],
            _ => &mut self.rows[1..],
        }
    }

    fn body_end(&self) -> usize {
        self.rows.len().saturating_sub(self.footer_len).max(1)
    }

    /// Data rows outside `<tfoot>`
    pub fn body_rows(&self) -> &[Row] {
        self.rows.get(1..self.body_end()).unwrap_or(&[])
    }

    pub fn body_rows_mut(&mut self) -> &mut [Row] {
        let end = self.body_end();
        match self.rows.len() {
            0 => &mut [],
            _ => &mut self.rows[1..end],
        }
    }

    pub fn footer_rows(&self) -> &[Row] {
        self.rows.get(self.body_end()..).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check every data row has as many cells as the header
    pub fn validate_widths(&self) -> Result<(), String> {
        let width = self.header().map_or(0, Row::len);
        for row in self.data_rows() {
            if row.len() != width {
                return Err(format!(
                    "Row {} has {} cells, expected {} cells",
                    row.index,
                    row.len(),
                    width
                ));
            }
        }
        Ok(())
    }
}

//==============================================================================
// Engine Types
//==============================================================================

/// Resolved positions of the columns the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnIndex {
    pub pay: usize,
    pub distance: usize,
    pub cargo: usize,
    /// Only resolved when destination aggregation is enabled
    pub destination: Option<usize>,
}

/// What the cargo cell says about the load
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CargoDescriptor {
    /// Passenger load expressed as a weight in kg
    Weight(f64),
    /// Item count
    Count(f64),
    /// Nothing usable; counts as one unit
    Absent,
}

impl CargoDescriptor {
    pub fn is_weight(&self) -> bool {
        matches!(self, CargoDescriptor::Weight(_))
    }

    /// Number of units the pay is divided by
    pub fn quantity(&self, man_weight_kg: f64) -> f64 {
        match *self {
            CargoDescriptor::Weight(kg) => (kg / man_weight_kg).ceil(),
            CargoDescriptor::Count(n) if n != 0.0 && !n.is_nan() => n,
            CargoDescriptor::Count(_) | CargoDescriptor::Absent => 1.0,
        }
    }
}

/// Running totals for one destination airport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationGroup {
    pub destination: String,
    pub sum: f64,
    pub count: usize,
    pub per_range: f64,
}

impl DestinationGroup {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            sum: 0.0,
            count: 0,
            per_range: 0.0,
        }
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}
