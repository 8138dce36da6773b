mod block;
mod graph;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use block::{Block, BlockId, BlockType, BlockTypeDistribution};
pub use graph::{Edge, LayoutGraph};

/// Declared type of the input file, recorded as the annotation's `resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "xlsx")]
    Xlsx,
    #[serde(rename = "xls")]
    Xls,
    /// Any other extension; serialised as an empty string.
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl FileType {
    /// Detects the file type from the path's extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => FileType::Csv,
            Some("xlsx") => FileType::Xlsx,
            Some("xls") => FileType::Xls,
            _ => FileType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Xlsx => "xlsx",
            FileType::Xls => "xls",
            FileType::Unknown => "",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a single cell value read from a spreadsheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Blank cell.
    #[default]
    Empty,
    /// Plain string content.
    Text(String),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// Spreadsheet date-time serial number.
    DateTime(f64),
    /// Error marker such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Returns `true` for blank cells.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) | CellValue::Error(value) => write!(f, "{value}"),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) | CellValue::DateTime(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// Metadata attached to a sheet by the file reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMeta {
    /// Worksheet name as stored in the workbook.
    pub name: String,
}

/// A two-dimensional grid of cells. Rows may be ragged; missing trailing
/// cells read as [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    /// Optional metadata; CSV inputs carry none.
    pub meta: Option<SheetMeta>,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Creates a sheet from its rows.
    pub fn new(meta: Option<SheetMeta>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { meta, rows }
    }

    /// Creates a named sheet from its rows.
    pub fn named(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(Some(SheetMeta { name: name.into() }), rows)
    }

    /// Returns the sheet name, if the reader provided one.
    pub fn name(&self) -> Option<&str> {
        self.meta.as_ref().map(|meta| meta.name.as_str())
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns the cell at the given zero-based position.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(EMPTY)
    }
}

/// Per-cell classification output. The pipeline never looks inside; it only
/// hands the tags from the classifier to the later stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    rows: Vec<Vec<String>>,
}

impl Tags {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the tag assigned to a cell, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }
}

impl Default for Tags {
    /// A single empty row: the value recorded for a sheet whose
    /// classification never completed.
    fn default() -> Self {
        Self {
            rows: vec![Vec::new()],
        }
    }
}
