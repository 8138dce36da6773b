use std::io::{Read, Seek};
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};
use tracing::debug;

use crate::tabula::layout::error::{LayoutError, Result};
use crate::tabula::layout::model::{CellValue, Sheet};

/// Reads every sheet of a CSV or spreadsheet file.
///
/// CSV files produce a single sheet without metadata; workbooks produce one
/// named sheet per worksheet, in workbook order.
pub fn read_sheets(path: &Path) -> Result<Vec<Sheet>> {
    if !path.exists() {
        return Err(LayoutError::MissingInput(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => Ok(vec![read_csv(path)?]),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(path),
        _ => Err(LayoutError::UnsupportedInput(path.to_path_buf())),
    }
}

fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let names: Vec<String> = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = read_required_sheet(&mut workbook, &name)?;
        let rows = range_to_rows(&range);
        debug!(sheet = %name, rows = rows.len(), "read worksheet");
        sheets.push(Sheet::named(name, rows));
    }
    Ok(sheets)
}

fn read_required_sheet<R: Read + Seek>(
    workbook: &mut Sheets<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| LayoutError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(LayoutError::from)?;
    Ok(range)
}

/// Converts a used range into absolute rows; calamine trims leading empty
/// rows and columns, so the start offset is padded back in.
fn range_to_rows(range: &Range<DataType>) -> Vec<Vec<CellValue>> {
    let Some((row_offset, col_offset)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset as usize];
        cells.extend(row.iter().map(cell_to_value));
        rows.push(cells);
    }
    rows
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Float(*value),
        DataType::Int(value) => CellValue::Int(*value),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(value) => CellValue::DateTime(*value),
        DataType::Error(value) => CellValue::Error(value.to_string()),
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

fn read_csv(path: &Path) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_csv_field).collect());
    }
    debug!(rows = rows.len(), "read CSV file");
    Ok(Sheet::new(None, rows))
}

fn parse_csv_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return CellValue::Int(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => CellValue::Float(value),
        _ => CellValue::Text(field.to_string()),
    }
}
