//! Workbook files (`.xlsx`, `.xls`, `.ods`, ...). Only the first sheet is read.

use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use crate::error::IngestError;
use crate::parsers::rows_from_cells;
use crate::types::{Cell, RawRow};

pub fn read_workbook(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let name = path.display().to_string();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoSheet(name.clone()))??;

    // Row numbers are 1-based and absolute, even if the used range starts lower.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let rows = range
        .rows()
        .enumerate()
        .map(|(i, cells)| (first_row + i + 1, cells.iter().map(cell_of).collect()));

    rows_from_cells(&name, rows)
}

fn cell_of(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::SerialDate(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::IsoDate(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}
