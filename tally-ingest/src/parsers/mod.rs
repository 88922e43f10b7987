//! Spreadsheet readers: first sheet of a workbook, or a delimited text file.
//!
//! Both readers hand `(row number, cells)` pairs to [`rows_from_cells`], which
//! locates the header row and maps the `date`, `amount`, `type` and `subType`
//! columns. Other columns are ignored.

pub mod delimited;
pub mod workbook;

use std::path::Path;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::types::{Cell, RawRow};

pub const DATE_COLUMN: &str = "date";
pub const AMOUNT_COLUMN: &str = "amount";
pub const CATEGORY_COLUMN: &str = "type";
pub const SUB_CATEGORY_COLUMN: &str = "subType";

/// Read the data rows of a `.csv`, `.xlsx`, `.xls` or `.ods` file.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" | "txt" => delimited::read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::read_workbook(path)?,
        _ => return Err(IngestError::UnsupportedFormat(path.display().to_string())),
    };

    info!(file = %path.display(), rows = rows.len(), "read spreadsheet rows");
    Ok(rows)
}

/// Column positions of the fields we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    date: usize,
    amount: usize,
    category: Option<usize>,
    sub_category: Option<usize>,
}

impl Columns {
    fn locate(header: &[Cell], file: &str) -> Result<Self, IngestError> {
        let find = |name: &str| {
            header.iter().position(|cell| {
                cell.text()
                    .is_some_and(|h| h.trim().eq_ignore_ascii_case(name))
            })
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| IngestError::MissingColumn {
                file: file.to_string(),
                column: name.to_string(),
            })
        };

        Ok(Self {
            date: require(DATE_COLUMN)?,
            amount: require(AMOUNT_COLUMN)?,
            category: find(CATEGORY_COLUMN),
            sub_category: find(SUB_CATEGORY_COLUMN),
        })
    }

    fn map(&self, row: usize, cells: &[Cell]) -> RawRow {
        let get = |i: usize| cells.get(i).cloned().unwrap_or(Cell::Empty);
        RawRow {
            row,
            date: get(self.date).as_date(),
            amount: get(self.amount).as_amount(),
            category: self.category.and_then(|i| get(i).text()),
            sub_category: self.sub_category.and_then(|i| get(i).text()),
        }
    }
}

/// Turn positioned cell rows into raw rows. The first non-blank row is the header.
pub(crate) fn rows_from_cells<I>(file: &str, rows: I) -> Result<Vec<RawRow>, IngestError>
where
    I: IntoIterator<Item = (usize, Vec<Cell>)>,
{
    let mut rows = rows
        .into_iter()
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_blank()));

    let (header_row, header) = rows
        .next()
        .ok_or_else(|| IngestError::NoHeader(file.to_string()))?;
    let columns = Columns::locate(&header, file)?;
    debug!(file, header_row, ?columns, "located columns");

    Ok(rows.map(|(row, cells)| columns.map(row, &cells)).collect())
}
