//! Delimited text exports (`,` or `;` separated).
//!
//! Bank exports in comma-decimal locales are usually `;` separated, e.g.
//!   date;amount;type;subType
//!   31/12/2023;-12,50;Courses;Supermarché

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::IngestError;
use crate::parsers::rows_from_cells;
use crate::types::{Cell, RawRow};

/// Parse a delimited file from disk.
pub fn read_csv(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_str(&text, &path.display().to_string())
}

/// Parse delimited text; `name` is only used in error messages.
pub fn read_csv_str(text: &str, name: &str) -> Result<Vec<RawRow>, IngestError> {
    read_csv_from(text.as_bytes(), sniff_delimiter(text), name)
}

fn read_csv_from<R: Read>(reader: R, delimiter: u8, name: &str) -> Result<Vec<RawRow>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);
        rows.push((line, record.iter().map(infer_cell).collect()));
    }

    rows_from_cells(name, rows)
}

/// `;` when the first non-empty line has more semicolons than commas.
fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let semis = first.matches(';').count();
    let commas = first.matches(',').count();
    if semis > commas { b';' } else { b',' }
}

/// Text that is entirely a finite number is treated as a number cell,
/// as a spreadsheet would on import.
fn infer_cell(raw: &str) -> Cell {
    if raw.trim().is_empty() {
        return Cell::Empty;
    }
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawAmount, RawDate};

    #[test]
    fn test_comma_separated() {
        let text = "\
date,amount,type,subType,note
31/12/2023,-20.5,Loisirs,Cinéma,popcorn
45000,3,,,
";
        let rows = read_csv_str(text, "t.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].date, Some(RawDate::IsoLike("31/12/2023".into())));
        assert_eq!(rows[0].amount, Some(RawAmount::Number(-20.5)));
        assert_eq!(rows[0].sub_category.as_deref(), Some("Cinéma"));
        assert_eq!(rows[1].date, Some(RawDate::Serial(45000.0)));
        assert_eq!(rows[1].category, None);
    }

    #[test]
    fn test_semicolon_separated_with_decimal_comma() {
        let text = "date;amount;type;subType\n01/02/2024;-12,50;Courses ;Supermarché\n";
        let rows = read_csv_str(text, "t.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Some(RawAmount::Text("-12,50".into())));
        assert_eq!(rows[0].category.as_deref(), Some("Courses "));
    }

    #[test]
    fn test_blank_lines_are_not_rows() {
        let text = "date,amount\n\n2024-01-01,1\n\n2024-01-02,2\n";
        let rows = read_csv_str(text, "t.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].row > 1);
        assert!(rows[1].row > rows[0].row);
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("\n\na;b;c\n"), b';');
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(" 12.5 "), Cell::Number(12.5));
        assert_eq!(infer_cell("12,5"), Cell::Text("12,5".into()));
        assert_eq!(infer_cell("NaN"), Cell::Text("NaN".into()));
        assert_eq!(infer_cell(""), Cell::Empty);
    }
}
