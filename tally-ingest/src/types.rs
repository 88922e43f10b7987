use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date cell as it arrives from a spreadsheet or a store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawDate {
    /// Text: `dd/mm/yyyy` when it contains a slash, otherwise ISO-ish.
    IsoLike(String),
    /// Spreadsheet serial day number (25569 = 1970-01-01).
    Serial(f64),
    /// Seconds since the Unix epoch.
    EpochSeconds(i64),
    Native(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawAmount {
    Text(String),
    Number(f64),
}

/// One data row of the input sheet, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based row number in the source file
    pub row: usize,
    pub date: Option<RawDate>,
    pub amount: Option<RawAmount>,
    /// Source column "type"
    pub category: Option<String>,
    /// Source column "subType"
    pub sub_category: Option<String>,
}

/// Reader-agnostic cell value used between the file readers and the column mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Spreadsheet-native date/time, as a serial number
    SerialDate(f64),
    /// Spreadsheet-native date stored as ISO 8601 text (ODS)
    IsoDate(String),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) | Cell::IsoDate(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::SerialDate(_) => false,
        }
    }

    pub fn text(&self) -> Option<String> {
        match self {
            _ if self.is_blank() => None,
            Cell::Text(s) | Cell::IsoDate(s) => Some(s.clone()),
            Cell::Number(n) | Cell::SerialDate(n) => Some(format_number(*n)),
            Cell::Empty => None,
        }
    }

    pub fn as_date(&self) -> Option<RawDate> {
        match self {
            _ if self.is_blank() => None,
            Cell::Text(s) | Cell::IsoDate(s) => Some(RawDate::IsoLike(s.clone())),
            Cell::Number(n) | Cell::SerialDate(n) => Some(RawDate::Serial(*n)),
            Cell::Empty => None,
        }
    }

    pub fn as_amount(&self) -> Option<RawAmount> {
        match self {
            _ if self.is_blank() => None,
            Cell::Text(s) | Cell::IsoDate(s) => Some(RawAmount::Text(s.clone())),
            Cell::Number(n) | Cell::SerialDate(n) => Some(RawAmount::Number(*n)),
            Cell::Empty => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
