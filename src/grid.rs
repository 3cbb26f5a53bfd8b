use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime};

/// A single spreadsheet cell after decoding. The decoder performs no header
/// inference; every cell arrives as whatever the sheet stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Bool(bool),
}

/// Row 0 is the first sheet row.
pub type Grid = Vec<Vec<Cell>>;

impl Cell {
    pub fn from_sheet_value(value: &Data) -> Cell {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => Cell::DateTime(naive),
                None => Cell::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => Cell::Text(s.clone()),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Empty,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Empty cells and whitespace-only text count as blank; a numeric 0 does not.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell the way it reads in the sheet. Integral floats lose the
    /// trailing `.0`; time-only datetime cells (serial day 0) render as a bare
    /// time of day.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
            Cell::DateTime(dt) => {
                let time_only = NaiveDate::from_ymd_opt(1899, 12, 30)
                    .map(|base| dt.date() == base)
                    .unwrap_or(false);
                if time_only {
                    Some(dt.format("%H:%M:%S").to_string())
                } else {
                    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
                }
            }
            Cell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

pub fn row_is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}
