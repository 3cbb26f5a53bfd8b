use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::grid::Cell;

// Date formats seen in operator exports, tried in order. The slash formats are
// ambiguous for day ≤ 12; dd/MM wins because that is what the exports use.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

// Seconds between the 1900 spreadsheet serial epoch and the Unix epoch,
// expressed in serial days.
const SERIAL_UNIX_OFFSET_DAYS: f64 = 25_569.0;

fn cash_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Tiền mặt").expect("cash label regex"))
}

fn currency_symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[₫vnđ]").expect("currency symbol regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,.]").expect("separator regex"))
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(Duration::days(days as i64))?;
    let seconds = ((serial - days) * 86_400.0).round() as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)?;
    Some(date.and_time(time))
}

fn serial_to_datetime_unix_fallback(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = ((serial - SERIAL_UNIX_OFFSET_DAYS) * 86_400.0) as i64;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    // Free-form last resort for anything a stray export might carry.
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Coerce a cell into a point in time. Numeric cells are spreadsheet date
/// serials. Failure is `None`, never an error; callers treat `None` as
/// "date unknown".
pub fn coerce_date(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Number(serial) => {
            serial_to_datetime(*serial).or_else(|| serial_to_datetime_unix_fallback(*serial))
        }
        Cell::Text(raw) => parse_date_text(raw.trim()),
        _ => None,
    }
}

/// Coerce a cell into a quantity or amount. Vietnamese exports scatter
/// currency markers and use both `,` and `.` as thousands separators, so both
/// are discarded rather than interpreted; a genuine `.`-decimal would lose its
/// fraction here, which matches the accepted fixtures. Failure yields 0.
pub fn coerce_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Text(raw) => {
            let cleaned = cash_label_re().replace_all(raw.trim(), "");
            let cleaned = currency_symbol_re().replace_all(&cleaned, "");
            let cleaned = whitespace_re().replace_all(&cleaned, "");
            let cleaned = separator_re().replace_all(&cleaned, "");
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}
