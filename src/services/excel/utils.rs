//! Cell coercion shared by the watchlist and the borrower ranking.
//!
//! Every helper degrades to `None` instead of failing: a bad cell never
//! aborts its row or its table.

use calamine::Data;
use chrono::NaiveDate;

/// Candidate formats for text dates, tried in order; first match wins.
pub const DATE_FORMATS: [&str; 4] = ["%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y"];

pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Numeric value of a cell, or `None` when it cannot be read as a number.
pub fn to_numeric(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::Bool(b) => f64::from(u8::from(*b)),
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (!value.is_nan()).then_some(value)
}

/// Calendar date of a cell. Excel date cells honour the workbook's 1900 or
/// 1904 date system, ISO cells use their date part and text cells the
/// [`DATE_FORMATS`].
pub fn to_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
        Data::String(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Re-renders a text date as `MM/DD/YYYY`, or an empty string when no
/// supported format matches.
pub fn convert_date_string(s: &str) -> String {
    format_display_date(parse_date_str(s))
}

pub fn format_display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Text of a non-empty cell. Error cells count as missing.
pub fn to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Rounds to the nearest whole unit, ties to even.
pub fn round_whole(value: f64) -> f64 {
    value.round_ties_even()
}
