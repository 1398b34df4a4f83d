use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

const AUTO_DECIMALS: u32 = 2;
const MAX_DECIMALS: u32 = 12;
const PREFIX_UNITS: [&str; 4] = ["$", "€", "£", "¥"];

/// Reads a loosely typed cell as a number.
///
/// Accepts JSON numbers and numeric strings with surrounding whitespace,
/// thousands separators (`,` or `_`) and a trailing `%`.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_numeric_text(text),
        _ => None,
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Renders any scalar cell as display text; `null`, arrays and objects give `None`.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Parses a date or date-time cell into unix seconds (UTC).
#[must_use]
pub fn parse_temporal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime_to_unix_seconds(parsed.with_timezone(&Utc)));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(datetime_to_unix_seconds(parsed.and_utc()));
        }
    }
    for pattern in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            return date_to_seconds(date);
        }
    }
    // Month precision (`2024-03`) has no day component for chrono to parse.
    if text.len() == 7 && text.as_bytes().get(4) == Some(&b'-') {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
            return date_to_seconds(date);
        }
    }
    None
}

fn date_to_seconds(date: NaiveDate) -> Option<f64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| datetime_to_unix_seconds(dt.and_utc()))
}

/// Formats a number with thousands separators.
///
/// With `decimals` the output has exactly that many fraction digits; without,
/// up to two with trailing zeros trimmed. Rounding is done in decimal
/// arithmetic, half away from zero.
#[must_use]
pub fn format_number(value: f64, decimals: Option<u32>) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let Some(decimal) = Decimal::from_f64(value) else {
        return value.to_string();
    };

    let places = decimals.unwrap_or(AUTO_DECIMALS).min(MAX_DECIMALS);
    let mut rounded = decimal.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    match decimals {
        Some(_) => rounded.rescale(places),
        None => rounded = rounded.normalize(),
    }

    group_thousands(&rounded.to_string())
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Attaches a column unit: currency symbols are prefixed, `%` is appended
/// directly, anything else after a space.
#[must_use]
pub fn format_with_unit(text: &str, unit: Option<&str>) -> String {
    let Some(unit) = unit.map(str::trim).filter(|u| !u.is_empty()) else {
        return text.to_owned();
    };
    if PREFIX_UNITS.contains(&unit) {
        match text.strip_prefix('-') {
            Some(rest) => format!("-{unit}{rest}"),
            None => format!("{unit}{text}"),
        }
    } else if unit == "%" {
        format!("{text}%")
    } else {
        format!("{text} {unit}")
    }
}
