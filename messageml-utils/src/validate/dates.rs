//! Date picker rules.
//!
//! `disabled-date` and `highlighted-date` hold a JSON array of intervals:
//!
//! ```text
//! [{"from": "2024-01-01", "to": "2024-01-07"}, {"day": "2024-02-14"}, {"daysOfWeek": [0, 6]}]
//! ```
//!
//! The authoring form leaves the kind of each interval implicit; the
//! presentation form names it with a `type` of `range`, `date` or `weekdays`.

use super::Check;
use crate::elements::ElementKind;
use crate::error::{MessageMLError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

static DATE_FORMAT_ALLOWED: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[0-9Mdy/. -:]+$").ok());

/// One entry of a date range attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DateInterval {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
}

/// The interval shapes, after their fields have been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interval<'a> {
    Range { from: &'a str, to: &'a str },
    Date(&'a str),
    Weekdays(&'a [u8]),
}

impl DateInterval {
    pub fn shape(&self) -> std::result::Result<Interval<'_>, String> {
        let shape = match (&self.from, &self.to, &self.day, &self.days_of_week) {
            (Some(from), Some(to), None, None) => {
                check_iso_date(from)?;
                check_iso_date(to)?;
                if from > to {
                    return Err(format!("\"from\" ({from}) is after \"to\" ({to})"));
                }
                Interval::Range { from, to }
            }
            (None, None, Some(day), None) => {
                check_iso_date(day)?;
                Interval::Date(day)
            }
            (None, None, None, Some(days)) => {
                if let Some(day) = days.iter().find(|d| **d > 6) {
                    return Err(format!("day of week {day} is not between 0 and 6"));
                }
                Interval::Weekdays(days)
            }
            _ => {
                return Err(
                    "an interval must be either {from, to}, {day} or {daysOfWeek}".to_string(),
                )
            }
        };
        let expected = match shape {
            Interval::Range { .. } => "range",
            Interval::Date(_) => "date",
            Interval::Weekdays(_) => "weekdays",
        };
        match self.kind.as_deref() {
            Some(kind) if kind != expected => {
                Err(format!("type \"{kind}\" does not match a {expected} interval"))
            }
            _ => Ok(shape),
        }
    }

    /// Presentation form, with an explicit `type`
    pub fn to_presentation(&self) -> Value {
        match self.shape() {
            Ok(Interval::Range { from, to }) => json!({"type": "range", "from": from, "to": to}),
            Ok(Interval::Date(day)) => json!({"type": "date", "day": day}),
            Ok(Interval::Weekdays(days)) => json!({"type": "weekdays", "daysOfWeek": days}),
            Err(_) => Value::Null,
        }
    }
}

/// Parse and check a date range attribute
pub fn parse_ranges(attribute: &str, raw: &str) -> Result<Vec<DateInterval>> {
    let intervals: Vec<DateInterval> = serde_json::from_str(raw).map_err(|e| {
        MessageMLError::attribute(format!("Error parsing json in attribute \"{attribute}\": {e}"))
    })?;
    for interval in &intervals {
        interval.shape().map_err(|reason| {
            MessageMLError::attribute(format!(
                "Attribute \"{attribute}\" contains an invalid date interval: {reason}"
            ))
        })?;
    }
    Ok(intervals)
}

/// Compact presentation JSON for a date range attribute
pub fn presentation_json(attribute: &str, raw: &str) -> Result<String> {
    let intervals = parse_ranges(attribute, raw)?;
    let values: Vec<Value> = intervals.iter().map(DateInterval::to_presentation).collect();
    serde_json::to_string(&values).map_err(|e| MessageMLError::Processing(e.to_string()))
}

pub fn date_picker(check: &Check<'_>) -> Result<()> {
    check.ancestor_in(&[ElementKind::Form])?;
    check.no_content()?;
    check.required("name")?;
    check.short_text("name")?;
    for name in ["value", "min", "max"] {
        if let Some(value) = check.attr(name) {
            check_iso_date(value).map_err(|_| {
                MessageMLError::attribute(format!(
                    "Attribute \"{name}\" has invalid date format, only ISO_8601 is allowed"
                ))
            })?;
        }
    }
    for flag in ["required", "disabled", "readonly"] {
        check.boolean(flag)?;
    }
    for name in ["disabled-date", "highlighted-date"] {
        if let Some(raw) = check.attr(name) {
            check.max_length(name, check.limits.max_date_range_length)?;
            parse_ranges(name, raw)?;
        }
    }
    if let Some(format) = check.attr("format") {
        check.short_text("format")?;
        let allowed = DATE_FORMAT_ALLOWED.as_ref().is_some_and(|re| re.is_match(format));
        if !allowed {
            return Err(MessageMLError::attribute(
                "Attribute \"format\" contains an unsupported date format, only 'M', 'd' and 'y' \
                 are supported with a space or '.','-','/',':' as separator",
            ));
        }
    }
    check.short_text("title")?;
    check.short_text("label")
}

/// `YYYY-MM-DD` with a real calendar day
pub fn check_iso_date(value: &str) -> std::result::Result<(), String> {
    let invalid = || format!("\"{value}\" is not an ISO date");
    let mut parts = value.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(month, 2) || !digits(day, 2) {
        return Err(invalid());
    }
    let (year, month, day): (u32, u32, u32) = (
        year.parse().map_err(|_| invalid())?,
        month.parse().map_err(|_| invalid())?,
        day.parse().map_err(|_| invalid())?,
    );
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return Err(invalid()),
    };
    if day == 0 || day > days_in_month {
        return Err(invalid());
    }
    Ok(())
}
