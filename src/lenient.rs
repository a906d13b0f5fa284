//! Best-effort date string parsing with the same reach as a platform
//! `Date` constructor: ISO-8601-like strings and the `toString()` shape.
//!
//! Failure is not an error here; callers get an invalid [`NativeDate`].

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

use crate::types::NativeDate;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<year>[+-]\d{6}|\d{4})(?:-(?P<month>\d{2})(?:-(?P<day>\d{2}))?)?(?:[Tt ](?P<hour>\d{2}):(?P<minute>\d{2})(?::(?P<second>\d{2})(?:[.,](?P<frac>\d+))?)?(?P<zone>[Zz]|[+-]\d{2}(?::?\d{2})?)?)?$",
    )
    .expect("ISO date pattern is valid")
});

pub fn parse_date_string(s: &str, zone: Tz) -> NativeDate {
    let s = s.trim();
    if s.is_empty() {
        return NativeDate::invalid();
    }

    // Try ISO 8601 format
    if let Some(t) = parse_iso_date(s, zone) {
        return NativeDate::from_millis(t as f64);
    }

    // Try toString() format: "Wed Jan 29 2026 12:34:56 GMT+0100 (CET)"
    if let Some(t) = parse_tostring_format(s, zone) {
        return NativeDate::from_millis(t as f64);
    }

    tracing::trace!(input = s, "string is not a recognizable date");
    NativeDate::invalid()
}

fn parse_iso_date(s: &str, zone: Tz) -> Option<i64> {
    let caps = ISO_DATE.captures(s)?;

    let year: i32 = caps["year"].parse().ok()?;
    if &caps["year"] == "-000000" {
        return None;
    }
    let month: u32 = caps.name("month").map_or(Some(1), |m| m.as_str().parse().ok())?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let day: u32 = caps.name("day").map_or(Some(1), |m| m.as_str().parse().ok())?;
    if !(1..=31).contains(&day) {
        return None;
    }
    // Days past the end of the month roll into the next one.
    let date = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_signed(TimeDelta::days(i64::from(day) - 1))?;

    let Some(hour) = caps.name("hour") else {
        // Date only = UTC
        return Some(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
    };
    let hour: u32 = hour.as_str().parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps.name("second").map_or(Some(0), |m| m.as_str().parse().ok())?;
    let millis: u32 = match caps.name("frac") {
        Some(frac) => {
            let digits: String = frac.as_str().chars().chain("00".chars()).take(3).collect();
            digits.parse().ok()?
        }
        None => 0,
    };
    if minute > 59 || second > 59 {
        return None;
    }
    let dt = if hour == 24 {
        if minute != 0 || second != 0 || millis != 0 {
            return None;
        }
        date.succ_opt()?.and_time(NaiveTime::MIN)
    } else {
        date.and_time(NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?)
    };

    match caps.name("zone").map(|z| z.as_str()) {
        // No timezone = local time
        None => local_to_epoch_millis(dt, zone),
        Some("Z" | "z") => Some(dt.and_utc().timestamp_millis()),
        Some(offset) => {
            let offset_ms = parse_offset(offset)?;
            Some(dt.and_utc().timestamp_millis() - offset_ms)
        }
    }
}

/// `+HH`, `+HHMM` or `+HH:MM` as signed milliseconds.
fn parse_offset(s: &str) -> Option<i64> {
    let (sign, rest) = match s.strip_prefix('+') {
        Some(rest) => (1, rest),
        None => (-1, s.strip_prefix('-')?),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i64 = digits.get(..2)?.parse().ok()?;
    let minutes: i64 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes) * 60_000)
}

fn parse_tostring_format(s: &str, zone: Tz) -> Option<i64> {
    // "Wed Jan 29 2026 12:34:56 GMT+0100 (CET)"
    // or "Wed Jan 29 2026 12:34:56 GMT+0100"
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let month = match parts[1] {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };

    let day: u32 = parts[2].parse().ok()?;
    let year: i32 = parts[3].parse().ok()?;
    let time_parts: Vec<&str> = parts[4].split(':').collect();
    if time_parts.len() != 3 {
        return None;
    }
    let hour: u32 = time_parts[0].parse().ok()?;
    let minute: u32 = time_parts[1].parse().ok()?;
    let second: u32 = time_parts[2].parse().ok()?;

    let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;

    if let Some(tz) = parts.get(5).and_then(|p| p.strip_prefix("GMT")) {
        if tz.is_empty() {
            return Some(dt.and_utc().timestamp_millis());
        }
        if let Some(offset) = tz.get(..5) {
            let offset_ms = parse_offset(offset)?;
            return Some(dt.and_utc().timestamp_millis() - offset_ms);
        }
        if tz.len() >= 5 {
            return None;
        }
    }

    // Assume local
    local_to_epoch_millis(dt, zone)
}

/// Resolve a wall-clock time in `zone`. Ambiguous times take the earlier
/// instant; times inside a gap are pushed forward by an hour.
pub(crate) fn local_to_epoch_millis(dt: NaiveDateTime, zone: Tz) -> Option<i64> {
    zone.from_local_datetime(&dt)
        .earliest()
        .or_else(|| {
            let shifted = dt.checked_add_signed(TimeDelta::hours(1))?;
            zone.from_local_datetime(&shifted).earliest()
        })
        .map(|t| t.timestamp_millis())
}
