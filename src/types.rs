use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{
    Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday,
};
use serde::Deserialize;

use crate::error::{AdapterError, Field, ParseError, Result};

/// Which shape of temporal value an adapter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Date,
    #[default]
    DateTime,
    Time,
}

impl Variant {
    /// Narrow a date-time into this variant.
    pub(crate) fn project(self, dt: NaiveDateTime) -> TemporalValue {
        match self {
            Variant::Date => TemporalValue::Date(dt.date()),
            Variant::DateTime => TemporalValue::DateTime(dt),
            Variant::Time => TemporalValue::Time(dt.time()),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Date => "date",
            Variant::DateTime => "date-time",
            Variant::Time => "time",
        })
    }
}

impl FromStr for Variant {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Variant::Date),
            "date-time" | "datetime" => Ok(Variant::DateTime),
            "time" => Ok(Variant::Time),
            _ => Err(AdapterError::Config(format!("unknown variant '{s}'"))),
        }
    }
}

/// An immutable date, date-time or time value. Every mutator returns a new
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

/// The value channel: either a usable value or the parse error that stood in
/// for one.
pub type DateValue = std::result::Result<TemporalValue, ParseError>;

impl TemporalValue {
    pub fn variant(&self) -> Variant {
        match self {
            TemporalValue::Date(_) => Variant::Date,
            TemporalValue::DateTime(_) => Variant::DateTime,
            TemporalValue::Time(_) => Variant::Time,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            TemporalValue::Date(d) => Some(*d),
            TemporalValue::DateTime(dt) => Some(dt.date()),
            TemporalValue::Time(_) => None,
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            TemporalValue::Date(_) => None,
            TemporalValue::DateTime(dt) => Some(dt.time()),
            TemporalValue::Time(t) => Some(*t),
        }
    }

    /// Date-only values are promoted to midnight; time-only values have no
    /// date-time form.
    pub fn to_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            TemporalValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            TemporalValue::DateTime(dt) => Some(*dt),
            TemporalValue::Time(_) => None,
        }
    }

    fn require_date(&self, field: Field) -> Result<NaiveDate> {
        self.date()
            .ok_or_else(|| AdapterError::unsupported(field, self.variant()))
    }

    fn require_time(&self, field: Field) -> Result<NaiveTime> {
        self.time()
            .ok_or_else(|| AdapterError::unsupported(field, self.variant()))
    }

    pub fn year(&self) -> Result<i32> {
        Ok(self.require_date(Field::Year)?.year())
    }

    /// Month of year, 1-based.
    pub fn month(&self) -> Result<u32> {
        Ok(self.require_date(Field::Month)?.month())
    }

    pub fn day(&self) -> Result<u32> {
        Ok(self.require_date(Field::DayOfMonth)?.day())
    }

    pub fn ordinal(&self) -> Result<u32> {
        Ok(self.require_date(Field::DayOfYear)?.ordinal())
    }

    pub fn weekday(&self) -> Result<Weekday> {
        Ok(self.require_date(Field::DayOfWeek)?.weekday())
    }

    pub fn hour(&self) -> Result<u32> {
        Ok(self.require_time(Field::Hour)?.hour())
    }

    pub fn minute(&self) -> Result<u32> {
        Ok(self.require_time(Field::Minute)?.minute())
    }

    pub fn second(&self) -> Result<u32> {
        Ok(self.require_time(Field::Second)?.second())
    }

    pub fn nanosecond(&self) -> Result<u32> {
        Ok(self.require_time(Field::Nanosecond)?.nanosecond())
    }

    /// Replace the date part, keeping the variant and any time of day.
    fn map_date(&self, field: Field, f: impl FnOnce(NaiveDate) -> Option<NaiveDate>) -> Result<Self> {
        let date = self.require_date(field)?;
        let Some(date) = f(date) else {
            return Err(AdapterError::Overflow("date"));
        };
        Ok(match self {
            TemporalValue::DateTime(dt) => TemporalValue::DateTime(date.and_time(dt.time())),
            _ => TemporalValue::Date(date),
        })
    }

    /// Replace the time part, keeping the variant and any date.
    fn replace_time(&self, field: Field, time: NaiveTime) -> Result<Self> {
        match self {
            TemporalValue::DateTime(dt) => Ok(TemporalValue::DateTime(dt.date().and_time(time))),
            TemporalValue::Time(_) => Ok(TemporalValue::Time(time)),
            TemporalValue::Date(_) => Err(AdapterError::unsupported(field, Variant::Date)),
        }
    }

    pub fn with_year(&self, year: i32) -> Result<Self> {
        let date = self.require_date(Field::Year)?;
        let day = date.day().min(days_in_month(year, date.month()));
        let date = NaiveDate::from_ymd_opt(year, date.month(), day)
            .ok_or_else(|| AdapterError::out_of_range(Field::Year, year))?;
        self.map_date(Field::Year, |_| Some(date))
    }

    /// Set the 1-based month, clamping the day to the new month's length.
    pub fn with_month(&self, month: u32) -> Result<Self> {
        let date = self.require_date(Field::Month)?;
        if !(1..=12).contains(&month) {
            return Err(AdapterError::out_of_range(Field::Month, month));
        }
        let day = date.day().min(days_in_month(date.year(), month));
        self.map_date(Field::Month, |d| NaiveDate::from_ymd_opt(d.year(), month, day))
    }

    pub fn with_day(&self, day: u32) -> Result<Self> {
        let date = self.require_date(Field::DayOfMonth)?;
        let date = date
            .with_day(day)
            .ok_or_else(|| AdapterError::out_of_range(Field::DayOfMonth, day))?;
        self.map_date(Field::DayOfMonth, |_| Some(date))
    }

    pub fn with_ordinal(&self, ordinal: u32) -> Result<Self> {
        let date = self.require_date(Field::DayOfYear)?;
        let date = date
            .with_ordinal(ordinal)
            .ok_or_else(|| AdapterError::out_of_range(Field::DayOfYear, ordinal))?;
        self.map_date(Field::DayOfYear, |_| Some(date))
    }

    pub fn with_hour(&self, hour: u32) -> Result<Self> {
        let time = self.require_time(Field::Hour)?;
        let time = time
            .with_hour(hour)
            .ok_or_else(|| AdapterError::out_of_range(Field::Hour, hour))?;
        self.replace_time(Field::Hour, time)
    }

    pub fn with_minute(&self, minute: u32) -> Result<Self> {
        let time = self.require_time(Field::Minute)?;
        let time = time
            .with_minute(minute)
            .ok_or_else(|| AdapterError::out_of_range(Field::Minute, minute))?;
        self.replace_time(Field::Minute, time)
    }

    pub fn with_second(&self, second: u32) -> Result<Self> {
        let time = self.require_time(Field::Second)?;
        let time = time
            .with_second(second)
            .ok_or_else(|| AdapterError::out_of_range(Field::Second, second))?;
        self.replace_time(Field::Second, time)
    }

    pub fn with_nanosecond(&self, nano: u32) -> Result<Self> {
        let time = self.require_time(Field::Nanosecond)?;
        if nano >= 1_000_000_000 {
            return Err(AdapterError::out_of_range(Field::Nanosecond, nano));
        }
        let time = time
            .with_nanosecond(nano)
            .ok_or_else(|| AdapterError::out_of_range(Field::Nanosecond, nano))?;
        self.replace_time(Field::Nanosecond, time)
    }

    /// Zero the clock fields. Date values are returned unchanged.
    pub fn at_midnight(&self) -> Self {
        match self {
            TemporalValue::DateTime(dt) => TemporalValue::DateTime(dt.date().and_time(NaiveTime::MIN)),
            TemporalValue::Time(_) => TemporalValue::Time(NaiveTime::MIN),
            TemporalValue::Date(_) => *self,
        }
    }

    pub fn plus_days(&self, days: i64) -> Result<Self> {
        let delta = TimeDelta::try_days(days).ok_or(AdapterError::Overflow("plusDays"))?;
        self.map_date(Field::DayOfMonth, |d| d.checked_add_signed(delta))
    }

    pub fn minus_days(&self, days: i64) -> Result<Self> {
        let days = days.checked_neg().ok_or(AdapterError::Overflow("minusDays"))?;
        self.plus_days(days)
    }

    /// Month arithmetic clamps the day of month, so Jan 31 + 1 month is the
    /// last day of February.
    pub fn plus_months(&self, months: i64) -> Result<Self> {
        let amount = u32::try_from(months.unsigned_abs())
            .map_err(|_| AdapterError::Overflow("plusMonths"))?;
        let amount = Months::new(amount);
        self.map_date(Field::Month, |d| {
            if months >= 0 {
                d.checked_add_months(amount)
            } else {
                d.checked_sub_months(amount)
            }
        })
    }

    pub fn minus_months(&self, months: i64) -> Result<Self> {
        let months = months.checked_neg().ok_or(AdapterError::Overflow("minusMonths"))?;
        self.plus_months(months)
    }

    pub fn plus_years(&self, years: i64) -> Result<Self> {
        let months = years.checked_mul(12).ok_or(AdapterError::Overflow("plusYears"))?;
        self.plus_months(months)
    }

    /// Time-only values wrap around midnight.
    pub fn minus_nanos(&self, nanos: i64) -> Result<Self> {
        let delta = TimeDelta::nanoseconds(nanos);
        match self {
            TemporalValue::DateTime(dt) => dt
                .checked_sub_signed(delta)
                .map(TemporalValue::DateTime)
                .ok_or(AdapterError::Overflow("minusNanos")),
            TemporalValue::Time(t) => Ok(TemporalValue::Time(t.overflowing_sub_signed(delta).0)),
            TemporalValue::Date(_) => Err(AdapterError::unsupported(Field::Nanosecond, Variant::Date)),
        }
    }

    /// Order two values. A date-only value compared with a date-time is
    /// taken at midnight; time-only values only compare with each other.
    pub fn compare(&self, other: &TemporalValue) -> Result<Ordering> {
        match (self, other) {
            (TemporalValue::Date(a), TemporalValue::Date(b)) => Ok(a.cmp(b)),
            (TemporalValue::Time(a), TemporalValue::Time(b)) => Ok(a.cmp(b)),
            (TemporalValue::Time(_), _) | (_, TemporalValue::Time(_)) => {
                Err(AdapterError::IncompatibleVariants {
                    left: self.variant(),
                    right: other.variant(),
                })
            }
            _ => match (self.to_date_time(), other.to_date_time()) {
                (Some(a), Some(b)) => Ok(a.cmp(&b)),
                _ => Err(AdapterError::IncompatibleVariants {
                    left: self.variant(),
                    right: other.variant(),
                }),
            },
        }
    }

    pub fn is_before(&self, other: &TemporalValue) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn is_after(&self, other: &TemporalValue) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TemporalValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            TemporalValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
        }
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// A platform date: milliseconds since the Unix epoch, `NaN` when invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeDate {
    time: f64,
}

impl NativeDate {
    pub fn from_millis(ms: f64) -> Self {
        Self { time: time_clip(ms) }
    }

    pub fn invalid() -> Self {
        Self { time: f64::NAN }
    }

    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub fn value_of(&self) -> f64 {
        self.time
    }

    pub fn is_valid(&self) -> bool {
        !self.time.is_nan()
    }

    pub fn epoch_millis(&self) -> Option<i64> {
        self.is_valid().then_some(self.time as i64)
    }
}

impl From<SystemTime> for NativeDate {
    fn from(t: SystemTime) -> Self {
        let ms = match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as f64,
            Err(e) => -(e.duration().as_millis() as f64),
        };
        Self::from_millis(ms)
    }
}

pub(crate) fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > 8.64e15 {
        return f64::NAN;
    }
    let t = time.trunc();
    if t == 0.0 { 0.0_f64 } else { t }
}

/// Everything an entry point can be handed before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Input {
    /// No argument: stands for "now".
    #[default]
    Undefined,
    /// Explicitly no date.
    Null,
    Text(String),
    Native(NativeDate),
    Value(TemporalValue),
    Failed(ParseError),
    /// A bare number is not a recognized date shape.
    Number(f64),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Undefined => f.write_str("undefined"),
            Input::Null => f.write_str("null"),
            Input::Text(s) => write!(f, "{s:?}"),
            Input::Native(d) => write!(f, "Date({})", d.value_of()),
            Input::Value(v) => write!(f, "{v}"),
            Input::Failed(e) => write!(f, "{e}"),
            Input::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(s.to_string())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s)
    }
}

impl From<f64> for Input {
    fn from(n: f64) -> Self {
        Input::Number(n)
    }
}

impl From<NativeDate> for Input {
    fn from(d: NativeDate) -> Self {
        Input::Native(d)
    }
}

impl From<SystemTime> for Input {
    fn from(t: SystemTime) -> Self {
        Input::Native(t.into())
    }
}

impl From<TemporalValue> for Input {
    fn from(v: TemporalValue) -> Self {
        Input::Value(v)
    }
}

impl From<&TemporalValue> for Input {
    fn from(v: &TemporalValue) -> Self {
        Input::Value(*v)
    }
}

impl From<NaiveDate> for Input {
    fn from(d: NaiveDate) -> Self {
        Input::Value(TemporalValue::Date(d))
    }
}

impl From<NaiveDateTime> for Input {
    fn from(dt: NaiveDateTime) -> Self {
        Input::Value(TemporalValue::DateTime(dt))
    }
}

impl From<NaiveTime> for Input {
    fn from(t: NaiveTime) -> Self {
        Input::Value(TemporalValue::Time(t))
    }
}

impl From<ParseError> for Input {
    fn from(e: ParseError) -> Self {
        Input::Failed(e)
    }
}

impl From<DateValue> for Input {
    fn from(v: DateValue) -> Self {
        match v {
            Ok(v) => Input::Value(v),
            Err(e) => Input::Failed(e),
        }
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Input::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> TemporalValue {
        TemporalValue::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, mi, 0)
                .unwrap(),
        )
    }

    #[test]
    fn month_setter_clamps_day() {
        let v = dt(2024, 1, 31, 10, 0);
        assert_eq!(v.with_month(2).unwrap(), dt(2024, 2, 29, 10, 0));
        let leap = TemporalValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(
            leap.with_year(2023).unwrap(),
            TemporalValue::Date(NaiveDate::from_ymd_opt(2023, 2, 28).unwrap())
        );
    }

    #[test]
    fn month_arithmetic_clamps_day() {
        let v = dt(2024, 3, 31, 8, 30);
        assert_eq!(v.minus_months(1).unwrap(), dt(2024, 2, 29, 8, 30));
        assert_eq!(v.plus_years(1).unwrap(), dt(2025, 3, 31, 8, 30));
    }

    #[test]
    fn fields_missing_from_variant() {
        let d = TemporalValue::Date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(
            d.hour(),
            Err(AdapterError::unsupported(Field::Hour, Variant::Date))
        );
        let t = TemporalValue::Time(NaiveTime::from_hms_opt(1, 2, 3).unwrap());
        assert_eq!(
            t.year(),
            Err(AdapterError::unsupported(Field::Year, Variant::Time))
        );
        assert!(t.plus_days(1).is_err());
    }

    #[test]
    fn out_of_range_setters() {
        let v = dt(2024, 3, 10, 0, 0);
        assert_eq!(
            v.with_hour(24),
            Err(AdapterError::out_of_range(Field::Hour, 24u32))
        );
        assert!(v.with_month(13).is_err());
        assert!(v.with_nanosecond(1_000_000_000).is_err());
    }

    #[test]
    fn time_wraps_on_nano_subtraction() {
        let t = TemporalValue::Time(NaiveTime::MIN);
        assert_eq!(
            t.minus_nanos(1).unwrap(),
            TemporalValue::Time(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap())
        );
    }

    #[test]
    fn date_promotes_for_comparison() {
        let d = TemporalValue::Date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(d.compare(&dt(2024, 3, 10, 0, 0)).unwrap(), Ordering::Equal);
        assert!(d.is_before(&dt(2024, 3, 10, 0, 1)).unwrap());
        let t = TemporalValue::Time(NaiveTime::MIN);
        assert!(matches!(
            d.compare(&t),
            Err(AdapterError::IncompatibleVariants { .. })
        ));
    }

    #[test]
    fn native_dates_clip() {
        assert!(!NativeDate::from_millis(f64::NAN).is_valid());
        assert!(!NativeDate::from_millis(9e15).is_valid());
        assert_eq!(NativeDate::from_millis(1.7).epoch_millis(), Some(1));
        assert!(NativeDate::now().is_valid());
    }

    #[test]
    fn input_conversions() {
        assert_eq!(Input::from(None::<TemporalValue>), Input::Null);
        let e = ParseError::new("x", 0, "bad");
        assert_eq!(Input::from(Err::<TemporalValue, _>(e.clone())), Input::Failed(e));
        assert_eq!(Input::from("2024"), Input::Text("2024".to_string()));
    }
}
