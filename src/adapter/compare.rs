use std::cmp::Ordering;

use crate::engine::TemporalEngine;
use crate::error::{AdapterError, Field, Result};
use crate::types::{Input, TemporalValue};

use super::TemporalAdapter;

/// Date operands become midnight date-times; time-only operands have no day
/// or year to compare against.
fn promote(value: &TemporalValue, field: Field) -> Result<TemporalValue> {
    value
        .to_date_time()
        .map(TemporalValue::DateTime)
        .ok_or_else(|| AdapterError::unsupported(field, value.variant()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    Year,
    Month,
    Day,
    Hour,
}

/// Equal on every calendar unit down to `unit`.
fn same_unit(a: &TemporalValue, b: &TemporalValue, unit: Unit) -> Result<bool> {
    if a.year()? != b.year()? {
        return Ok(false);
    }
    if unit >= Unit::Month && a.month()? != b.month()? {
        return Ok(false);
    }
    if unit >= Unit::Day && a.day()? != b.day()? {
        return Ok(false);
    }
    if unit >= Unit::Hour && a.hour()? != b.hour()? {
        return Ok(false);
    }
    Ok(true)
}

impl<E: TemporalEngine> TemporalAdapter<E> {
    /// Normalize both operands and apply the null policy: two nulls give
    /// `both_null`, one null gives `false`. Null checks come first, so a
    /// parse error is only fatal when the other operand is present.
    fn compare_with(
        &self,
        a: Input,
        b: Input,
        function: &'static str,
        both_null: bool,
        f: impl FnOnce(&TemporalValue, &TemporalValue) -> Result<bool>,
    ) -> Result<bool> {
        let a = self.normalize(a, function)?;
        let b = self.normalize(b, function)?;
        match (a, b) {
            (None, None) => Ok(both_null),
            (None, Some(_)) | (Some(_), None) => Ok(false),
            (Some(Err(err)), Some(_)) | (Some(_), Some(Err(err))) => Err(AdapterError::Parse(err)),
            (Some(Ok(a)), Some(Ok(b))) => f(&a, &b),
        }
    }

    pub fn is_equal(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_equal", true, |a, b| {
            Ok(a.compare(b)? == Ordering::Equal)
        })
    }

    pub fn is_before(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_before", false, |a, b| {
            a.is_before(b)
        })
    }

    pub fn is_after(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_after", false, |a, b| {
            a.is_after(b)
        })
    }

    pub fn is_same_day(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_same_day", true, |a, b| {
            same_unit(a, b, Unit::Day)
        })
    }

    pub fn is_same_month(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_same_month", true, |a, b| {
            same_unit(a, b, Unit::Month)
        })
    }

    pub fn is_same_year(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_same_year", true, |a, b| {
            same_unit(a, b, Unit::Year)
        })
    }

    /// Time-only values compare the hour alone; dated values also need the
    /// same day.
    pub fn is_same_hour(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_same_hour", true, |a, b| {
            match (a, b) {
                (TemporalValue::Time(_), TemporalValue::Time(_)) => Ok(a.hour()? == b.hour()?),
                (TemporalValue::Time(_), _) | (_, TemporalValue::Time(_)) => {
                    Err(AdapterError::IncompatibleVariants {
                        left: a.variant(),
                        right: b.variant(),
                    })
                }
                _ => same_unit(a, b, Unit::Hour),
            }
        })
    }

    /// Strictly after the last instant of `comparing`'s day.
    pub fn is_after_day(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_after_day", false, |a, b| {
            let a = promote(a, Field::DayOfMonth)?;
            let boundary = promote(b, Field::DayOfMonth)?
                .plus_days(1)?
                .at_midnight()
                .minus_nanos(1)?;
            a.is_after(&boundary)
        })
    }

    /// Strictly before the start of `comparing`'s day.
    pub fn is_before_day(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_before_day", false, |a, b| {
            let a = promote(a, Field::DayOfMonth)?;
            let boundary = promote(b, Field::DayOfMonth)?.at_midnight();
            a.is_before(&boundary)
        })
    }

    pub fn is_after_year(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_after_year", false, |a, b| {
            let a = promote(a, Field::Year)?;
            let boundary = promote(b, Field::Year)?
                .plus_years(1)?
                .with_ordinal(1)?
                .at_midnight()
                .minus_nanos(1)?;
            a.is_after(&boundary)
        })
    }

    pub fn is_before_year(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<bool> {
        self.compare_with(value.into(), comparing.into(), "is_before_year", false, |a, b| {
            let a = promote(a, Field::Year)?;
            let boundary = promote(b, Field::Year)?.with_ordinal(1)?.at_midnight();
            a.is_before(&boundary)
        })
    }

    /// Milliseconds from `comparing` to `value`, positive when `value` is
    /// later. Nulls and parse errors are fatal.
    pub fn get_diff(&self, value: impl Into<Input>, comparing: impl Into<Input>) -> Result<i64> {
        let from = self.require(comparing, "get_diff")?;
        let to = self.require(value, "get_diff")?;
        let delta = match (from, to) {
            (TemporalValue::Time(a), TemporalValue::Time(b)) => b.signed_duration_since(a),
            _ => match (from.to_date_time(), to.to_date_time()) {
                (Some(a), Some(b)) => b.signed_duration_since(a),
                _ => {
                    return Err(AdapterError::IncompatibleVariants {
                        left: to.variant(),
                        right: from.variant(),
                    });
                }
            },
        };
        Ok(delta.num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::engine::ChronoEngine;
    use crate::error::ParseError;
    use crate::types::Variant;

    fn adapter() -> TemporalAdapter {
        TemporalAdapter::with_engine(ChronoEngine::new(chrono_tz::Tz::UTC), Variant::DateTime)
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> TemporalValue {
        TemporalValue::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> TemporalValue {
        TemporalValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn time(h: u32, m: u32) -> TemporalValue {
        TemporalValue::Time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn null_policy() {
        let a = adapter();
        let d = dt(2024, 3, 10, 0, 0, 0);
        assert!(a.is_same_day(Input::Null, Input::Null).unwrap());
        assert!(!a.is_same_day(d, Input::Null).unwrap());
        assert!(!a.is_same_day(Input::Null, d).unwrap());
        assert!(a.is_equal(Input::Null, Input::Null).unwrap());
        assert!(!a.is_before(Input::Null, Input::Null).unwrap());
        assert!(!a.is_after_day(Input::Null, d).unwrap());
    }

    #[test]
    fn null_wins_over_parse_error() {
        let a = adapter();
        let err = ParseError::new("x", 0, "bad");
        assert_eq!(a.is_equal(err.clone(), Input::Null), Ok(false));
        assert_eq!(a.is_equal(Input::Null, err.clone()), Ok(false));
        assert_eq!(a.is_same_day(err.clone(), Input::Null), Ok(false));
        assert_eq!(a.is_after_year(Input::Null, err), Ok(false));
    }

    #[test]
    fn parse_errors_are_fatal() {
        let a = adapter();
        let err = ParseError::new("nope", 0, "bad");
        assert_eq!(
            a.is_equal(err.clone(), err.clone()),
            Err(AdapterError::Parse(err.clone()))
        );
        assert_eq!(
            a.is_before(dt(2024, 1, 1, 0, 0, 0), err.clone()),
            Err(AdapterError::Parse(err))
        );
    }

    #[test]
    fn day_boundaries() {
        let a = adapter();
        assert!(!a.is_after_day(dt(2024, 3, 10, 23, 59, 59), dt(2024, 3, 10, 0, 0, 0)).unwrap());
        assert!(a.is_after_day(dt(2024, 3, 11, 0, 0, 0), dt(2024, 3, 10, 23, 59, 59)).unwrap());
        assert!(a.is_before_day(dt(2024, 3, 9, 23, 59, 59), dt(2024, 3, 10, 12, 0, 0)).unwrap());
        assert!(!a.is_before_day(dt(2024, 3, 10, 0, 0, 0), dt(2024, 3, 10, 12, 0, 0)).unwrap());
        // Dates are promoted to midnight.
        assert!(a.is_after_day(date(2024, 3, 11), date(2024, 3, 10)).unwrap());
        assert!(!a.is_after_day(date(2024, 3, 10), dt(2024, 3, 10, 8, 0, 0)).unwrap());
        assert!(matches!(
            a.is_after_day(time(1, 0), time(2, 0)),
            Err(AdapterError::UnsupportedField { .. })
        ));
    }

    #[test]
    fn year_boundaries() {
        let a = adapter();
        assert!(a.is_after_year(dt(2025, 1, 1, 0, 0, 0), dt(2024, 6, 1, 0, 0, 0)).unwrap());
        assert!(!a.is_after_year(dt(2024, 12, 31, 23, 59, 59), dt(2024, 6, 1, 0, 0, 0)).unwrap());
        assert!(a.is_before_year(dt(2023, 12, 31, 23, 59, 59), dt(2024, 6, 1, 0, 0, 0)).unwrap());
        assert!(!a.is_before_year(date(2024, 1, 1), dt(2024, 6, 1, 0, 0, 0)).unwrap());
    }

    #[test]
    fn same_unit_predicates() {
        let a = adapter();
        assert!(a.is_same_day(dt(2024, 3, 10, 1, 0, 0), date(2024, 3, 10)).unwrap());
        assert!(a.is_same_month(dt(2024, 3, 1, 0, 0, 0), dt(2024, 3, 31, 0, 0, 0)).unwrap());
        assert!(!a.is_same_month(dt(2024, 3, 1, 0, 0, 0), dt(2023, 3, 1, 0, 0, 0)).unwrap());
        assert!(a.is_same_year(date(2024, 1, 1), date(2024, 12, 31)).unwrap());
        assert!(a.is_same_hour(dt(2024, 3, 10, 14, 0, 0), dt(2024, 3, 10, 14, 59, 0)).unwrap());
        assert!(!a.is_same_hour(dt(2024, 3, 10, 14, 0, 0), dt(2024, 3, 11, 14, 0, 0)).unwrap());
        assert!(a.is_same_hour(time(9, 0), time(9, 30)).unwrap());
        assert!(matches!(
            a.is_same_hour(time(9, 0), dt(2024, 3, 10, 9, 0, 0)),
            Err(AdapterError::IncompatibleVariants { .. })
        ));
    }

    #[test]
    fn ordering_across_variants() {
        let a = adapter();
        assert!(a.is_equal(date(2024, 3, 10), dt(2024, 3, 10, 0, 0, 0)).unwrap());
        assert!(a.is_before(date(2024, 3, 10), dt(2024, 3, 10, 0, 0, 1)).unwrap());
        assert!(a.is_after(time(10, 0), time(9, 0)).unwrap());
        assert!(a.is_before(time(10, 0), date(2024, 3, 10)).is_err());
    }

    #[test]
    fn diff_in_millis() {
        let a = adapter();
        assert_eq!(
            a.get_diff(dt(2024, 3, 10, 0, 0, 1), dt(2024, 3, 10, 0, 0, 0)).unwrap(),
            1_000
        );
        assert_eq!(
            a.get_diff(date(2024, 3, 9), dt(2024, 3, 10, 0, 0, 0)).unwrap(),
            -86_400_000
        );
        assert_eq!(a.get_diff(time(10, 0), time(9, 30)).unwrap(), 1_800_000);
        assert_eq!(
            a.get_diff(Input::Null, date(2024, 3, 9)),
            Err(AdapterError::NullValue("get_diff"))
        );
    }
}
