use chrono::Weekday;

use crate::engine::TemporalEngine;
use crate::error::{AdapterError, Field, Result};
use crate::pattern::Pattern;
use crate::types::{Input, TemporalValue, Variant};

use super::TemporalAdapter;

fn start_of_month(value: &TemporalValue) -> Result<TemporalValue> {
    Ok(value.with_day(1)?.at_midnight())
}

/// Date values end on their last day; timed values one nanosecond before the
/// next month starts.
fn end_of_month(value: &TemporalValue) -> Result<TemporalValue> {
    let next = value.with_day(1)?.plus_months(1)?.at_midnight();
    match next {
        TemporalValue::Date(_) => next.minus_days(1),
        _ => next.minus_nanos(1),
    }
}

fn end_of_day(value: &TemporalValue) -> Result<TemporalValue> {
    match value {
        TemporalValue::Date(_) => Ok(*value),
        TemporalValue::DateTime(_) => value.plus_days(1)?.at_midnight().minus_nanos(1),
        TemporalValue::Time(_) => value.at_midnight().minus_nanos(1),
    }
}

fn start_of_year(value: &TemporalValue) -> Result<TemporalValue> {
    Ok(value.with_ordinal(1)?.at_midnight())
}

/// Days since the most recent `first_day`, zero when `value` falls on it.
fn days_into_week(value: &TemporalValue, first_day: Weekday) -> Result<i64> {
    let weekday = value.weekday()?;
    Ok(i64::from(
        (weekday.num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7,
    ))
}

fn start_of_week(value: &TemporalValue, first_day: Weekday) -> Result<TemporalValue> {
    let offset = days_into_week(value, first_day)?;
    Ok(value.minus_days(offset)?.at_midnight())
}

/// Date values end on the first day of the following week, which bounds the
/// week exclusively.
fn end_of_week(value: &TemporalValue, first_day: Weekday) -> Result<TemporalValue> {
    let offset = days_into_week(value, first_day)?;
    let next = value.plus_days(7 - offset)?.at_midnight();
    match next {
        TemporalValue::Date(_) => Ok(next),
        _ => next.minus_nanos(1),
    }
}

impl<E: TemporalEngine> TemporalAdapter<E> {
    fn first_day_of_week(&self, function: &'static str) -> Result<Weekday> {
        Ok(self.require_locale(function)?.first_day_of_week())
    }

    pub fn start_of_month(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        start_of_month(&self.require(value, "start_of_month")?)
    }

    pub fn end_of_month(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        end_of_month(&self.require(value, "end_of_month")?)
    }

    /// Midnight for timed values; dates are returned unchanged.
    pub fn start_of_day(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        Ok(self.require(value, "start_of_day")?.at_midnight())
    }

    pub fn end_of_day(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        end_of_day(&self.require(value, "end_of_day")?)
    }

    pub fn start_of_week(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        let first_day = self.first_day_of_week("start_of_week")?;
        start_of_week(&self.require(value, "start_of_week")?, first_day)
    }

    pub fn end_of_week(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        let first_day = self.first_day_of_week("end_of_week")?;
        end_of_week(&self.require(value, "end_of_week")?, first_day)
    }

    pub fn add_days(&self, value: impl Into<Input>, count: i64) -> Result<TemporalValue> {
        self.require(value, "add_days")?.plus_days(count)
    }

    pub fn get_hours(&self, value: impl Into<Input>) -> Result<u32> {
        self.require(value, "get_hours")?.hour()
    }

    pub fn set_hours(&self, value: impl Into<Input>, hours: u32) -> Result<TemporalValue> {
        self.require(value, "set_hours")?.with_hour(hours)
    }

    pub fn get_minutes(&self, value: impl Into<Input>) -> Result<u32> {
        self.require(value, "get_minutes")?.minute()
    }

    pub fn set_minutes(&self, value: impl Into<Input>, minutes: u32) -> Result<TemporalValue> {
        self.require(value, "set_minutes")?.with_minute(minutes)
    }

    pub fn get_seconds(&self, value: impl Into<Input>) -> Result<u32> {
        self.require(value, "get_seconds")?.second()
    }

    pub fn set_seconds(&self, value: impl Into<Input>, seconds: u32) -> Result<TemporalValue> {
        self.require(value, "set_seconds")?.with_second(seconds)
    }

    /// Zero-based: January is 0.
    pub fn get_month(&self, value: impl Into<Input>) -> Result<u32> {
        Ok(self.require(value, "get_month")?.month()? - 1)
    }

    /// Zero-based month. The day of month is clamped to the new month.
    pub fn set_month(&self, value: impl Into<Input>, month: u32) -> Result<TemporalValue> {
        let value = self.require(value, "set_month")?;
        let month = month
            .checked_add(1)
            .ok_or_else(|| AdapterError::out_of_range(Field::Month, month))?;
        value.with_month(month)
    }

    pub fn get_year(&self, value: impl Into<Input>) -> Result<i32> {
        self.require(value, "get_year")?.year()
    }

    pub fn set_year(&self, value: impl Into<Input>, year: i32) -> Result<TemporalValue> {
        self.require(value, "set_year")?.with_year(year)
    }

    pub fn get_previous_month(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        self.require(value, "get_previous_month")?.minus_months(1)
    }

    pub fn get_next_month(&self, value: impl Into<Input>) -> Result<TemporalValue> {
        self.require(value, "get_next_month")?.plus_months(1)
    }

    /// The first day of each month of `value`'s year, in order.
    pub fn get_month_array(&self, value: impl Into<Input>) -> Result<Vec<TemporalValue>> {
        let first = start_of_month(&self.require(value, "get_month_array")?)?;
        (1..=12).map(|month| first.with_month(month)).collect()
    }

    /// `date` with the clock fields of `time`. A date-only operand on either
    /// side returns `date` as is.
    pub fn merge_date_and_time(
        &self,
        date: impl Into<Input>,
        time: impl Into<Input>,
    ) -> Result<TemporalValue> {
        let date = self.require(date, "merge_date_and_time")?;
        let time = self.require(time, "merge_date_and_time")?;
        match (date, time.time()) {
            (TemporalValue::Date(_), _) | (_, None) => Ok(date),
            (TemporalValue::DateTime(dt), Some(t)) => Ok(TemporalValue::DateTime(dt.date().and_time(t))),
            (TemporalValue::Time(_), Some(t)) => Ok(TemporalValue::Time(t)),
        }
    }

    /// Short weekday names for the current week, starting on the locale's
    /// first day of the week.
    pub fn get_weekdays(&self) -> Result<Vec<String>> {
        let first_day = self.first_day_of_week("get_weekdays")?;
        let today = self.engine.now(Variant::DateTime);
        let start = start_of_week(&today, first_day)?;
        let pattern = Pattern::compile("eee")?;
        (0..7)
            .map(|i| {
                let day = start.plus_days(i)?;
                self.engine.render(&day, &pattern, self.locale.as_ref())
            })
            .collect()
    }

    /// The month of `value` as rows of seven days, padded with days of the
    /// neighbouring months so every row is a full week.
    pub fn get_week_array(&self, value: impl Into<Input>) -> Result<Vec<Vec<TemporalValue>>> {
        let first_day = self.first_day_of_week("get_week_array")?;
        let value = self.require(value, "get_week_array")?;
        let start = start_of_week(&start_of_month(&value)?, first_day)?;
        let end = end_of_week(&end_of_month(&value)?, first_day)?;

        let mut weeks: Vec<Vec<TemporalValue>> = Vec::new();
        let mut current = start;
        while current.is_before(&end)? {
            match weeks.last_mut() {
                Some(week) if week.len() < 7 => week.push(current),
                _ => weeks.push(vec![current]),
            }
            current = current.plus_days(1)?;
        }
        tracing::trace!(weeks = weeks.len(), %start, %end, "built week array");
        Ok(weeks)
    }

    /// The start of every year from `start`'s year through `end`'s year.
    pub fn get_year_range(
        &self,
        start: impl Into<Input>,
        end: impl Into<Input>,
    ) -> Result<Vec<TemporalValue>> {
        let start = self.require(start, "get_year_range")?;
        let end = self.require(end, "get_year_range")?;
        let bound = start_of_year(&end.plus_years(1)?)?;

        let mut years = Vec::new();
        let mut current = start_of_year(&start)?;
        while current.is_before(&bound)? {
            years.push(current);
            current = current.plus_years(1)?;
        }
        Ok(years)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::engine::ChronoEngine;
    use crate::locale::Locale;

    fn adapter(variant: Variant, locale: Option<&str>) -> TemporalAdapter {
        let mut adapter = TemporalAdapter::with_engine(ChronoEngine::new(chrono_tz::Tz::UTC), variant);
        adapter.locale = locale.map(|tag| Locale::parse(tag).unwrap());
        adapter
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> TemporalValue {
        TemporalValue::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, mi, 0)
                .unwrap(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> TemporalValue {
        TemporalValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn last_nano(y: i32, m: u32, d: u32) -> TemporalValue {
        TemporalValue::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap(),
        )
    }

    #[test]
    fn month_bounds() {
        let a = adapter(Variant::DateTime, None);
        assert_eq!(a.start_of_month(dt(2024, 2, 17, 9, 30)).unwrap(), dt(2024, 2, 1, 0, 0));
        assert_eq!(a.end_of_month(dt(2024, 2, 17, 9, 30)).unwrap(), last_nano(2024, 2, 29));
        assert_eq!(a.end_of_month(dt(2024, 1, 31, 9, 30)).unwrap(), last_nano(2024, 1, 31));
        assert_eq!(a.end_of_month(date(2023, 2, 10)).unwrap(), date(2023, 2, 28));
        assert_eq!(a.start_of_month(date(2023, 2, 10)).unwrap(), date(2023, 2, 1));
    }

    #[test]
    fn day_bounds() {
        let a = adapter(Variant::DateTime, None);
        assert_eq!(a.start_of_day(dt(2024, 3, 10, 14, 5)).unwrap(), dt(2024, 3, 10, 0, 0));
        assert_eq!(a.end_of_day(dt(2024, 3, 10, 14, 5)).unwrap(), last_nano(2024, 3, 10));
        assert_eq!(a.end_of_day(date(2024, 3, 10)).unwrap(), date(2024, 3, 10));
        let t = TemporalValue::Time(NaiveTime::from_hms_opt(14, 5, 0).unwrap());
        assert_eq!(a.start_of_day(t).unwrap(), TemporalValue::Time(NaiveTime::MIN));
        assert_eq!(
            a.end_of_day(t).unwrap(),
            TemporalValue::Time(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap())
        );
        assert!(matches!(
            a.start_of_month(t),
            Err(AdapterError::UnsupportedField { .. })
        ));
    }

    #[test]
    fn week_bounds_follow_locale() {
        // 2024-03-10 is a Sunday.
        let us = adapter(Variant::DateTime, Some("en-US"));
        assert_eq!(us.start_of_week(dt(2024, 3, 10, 12, 0)).unwrap(), dt(2024, 3, 10, 0, 0));
        assert_eq!(us.end_of_week(dt(2024, 3, 10, 12, 0)).unwrap(), last_nano(2024, 3, 16));
        let gb = adapter(Variant::DateTime, Some("en-GB"));
        assert_eq!(gb.start_of_week(dt(2024, 3, 10, 12, 0)).unwrap(), dt(2024, 3, 4, 0, 0));
        assert_eq!(gb.end_of_week(date(2024, 3, 10)).unwrap(), date(2024, 3, 11));
        let none = adapter(Variant::DateTime, None);
        assert_eq!(
            none.start_of_week(dt(2024, 3, 10, 12, 0)),
            Err(AdapterError::MissingLocale("start_of_week"))
        );
    }

    #[test]
    fn accessors_and_mutators() {
        let a = adapter(Variant::DateTime, None);
        let v = dt(2024, 1, 31, 14, 5);
        assert_eq!(a.get_hours(v).unwrap(), 14);
        assert_eq!(a.get_minutes(v).unwrap(), 5);
        assert_eq!(a.get_seconds(v).unwrap(), 0);
        assert_eq!(a.get_month(v).unwrap(), 0);
        assert_eq!(a.get_year(v).unwrap(), 2024);
        assert_eq!(a.set_hours(v, 9).unwrap(), dt(2024, 1, 31, 9, 5));
        assert_eq!(a.set_minutes(v, 59).unwrap(), dt(2024, 1, 31, 14, 59));
        assert_eq!(a.set_month(v, 1).unwrap(), dt(2024, 2, 29, 14, 5));
        assert_eq!(a.set_year(dt(2024, 2, 29, 0, 0), 2023).unwrap(), dt(2023, 2, 28, 0, 0));
        assert_eq!(a.get_next_month(v).unwrap(), dt(2024, 2, 29, 14, 5));
        assert_eq!(a.get_previous_month(v).unwrap(), dt(2023, 12, 31, 14, 5));
        assert_eq!(a.add_days(v, 1).unwrap(), dt(2024, 2, 1, 14, 5));
        assert!(matches!(
            a.set_hours(v, 24),
            Err(AdapterError::FieldOutOfRange { field: Field::Hour, .. })
        ));
        assert!(matches!(
            a.set_month(v, 12),
            Err(AdapterError::FieldOutOfRange { field: Field::Month, .. })
        ));
        assert!(matches!(
            a.get_hours(date(2024, 1, 1)),
            Err(AdapterError::UnsupportedField { field: Field::Hour, .. })
        ));
    }

    #[test]
    fn month_array() {
        let a = adapter(Variant::DateTime, None);
        let months = a.get_month_array(dt(2024, 7, 19, 8, 0)).unwrap();
        assert_eq!(months.len(), 12);
        for (i, m) in months.iter().enumerate() {
            assert_eq!(*m, dt(2024, i as u32 + 1, 1, 0, 0));
        }
    }

    #[test]
    fn merge() {
        let a = adapter(Variant::DateTime, None);
        let t = TemporalValue::Time(NaiveTime::from_hms_nano_opt(8, 15, 30, 5).unwrap());
        assert_eq!(
            a.merge_date_and_time(dt(2024, 3, 10, 14, 5), t).unwrap(),
            TemporalValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 10)
                    .unwrap()
                    .and_hms_nano_opt(8, 15, 30, 5)
                    .unwrap()
            )
        );
        assert_eq!(a.merge_date_and_time(date(2024, 3, 10), t).unwrap(), date(2024, 3, 10));
        assert_eq!(
            a.merge_date_and_time(dt(2024, 3, 10, 14, 5), date(2024, 1, 1)).unwrap(),
            dt(2024, 3, 10, 14, 5)
        );
    }

    #[test]
    fn week_array_for_us_and_monday_locales() {
        let us = adapter(Variant::DateTime, Some("en-US"));
        let weeks = us.get_week_array(dt(2024, 3, 15, 10, 0)).unwrap();
        // March 2024 starts on a Friday and ends on a Sunday.
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0][0], dt(2024, 2, 25, 0, 0));
        assert_eq!(weeks[5][6], dt(2024, 4, 6, 0, 0));
        assert!(weeks.iter().all(|w| w.len() == 7));

        let fr = adapter(Variant::Date, Some("fr-FR"));
        let weeks = fr.get_week_array(date(2024, 3, 15)).unwrap();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0], date(2024, 2, 26));
        assert_eq!(weeks[4][6], date(2024, 3, 31));

        let none = adapter(Variant::DateTime, None);
        assert_eq!(
            none.get_week_array(dt(2024, 3, 15, 10, 0)),
            Err(AdapterError::MissingLocale("get_week_array"))
        );
    }

    #[test]
    fn year_range() {
        let a = adapter(Variant::DateTime, None);
        assert_eq!(
            a.get_year_range(dt(2020, 1, 1, 0, 0), dt(2022, 6, 15, 0, 0)).unwrap(),
            vec![dt(2020, 1, 1, 0, 0), dt(2021, 1, 1, 0, 0), dt(2022, 1, 1, 0, 0)]
        );
        assert_eq!(
            a.get_year_range(date(2022, 5, 1), date(2022, 5, 1)).unwrap(),
            vec![date(2022, 1, 1)]
        );
        assert!(a.get_year_range(date(2020, 1, 1), Input::Null).is_err());
    }

    #[test]
    fn weekdays_follow_locale() {
        let us = adapter(Variant::DateTime, Some("en-US"));
        assert_eq!(
            us.get_weekdays().unwrap(),
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        let de = adapter(Variant::Time, Some("de-DE"));
        assert_eq!(
            de.get_weekdays().unwrap(),
            ["Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa.", "So."]
        );
        assert_eq!(
            adapter(Variant::DateTime, None).get_weekdays(),
            Err(AdapterError::MissingLocale("get_weekdays"))
        );
    }
}
