use chrono::{NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use proptest::prelude::*;
use temporal_adapter::{ChronoEngine, Locale, TemporalAdapter, TemporalValue, Variant};

fn adapter(locale: &str) -> TemporalAdapter {
    TemporalAdapter::with_engine(ChronoEngine::new(Tz::UTC), Variant::DateTime)
        .with_locale(Locale::parse(locale).unwrap())
}

fn date_time() -> impl Strategy<Value = TemporalValue> {
    (
        1900i32..2100,
        1u32..=12,
        1u32..=31,
        0u32..24,
        0u32..60,
        0u32..60,
        0u32..1_000_000_000,
    )
        .prop_map(|(y, m, d, h, mi, s, n)| {
            let day = (1..=d)
                .rev()
                .find_map(|d| NaiveDate::from_ymd_opt(y, m, d))
                .unwrap();
            TemporalValue::DateTime(day.and_time(NaiveTime::from_hms_nano_opt(h, mi, s, n).unwrap()))
        })
}

proptest! {
    #[test]
    fn start_of_month_is_idempotent(value in date_time()) {
        let a = adapter("en-US");
        let once = a.start_of_month(value).unwrap();
        prop_assert_eq!(a.start_of_month(once).unwrap(), once);
        prop_assert_eq!(once.day().unwrap(), 1);
    }

    #[test]
    fn end_of_day_is_idempotent(value in date_time()) {
        let a = adapter("en-US");
        let once = a.end_of_day(value).unwrap();
        prop_assert_eq!(a.end_of_day(once).unwrap(), once);
        prop_assert!(a.is_same_day(once, value).unwrap());
    }

    #[test]
    fn month_array_has_twelve_month_starts(value in date_time()) {
        let months = adapter("fr").get_month_array(value).unwrap();
        prop_assert_eq!(months.len(), 12);
        for (i, month) in months.iter().enumerate() {
            prop_assert_eq!(month.year().unwrap(), value.year().unwrap());
            prop_assert_eq!(month.month().unwrap(), i as u32 + 1);
            prop_assert_eq!(month.day().unwrap(), 1);
            prop_assert_eq!(month.time().unwrap(), NaiveTime::MIN);
        }
    }

    #[test]
    fn week_array_covers_the_month(value in date_time(), us in any::<bool>()) {
        let a = adapter(if us { "en-US" } else { "de-DE" });
        let weeks = a.get_week_array(value).unwrap();
        let days: Vec<_> = weeks.concat();
        prop_assert!(weeks.iter().all(|w| w.len() == 7));
        prop_assert!(days.windows(2).all(|w| w[1] == w[0].plus_days(1).unwrap()));
        prop_assert!(days.iter().all(|d| d.time().unwrap().nanosecond() == 0));
        prop_assert_eq!(days[0], a.start_of_week(a.start_of_month(value).unwrap()).unwrap());
        prop_assert!(days.contains(&a.end_of_month(value).unwrap().at_midnight()));
        prop_assert!(weeks.len() >= 4 && weeks.len() <= 6);
    }

    #[test]
    fn iso_text_normalizes_to_the_same_value(value in date_time()) {
        let a = adapter("en-US");
        let text = a.format(value, "yyyy-MM-dd'T'HH:mm:ss'Z'").unwrap();
        let expected = value.with_nanosecond(0).unwrap();
        prop_assert_eq!(a.date(text.as_str()).unwrap(), Some(Ok(expected)));
    }
}
