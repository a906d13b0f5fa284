//! CLDR-style date patterns (`yyyy-MM-dd`, `EEE, MMM d`, `hh:mm a`, ...).
//!
//! A [`Pattern`] is compiled once and then used either to render a
//! [`TemporalValue`] or to strictly parse text back into one. Strict parsing
//! reports mismatches as a [`ParseError`] value; an invalid pattern is a
//! fatal [`AdapterError`].

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use fancy_regex::Regex as FancyRegex;

use crate::error::{AdapterError, Field, ParseError, Result};
use crate::locale::{Locale, Names, TextWidth, names_for};
use crate::types::{TemporalValue, Variant, days_in_month};

/// Quoted literal, run of one repeated letter, or run of other characters.
static TOKEN: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r"'(?:[^']|'')*'|([A-Za-z])\1*|[^A-Za-z']+")
        .expect("pattern tokenizer is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Year,
    Month,
    DayOfMonth,
    DayOfYear,
    Weekday,
    LocalWeekday,
    AmPm,
    /// `H`: 0-23
    HourOfDay,
    /// `k`: 1-24
    ClockHourOfDay,
    /// `K`: 0-11
    HourOfAmPm,
    /// `h`: 1-12
    ClockHourOfAmPm,
    Minute,
    Second,
    Fraction,
    NanoOfSecond,
}

impl Kind {
    fn from_letter(letter: char) -> Option<(Kind, usize)> {
        let kind = match letter {
            'y' | 'u' => (Kind::Year, 9),
            'M' | 'L' => (Kind::Month, 5),
            'd' => (Kind::DayOfMonth, 2),
            'D' => (Kind::DayOfYear, 3),
            'E' => (Kind::Weekday, 5),
            'e' | 'c' => (Kind::LocalWeekday, 5),
            'a' => (Kind::AmPm, 1),
            'H' => (Kind::HourOfDay, 2),
            'k' => (Kind::ClockHourOfDay, 2),
            'K' => (Kind::HourOfAmPm, 2),
            'h' => (Kind::ClockHourOfAmPm, 2),
            'm' => (Kind::Minute, 2),
            's' => (Kind::Second, 2),
            'S' => (Kind::Fraction, 9),
            'n' => (Kind::NanoOfSecond, 9),
            _ => return None,
        };
        Some(kind)
    }

    fn field(self) -> Field {
        match self {
            Kind::Year => Field::Year,
            Kind::Month => Field::Month,
            Kind::DayOfMonth => Field::DayOfMonth,
            Kind::DayOfYear => Field::DayOfYear,
            Kind::Weekday | Kind::LocalWeekday => Field::DayOfWeek,
            Kind::AmPm
            | Kind::HourOfDay
            | Kind::ClockHourOfDay
            | Kind::HourOfAmPm
            | Kind::ClockHourOfAmPm => Field::Hour,
            Kind::Minute => Field::Minute,
            Kind::Second => Field::Second,
            Kind::Fraction | Kind::NanoOfSecond => Field::Nanosecond,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field { kind: Kind, width: usize },
}

impl Token {
    fn is_numeric(&self) -> bool {
        match self {
            Token::Literal(_) => false,
            Token::Field { kind, width } => match kind {
                Kind::Month | Kind::LocalWeekday => *width <= 2,
                Kind::Weekday | Kind::AmPm => false,
                _ => true,
            },
        }
    }
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    tokens: Vec<Token>,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        for m in TOKEN.find_iter(source) {
            let m = m.map_err(|e| AdapterError::invalid_pattern(source, e.to_string()))?;
            if m.start() != pos {
                return Err(AdapterError::invalid_pattern(
                    source,
                    format!("unterminated quote at index {pos}"),
                ));
            }
            pos = m.end();
            tokens.push(compile_token(source, m.as_str())?);
        }
        if pos != source.len() {
            return Err(AdapterError::invalid_pattern(
                source,
                format!("unterminated quote at index {pos}"),
            ));
        }
        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render `value`. Fields the value's variant lacks are an error.
    pub fn render(&self, value: &TemporalValue, locale: Option<&Locale>) -> Result<String> {
        let names = names_for(locale);
        let first_day = locale.map_or(Weekday::Mon, Locale::first_day_of_week);
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.push_str(s),
                Token::Field { kind, width } => {
                    render_field(&mut out, value, *kind, *width, names, first_day)?
                }
            }
        }
        Ok(out)
    }

    /// Strictly parse `text` into `variant`. The whole text must match.
    pub fn parse(
        &self,
        text: &str,
        locale: Option<&Locale>,
        variant: Variant,
    ) -> std::result::Result<TemporalValue, ParseError> {
        let names = names_for(locale);
        let first_day = locale.map_or(Weekday::Mon, Locale::first_day_of_week);
        let mut parsed = Parsed::default();
        let mut pos = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Literal(lit) => {
                    if !text[pos..].starts_with(lit.as_str()) {
                        return Err(ParseError::new(text, pos, format!("expected '{lit}'")));
                    }
                    pos += lit.len();
                }
                Token::Field { kind, width } => {
                    let adjacent = self.tokens.get(i + 1).is_some_and(Token::is_numeric);
                    let start = pos;
                    let cursor = Cursor { text, pos: start };
                    let len = cursor
                        .field(*kind, *width, adjacent, names, first_day, &mut parsed)
                        .map_err(|reason| ParseError::new(text, start, reason))?;
                    pos = start + len;
                }
            }
        }
        if pos < text.len() {
            return Err(ParseError::new(text, pos, "unparsed text found"));
        }
        parsed
            .resolve(variant)
            .map_err(|reason| ParseError::new(text, 0, reason))
    }
}

fn compile_token(source: &str, token: &str) -> Result<Token> {
    if let Some(quoted) = token.strip_prefix('\'') {
        let inner = quoted.strip_suffix('\'').unwrap_or(quoted);
        // A bare '' is an escaped quote.
        let literal = if inner.is_empty() {
            "'".to_string()
        } else {
            inner.replace("''", "'")
        };
        return Ok(Token::Literal(literal));
    }
    let mut chars = token.chars();
    let Some(letter) = chars.next() else {
        return Ok(Token::Literal(String::new()));
    };
    if !letter.is_ascii_alphabetic() {
        return Ok(Token::Literal(token.to_string()));
    }
    let width = token.len();
    let Some((kind, max_width)) = Kind::from_letter(letter) else {
        return Err(AdapterError::invalid_pattern(
            source,
            format!("unknown pattern letter '{letter}'"),
        ));
    };
    if width > max_width {
        return Err(AdapterError::invalid_pattern(
            source,
            format!("too many pattern letters: {token}"),
        ));
    }
    Ok(Token::Field { kind, width })
}

fn text_width(width: usize) -> TextWidth {
    match width {
        4 => TextWidth::Full,
        5 => TextWidth::Narrow,
        _ => TextWidth::Short,
    }
}

/// 1-based position of `weekday` in a week starting on `first_day`.
fn local_weekday_number(weekday: Weekday, first_day: Weekday) -> u32 {
    (weekday.num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7 + 1
}

fn pad(out: &mut String, n: i64, width: usize) {
    if n < 0 {
        out.push('-');
    }
    out.push_str(&format!("{:0width$}", n.unsigned_abs()));
}

fn render_field(
    out: &mut String,
    value: &TemporalValue,
    kind: Kind,
    width: usize,
    names: &Names,
    first_day: Weekday,
) -> Result<()> {
    match kind {
        Kind::Year => {
            let year = i64::from(value.year()?);
            if width == 2 {
                pad(out, year.rem_euclid(100), 2);
            } else {
                pad(out, year, width);
            }
        }
        Kind::Month => {
            let month = value.month()?;
            match width {
                1 | 2 => pad(out, i64::from(month), width),
                _ => out.push_str(names.month(month, text_width(width))),
            }
        }
        Kind::DayOfMonth => pad(out, i64::from(value.day()?), width),
        Kind::DayOfYear => pad(out, i64::from(value.ordinal()?), width),
        Kind::Weekday => out.push_str(names.weekday(value.weekday()?, text_width(width))),
        Kind::LocalWeekday => {
            let weekday = value.weekday()?;
            match width {
                1 | 2 => pad(out, i64::from(local_weekday_number(weekday, first_day)), width),
                _ => out.push_str(names.weekday(weekday, text_width(width))),
            }
        }
        Kind::AmPm => out.push_str(names.meridiem(value.hour()? >= 12)),
        Kind::HourOfDay => pad(out, i64::from(value.hour()?), width),
        Kind::ClockHourOfDay => {
            let hour = value.hour()?;
            pad(out, i64::from(if hour == 0 { 24 } else { hour }), width)
        }
        Kind::HourOfAmPm => pad(out, i64::from(value.hour()? % 12), width),
        Kind::ClockHourOfAmPm => {
            let hour = value.hour()? % 12;
            pad(out, i64::from(if hour == 0 { 12 } else { hour }), width)
        }
        Kind::Minute => pad(out, i64::from(value.minute()?), width),
        Kind::Second => pad(out, i64::from(value.second()?), width),
        Kind::Fraction => {
            let nanos = format!("{:09}", value.nanosecond()?.min(999_999_999));
            out.push_str(&nanos[..width]);
        }
        Kind::NanoOfSecond => pad(out, i64::from(value.nanosecond()?), width),
    }
    Ok(())
}

/// Fields collected while scanning text, before they are resolved into a
/// value.
#[derive(Debug, Default)]
struct Parsed {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    ordinal: Option<i64>,
    weekday: Option<Weekday>,
    hour_of_day: Option<i64>,
    clock_hour_of_day: Option<i64>,
    hour_of_ampm: Option<i64>,
    clock_hour_of_ampm: Option<i64>,
    pm: Option<bool>,
    minute: Option<i64>,
    second: Option<i64>,
    nano: Option<i64>,
}

fn store<T: PartialEq + Copy + std::fmt::Debug>(
    slot: &mut Option<T>,
    value: T,
    field: Field,
) -> std::result::Result<(), String> {
    match slot {
        Some(existing) if *existing != value => Err(format!(
            "conflict found: {field} {existing:?} differs from {value:?}"
        )),
        _ => {
            *slot = Some(value);
            Ok(())
        }
    }
}

fn check_range(field: Field, value: i64, min: i64, max: i64) -> std::result::Result<i64, String> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "invalid value for {field} (valid values {min} - {max}): {value}"
        ))
    }
}

impl Parsed {
    fn resolve(&self, variant: Variant) -> std::result::Result<TemporalValue, String> {
        let date = self.resolve_date()?;
        let time = self.resolve_time()?;
        if let (Some(date), Some(weekday)) = (date, self.weekday) {
            if date.weekday() != weekday {
                return Err(format!(
                    "conflict found: {date} is a {:?}, not a {weekday:?}",
                    date.weekday()
                ));
            }
        }
        match (variant, date, time) {
            (Variant::Date, Some(date), _) => Ok(TemporalValue::Date(date)),
            (Variant::DateTime, Some(date), Some(time)) => {
                Ok(TemporalValue::DateTime(date.and_time(time)))
            }
            (Variant::Time, _, Some(time)) => Ok(TemporalValue::Time(time)),
            _ => Err(format!("unable to obtain a {variant} value from the parsed fields")),
        }
    }

    fn resolve_date(&self) -> std::result::Result<Option<NaiveDate>, String> {
        let Some(year) = self.year else {
            return Ok(None);
        };
        let year = check_range(Field::Year, year, -262_143, 262_142)? as i32;
        if let Some(ordinal) = self.ordinal {
            let ordinal = check_range(Field::DayOfYear, ordinal, 1, 366)? as u32;
            let date = NaiveDate::from_yo_opt(year, ordinal).ok_or_else(|| {
                format!("invalid date: day-of-year 366 in non-leap year {year}")
            })?;
            if self.month.is_some_and(|m| m != i64::from(date.month()))
                || self.day.is_some_and(|d| d != i64::from(date.day()))
            {
                return Err(format!("conflict found: day-of-year {ordinal} is {date}"));
            }
            return Ok(Some(date));
        }
        let (Some(month), Some(day)) = (self.month, self.day) else {
            return Ok(None);
        };
        let month = check_range(Field::Month, month, 1, 12)? as u32;
        let day = check_range(Field::DayOfMonth, day, 1, 31)? as u32;
        // Smart resolution: 29-31 past the month end clamps to the last day.
        let day = day.min(days_in_month(year, month));
        Ok(NaiveDate::from_ymd_opt(year, month, day))
    }

    fn resolve_time(&self) -> std::result::Result<Option<NaiveTime>, String> {
        let pm_offset = if self.pm == Some(true) { 12 } else { 0 };
        let mut hour = None;
        if let Some(h) = self.hour_of_day {
            store(&mut hour, check_range(Field::Hour, h, 0, 23)?, Field::Hour)?;
        }
        if let Some(k) = self.clock_hour_of_day {
            store(&mut hour, check_range(Field::Hour, k, 1, 24)? % 24, Field::Hour)?;
        }
        if let Some(k) = self.hour_of_ampm {
            store(&mut hour, check_range(Field::Hour, k, 0, 11)? + pm_offset, Field::Hour)?;
        }
        if let Some(h) = self.clock_hour_of_ampm {
            store(&mut hour, check_range(Field::Hour, h, 1, 12)? % 12 + pm_offset, Field::Hour)?;
        }
        let Some(hour) = hour else {
            return Ok(None);
        };
        if let Some(pm) = self.pm {
            if (hour >= 12) != pm {
                return Err(format!("conflict found: hour {hour} and {}", if pm { "PM" } else { "AM" }));
            }
        }
        let minute = check_range(Field::Minute, self.minute.unwrap_or(0), 0, 59)?;
        let second = check_range(Field::Second, self.second.unwrap_or(0), 0, 59)?;
        let nano = check_range(Field::Nanosecond, self.nano.unwrap_or(0), 0, 999_999_999)?;
        Ok(NaiveTime::from_hms_nano_opt(
            hour as u32,
            minute as u32,
            second as u32,
            nano as u32,
        ))
    }
}

/// Read position inside the text being parsed.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    /// Between `min` and `max` ASCII digits, returning the value and the
    /// number of bytes consumed.
    fn digits(&self, min: usize, max: usize) -> std::result::Result<(i64, usize), String> {
        let count = self
            .rest()
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if count < min {
            return Err(format!("expected at least {min} digit(s)"));
        }
        let value = self.rest()[..count]
            .parse()
            .map_err(|_| format!("expected at least {min} digit(s)"))?;
        Ok((value, count))
    }

    fn year(&self, width: usize, adjacent: bool) -> std::result::Result<(i64, usize), String> {
        if width == 2 {
            let (yy, len) = self.digits(2, 2)?;
            return Ok((2000 + yy, len));
        }
        let (sign, offset) = match self.rest().as_bytes().first() {
            Some(b'-') => (-1, 1),
            Some(b'+') => (1, 1),
            _ => (1, 0),
        };
        let inner = Cursor {
            text: self.text,
            pos: self.pos + offset,
        };
        let max = if adjacent && width > 1 { width } else { 9 };
        let (year, len) = inner.digits(width.min(max), max)?;
        Ok((sign * year, len + offset))
    }

    /// Parse one field into `parsed`, returning the bytes consumed.
    fn field(
        &self,
        kind: Kind,
        width: usize,
        adjacent: bool,
        names: &Names,
        first_day: Weekday,
        parsed: &mut Parsed,
    ) -> std::result::Result<usize, String> {
        let two = |width: usize| if width == 1 { (1, 2) } else { (2, 2) };
        let field = kind.field();
        let len = match kind {
            Kind::Year => {
                let (year, len) = self.year(width, adjacent)?;
                store(&mut parsed.year, year, field)?;
                len
            }
            Kind::Month if width >= 3 => {
                let (month, len) = names
                    .match_month(self.rest(), text_width(width))
                    .ok_or("expected a month name")?;
                store(&mut parsed.month, i64::from(month), field)?;
                len
            }
            Kind::Weekday => {
                let (weekday, len) = names
                    .match_weekday(self.rest(), text_width(width))
                    .ok_or("expected a weekday name")?;
                store(&mut parsed.weekday, weekday, field)?;
                len
            }
            Kind::LocalWeekday if width >= 3 => {
                let (weekday, len) = names
                    .match_weekday(self.rest(), text_width(width))
                    .ok_or("expected a weekday name")?;
                store(&mut parsed.weekday, weekday, field)?;
                len
            }
            Kind::LocalWeekday => {
                let (n, len) = self.digits(width, width)?;
                let n = check_range(field, n, 1, 7)?;
                let offset = first_day.num_days_from_monday() as i64 + n - 1;
                let weekday = Weekday::try_from((offset % 7) as u8)
                    .map_err(|_| format!("invalid value for {field}: {n}"))?;
                store(&mut parsed.weekday, weekday, field)?;
                len
            }
            Kind::AmPm => {
                let (pm, len) = names
                    .match_meridiem(self.rest())
                    .ok_or("expected AM or PM")?;
                store(&mut parsed.pm, pm, field)?;
                len
            }
            Kind::DayOfYear => {
                let (n, len) = self.digits(width, 3)?;
                store(&mut parsed.ordinal, n, field)?;
                len
            }
            Kind::Fraction => {
                let (n, len) = self.digits(width, width)?;
                let scale = 10_i64.pow((9 - width) as u32);
                store(&mut parsed.nano, n * scale, field)?;
                len
            }
            Kind::NanoOfSecond => {
                let max = if adjacent { width } else { 9 };
                let (n, len) = self.digits(width, max)?;
                store(&mut parsed.nano, n, field)?;
                len
            }
            _ => {
                let (min, max) = two(width);
                let (n, len) = self.digits(min, max)?;
                let slot = match kind {
                    Kind::Month => &mut parsed.month,
                    Kind::DayOfMonth => &mut parsed.day,
                    Kind::HourOfDay => &mut parsed.hour_of_day,
                    Kind::ClockHourOfDay => &mut parsed.clock_hour_of_day,
                    Kind::HourOfAmPm => &mut parsed.hour_of_ampm,
                    Kind::ClockHourOfAmPm => &mut parsed.clock_hour_of_ampm,
                    Kind::Minute => &mut parsed.minute,
                    _ => &mut parsed.second,
                };
                store(slot, n, field)?;
                len
            }
        };
        Ok(len)
    }
}
