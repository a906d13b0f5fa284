use std::fmt;

use crate::config::FormatKey;
use crate::engine::TemporalEngine;
use crate::error::Result;
use crate::locale::names_for;
use crate::pattern::Pattern;
use crate::types::{Input, Variant};

use super::TemporalAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Meridiem::Am => "am",
            Meridiem::Pm => "pm",
        })
    }
}

impl<E: TemporalEngine> TemporalAdapter<E> {
    fn render(&self, value: impl Into<Input>, pattern: &str, function: &'static str) -> Result<String> {
        let value = self.require(value, function)?;
        let pattern = Pattern::compile(pattern)?;
        self.engine.render(&value, &pattern, self.locale.as_ref())
    }

    /// Same as [`format_by_string`](Self::format_by_string).
    pub fn format(&self, value: impl Into<Input>, pattern: &str) -> Result<String> {
        self.render(value, pattern, "format")
    }

    pub fn format_by_string(&self, value: impl Into<Input>, pattern: &str) -> Result<String> {
        self.render(value, pattern, "format_by_string")
    }

    /// Render with one of the predefined formats, or its configured
    /// override.
    pub fn format_key(&self, value: impl Into<Input>, key: FormatKey) -> Result<String> {
        self.render(value, self.formats.pattern(key), "format_key")
    }

    pub fn format_number(&self, number: &str) -> String {
        number.to_string()
    }

    pub fn get_meridiem_text(&self, meridiem: Meridiem) -> &'static str {
        names_for(self.locale.as_ref()).meridiem(meridiem == Meridiem::Pm)
    }

    /// A pattern suited to the adapter's variant, for callers without one.
    pub fn default_format(&self, ampm: bool) -> &str {
        match (self.variant, ampm) {
            (Variant::Date, _) => &self.formats.date,
            (Variant::DateTime, true) => &self.formats.date_time_12h,
            (Variant::DateTime, false) => &self.formats.date_time_24h,
            (Variant::Time, true) => &self.formats.time_12h,
            (Variant::Time, false) => &self.formats.time_24h,
        }
    }

    pub fn get_calendar_header_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, &self.formats.year_month, "get_calendar_header_text")
    }

    pub fn get_year_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, &self.formats.year, "get_year_text")
    }

    pub fn get_date_picker_header_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, "EEE, MMM d", "get_date_picker_header_text")
    }

    pub fn get_date_time_picker_header_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, "MMM d", "get_date_time_picker_header_text")
    }

    pub fn get_month_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, "MMMM", "get_month_text")
    }

    pub fn get_day_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, "d", "get_day_text")
    }

    pub fn get_hour_text(&self, value: impl Into<Input>, ampm: bool) -> Result<String> {
        self.render(value, if ampm { "hh" } else { "HH" }, "get_hour_text")
    }

    pub fn get_minute_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, "mm", "get_minute_text")
    }

    pub fn get_second_text(&self, value: impl Into<Input>) -> Result<String> {
        self.render(value, "ss", "get_second_text")
    }
}
