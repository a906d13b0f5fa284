//! Adapter options, loadable from TOML.
//!
//! ```toml
//! locale = "en-US"
//! variant = "date-time"
//! time_zone = "Europe/Paris"
//!
//! [formats]
//! year_month = "MMM yyyy"
//!
//! [formats.keys]
//! keyboardDate = "dd/MM/yyyy"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::engine::ChronoEngine;
use crate::error::{AdapterError, Result};
use crate::locale::Locale;
use crate::types::Variant;

/// Construction options for [`TemporalAdapter`](crate::TemporalAdapter).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterOptions {
    /// BCP-47 tag. Week and weekday operations need one.
    pub locale: Option<String>,

    pub variant: Variant,

    /// IANA zone name; the system zone when absent.
    pub time_zone: Option<String>,

    pub formats: Formats,
}

impl AdapterOptions {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| AdapterError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| AdapterError::Config(format!("{}: {e}", path.display())))?;
        let options: Self = toml::from_str(&source)
            .map_err(|e| AdapterError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded adapter options");
        Ok(options)
    }

    pub fn locale(&self) -> Result<Option<Locale>> {
        self.locale.as_deref().map(Locale::parse).transpose()
    }

    pub fn engine(&self) -> Result<ChronoEngine> {
        match &self.time_zone {
            Some(zone) => ChronoEngine::with_zone(zone),
            None => Ok(ChronoEngine::system()),
        }
    }
}

/// Named patterns used by the header helpers, plus overrides for the keyed
/// format table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Formats {
    pub year: String,
    pub year_month: String,
    pub date_time_12h: String,
    pub date_time_24h: String,
    pub time_12h: String,
    pub time_24h: String,
    pub date: String,
    pub keys: BTreeMap<FormatKey, String>,
}

impl Default for Formats {
    fn default() -> Self {
        Self {
            year: "yyyy".into(),
            year_month: "MMMM yyyy".into(),
            date_time_12h: "MMMM d hh:mm a".into(),
            date_time_24h: "MMMM d HH:mm".into(),
            time_12h: "hh:mm a".into(),
            time_24h: "HH:mm".into(),
            date: "MMMM d".into(),
            keys: BTreeMap::new(),
        }
    }
}

impl Formats {
    /// The pattern for `key`, honoring overrides.
    pub fn pattern(&self, key: FormatKey) -> &str {
        self.keys
            .get(&key)
            .map_or(key.default_pattern(), String::as_str)
    }
}

/// Keys of the predefined format table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatKey {
    FullDate,
    NormalDate,
    ShortDate,
    MonthAndDate,
    DayOfMonth,
    Year,
    Month,
    MonthShort,
    MonthAndYear,
    Minutes,
    Hours12h,
    Hours24h,
    Seconds,
    FullTime12h,
    FullTime24h,
    FullDateTime12h,
    FullDateTime24h,
    KeyboardDate,
    KeyboardDateTime12h,
    KeyboardDateTime24h,
}

impl FormatKey {
    pub const ALL: [FormatKey; 20] = [
        FormatKey::FullDate,
        FormatKey::NormalDate,
        FormatKey::ShortDate,
        FormatKey::MonthAndDate,
        FormatKey::DayOfMonth,
        FormatKey::Year,
        FormatKey::Month,
        FormatKey::MonthShort,
        FormatKey::MonthAndYear,
        FormatKey::Minutes,
        FormatKey::Hours12h,
        FormatKey::Hours24h,
        FormatKey::Seconds,
        FormatKey::FullTime12h,
        FormatKey::FullTime24h,
        FormatKey::FullDateTime12h,
        FormatKey::FullDateTime24h,
        FormatKey::KeyboardDate,
        FormatKey::KeyboardDateTime12h,
        FormatKey::KeyboardDateTime24h,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatKey::FullDate => "fullDate",
            FormatKey::NormalDate => "normalDate",
            FormatKey::ShortDate => "shortDate",
            FormatKey::MonthAndDate => "monthAndDate",
            FormatKey::DayOfMonth => "dayOfMonth",
            FormatKey::Year => "year",
            FormatKey::Month => "month",
            FormatKey::MonthShort => "monthShort",
            FormatKey::MonthAndYear => "monthAndYear",
            FormatKey::Minutes => "minutes",
            FormatKey::Hours12h => "hours12h",
            FormatKey::Hours24h => "hours24h",
            FormatKey::Seconds => "seconds",
            FormatKey::FullTime12h => "fullTime12h",
            FormatKey::FullTime24h => "fullTime24h",
            FormatKey::FullDateTime12h => "fullDateTime12h",
            FormatKey::FullDateTime24h => "fullDateTime24h",
            FormatKey::KeyboardDate => "keyboardDate",
            FormatKey::KeyboardDateTime12h => "keyboardDateTime12h",
            FormatKey::KeyboardDateTime24h => "keyboardDateTime24h",
        }
    }

    pub fn default_pattern(self) -> &'static str {
        match self {
            FormatKey::FullDate => "yyyy, MMMM d",
            FormatKey::NormalDate => "EEE, MMM d",
            FormatKey::ShortDate => "MMM d",
            FormatKey::MonthAndDate => "MMMM d",
            FormatKey::DayOfMonth => "d",
            FormatKey::Year => "yyyy",
            FormatKey::Month => "MMMM",
            FormatKey::MonthShort => "MMM",
            FormatKey::MonthAndYear => "MMMM yyyy",
            FormatKey::Minutes => "mm",
            FormatKey::Hours12h => "hh",
            FormatKey::Hours24h => "HH",
            FormatKey::Seconds => "ss",
            FormatKey::FullTime12h => "hh:mm a",
            FormatKey::FullTime24h => "HH:mm",
            FormatKey::FullDateTime12h => "yyyy, MMM d hh:mm a",
            FormatKey::FullDateTime24h => "yyyy, MMM d HH:mm",
            FormatKey::KeyboardDate => "yyyy/MM/dd",
            FormatKey::KeyboardDateTime12h => "yyyy/MM/dd hh:mm a",
            FormatKey::KeyboardDateTime24h => "yyyy/MM/dd HH:mm",
        }
    }
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatKey {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        FormatKey::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AdapterError::Config(format!("unknown format key '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let options = AdapterOptions::from_toml("").unwrap();
        assert_eq!(options, AdapterOptions::default());
        assert_eq!(options.variant, Variant::DateTime);
        assert_eq!(options.formats.year_month, "MMMM yyyy");
    }

    #[test]
    fn reads_all_sections() {
        let options = AdapterOptions::from_toml(
            r#"
            locale = "fr-FR"
            variant = "date"
            time_zone = "Europe/Paris"

            [formats]
            year_month = "MMM yyyy"

            [formats.keys]
            keyboardDate = "dd/MM/yyyy"
            "#,
        )
        .unwrap();
        assert_eq!(options.variant, Variant::Date);
        assert_eq!(options.locale().unwrap().unwrap().tag(), "fr-FR");
        assert_eq!(options.engine().unwrap(), ChronoEngine::new(chrono_tz::Europe::Paris));
        assert_eq!(options.formats.year_month, "MMM yyyy");
        assert_eq!(options.formats.time_24h, "HH:mm");
        assert_eq!(options.formats.pattern(FormatKey::KeyboardDate), "dd/MM/yyyy");
        assert_eq!(options.formats.pattern(FormatKey::FullDate), "yyyy, MMMM d");
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(
            AdapterOptions::from_toml("variant = \"week\""),
            Err(AdapterError::Config(_))
        ));
        assert!(matches!(
            AdapterOptions::from_toml("colour = \"blue\""),
            Err(AdapterError::Config(_))
        ));
        let options = AdapterOptions::from_toml("time_zone = \"Nowhere/Else\"").unwrap();
        assert!(matches!(options.engine(), Err(AdapterError::InvalidTimeZone(_))));
    }

    #[test]
    fn format_key_names_round_trip() {
        for key in FormatKey::ALL {
            assert_eq!(key.name().parse::<FormatKey>().unwrap(), key);
        }
    }
}
