//! The temporal engine an adapter delegates to.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{AdapterError, Result};
use crate::locale::Locale;
use crate::pattern::Pattern;
use crate::types::{DateValue, TemporalValue, Variant};

/// Clock, zone and pattern capabilities consumed by
/// [`TemporalAdapter`](crate::TemporalAdapter).
///
/// Only [`zone`](Self::zone) and [`now`](Self::now) are required; the rest
/// default to chrono and the crate's pattern language.
pub trait TemporalEngine {
    /// Zone used for "local" wall-clock conversions.
    fn zone(&self) -> Tz;

    fn now(&self, variant: Variant) -> TemporalValue;

    /// `None` when `ms` is outside chrono's range.
    fn from_epoch_millis(&self, ms: i64, zone: Tz, variant: Variant) -> Option<TemporalValue> {
        let utc = DateTime::from_timestamp_millis(ms)?;
        Some(variant.project(utc.with_timezone(&zone).naive_local()))
    }

    fn parse_strict(
        &self,
        text: &str,
        pattern: &Pattern,
        locale: Option<&Locale>,
        variant: Variant,
    ) -> DateValue {
        pattern.parse(text, locale, variant)
    }

    fn render(
        &self,
        value: &TemporalValue,
        pattern: &Pattern,
        locale: Option<&Locale>,
    ) -> Result<String> {
        pattern.render(value, locale)
    }
}

/// The default engine: the system clock seen through one IANA zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChronoEngine {
    zone: Tz,
}

impl ChronoEngine {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Bind to the host's zone, or UTC when it cannot be determined.
    pub fn system() -> Self {
        let name = iana_time_zone::get_timezone().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cannot determine the system time zone, using UTC");
            "UTC".to_string()
        });
        match name.parse::<Tz>() {
            Ok(zone) => Self { zone },
            Err(_) => {
                tracing::warn!(zone = %name, "unknown system time zone, using UTC");
                Self { zone: Tz::UTC }
            }
        }
    }

    pub fn with_zone(name: &str) -> Result<Self> {
        let zone = name
            .parse::<Tz>()
            .map_err(|_| AdapterError::InvalidTimeZone(name.to_string()))?;
        Ok(Self { zone })
    }
}

impl Default for ChronoEngine {
    fn default() -> Self {
        Self::system()
    }
}

impl TemporalEngine for ChronoEngine {
    fn zone(&self) -> Tz {
        self.zone
    }

    fn now(&self, variant: Variant) -> TemporalValue {
        variant.project(Utc::now().with_timezone(&self.zone).naive_local())
    }
}
