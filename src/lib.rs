//! Date utilities over `chrono`: normalization of loosely typed inputs,
//! strict and lenient parsing, comparison predicates, calendar grids and
//! CLDR-style pattern formatting.
//!
//! ```no_run
//! use temporal_adapter::{Locale, TemporalAdapter, Variant};
//!
//! let adapter = TemporalAdapter::new(Variant::DateTime)
//!     .with_locale(Locale::parse("en-US")?);
//! let parsed = adapter.parse("2024-03-10 14:05", "yyyy-MM-dd HH:mm")?;
//! if let Some(Ok(value)) = parsed {
//!     println!("{}", adapter.format(value, "EEE, MMM d hh:mm a")?);
//!     println!("{} weeks", adapter.get_week_array(value)?.len());
//! }
//! # Ok::<(), temporal_adapter::AdapterError>(())
//! ```

mod adapter;
mod config;
mod engine;
mod error;
mod lenient;
mod locale;
mod pattern;
mod types;

pub use adapter::{Meridiem, TemporalAdapter};
pub use config::{AdapterOptions, FormatKey, Formats};
pub use engine::{ChronoEngine, TemporalEngine};
pub use error::{AdapterError, Field, ParseError, Result};
pub use lenient::parse_date_string;
pub use locale::Locale;
pub use pattern::Pattern;
pub use types::{DateValue, Input, NativeDate, TemporalValue, Variant};
