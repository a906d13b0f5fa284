//! Error types for the adapter.
//!
//! Failures travel on two channels. A [`ParseError`] is ordinary data: strict
//! parsing returns it inside a [`DateValue`](crate::DateValue) and it flows
//! through normalization untouched. An [`AdapterError`] is raised for misuse
//! (unknown input shapes, missing configuration) and whenever a parse error
//! reaches an operation that needs a real value.

use std::fmt;

use thiserror::Error;

use crate::types::Variant;

/// A failed strict parse, carried as a value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("Text '{text}' could not be parsed at index {index}: {reason}")]
pub struct ParseError {
    text: String,
    index: usize,
    reason: String,
}

impl ParseError {
    pub fn new(text: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index,
            reason: reason.into(),
        }
    }

    /// The input that failed to parse.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset into [`text`](Self::text) where parsing stopped.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Calendar and clock fields a temporal value may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    DayOfMonth,
    DayOfYear,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    Nanosecond,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::DayOfMonth => "day-of-month",
            Field::DayOfYear => "day-of-year",
            Field::DayOfWeek => "day-of-week",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
            Field::Nanosecond => "nanosecond",
        })
    }
}

/// Fatal errors: raised immediately, never recovered from inside the adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// The input shape is not one the adapter knows how to normalize.
    #[error("Unknown Date value in function {function}(): {value}")]
    UnrecognizedInput {
        function: &'static str,
        value: String,
    },

    /// A locale-dependent operation ran without a configured locale.
    #[error("Function {0}() requires a locale to be set.")]
    MissingLocale(&'static str),

    /// A value-consuming operation received the "no date" state.
    #[error("Function {0}() received a null date")]
    NullValue(&'static str),

    /// A parse error reached an operation that needs a real value.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{variant} values do not support the {field} field")]
    UnsupportedField { field: Field, variant: Variant },

    #[error("Invalid value for {field}: {value}")]
    FieldOutOfRange { field: Field, value: i64 },

    #[error("Cannot compare a {left} value with a {right} value")]
    IncompatibleVariants { left: Variant, right: Variant },

    #[error("Invalid format pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Date arithmetic left the representable range.
    #[error("Date arithmetic overflowed in {0}()")]
    Overflow(&'static str),

    #[error("Invalid locale tag: {0}")]
    InvalidLocale(String),

    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AdapterError {
    pub(crate) fn unsupported(field: Field, variant: Variant) -> Self {
        Self::UnsupportedField { field, variant }
    }

    pub(crate) fn out_of_range(field: Field, value: impl Into<i64>) -> Self {
        Self::FieldOutOfRange {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;
