//! The date-utility contract over a [`TemporalEngine`].
//!
//! Every entry point takes raw [`Input`] and normalizes it first with the
//! rules of [`TemporalAdapter::date`]. The surface is split by concern:
//! comparisons in `compare`, calendar arithmetic and grids in `calendar`,
//! rendering in `format`.

use crate::config::{AdapterOptions, Formats};
use crate::engine::{ChronoEngine, TemporalEngine};
use crate::error::{AdapterError, Result};
use crate::lenient::parse_date_string;
use crate::locale::Locale;
use crate::pattern::Pattern;
use crate::types::{DateValue, Input, NativeDate, TemporalValue, Variant};

mod calendar;
mod compare;
mod format;

pub use format::Meridiem;

/// Date utilities bound to one value variant, an optional locale and an
/// engine.
#[derive(Debug, Clone)]
pub struct TemporalAdapter<E: TemporalEngine = ChronoEngine> {
    /// Consulted for names, meridiem text and the first day of the week.
    /// May be reassigned at any time.
    pub locale: Option<Locale>,
    pub formats: Formats,
    variant: Variant,
    engine: E,
}

impl TemporalAdapter<ChronoEngine> {
    /// An adapter on the system clock and zone, without a locale.
    pub fn new(variant: Variant) -> Self {
        Self::with_engine(ChronoEngine::system(), variant)
    }

    pub fn from_options(options: &AdapterOptions) -> Result<Self> {
        let adapter = Self {
            locale: options.locale()?,
            formats: options.formats.clone(),
            variant: options.variant,
            engine: options.engine()?,
        };
        tracing::debug!(
            variant = %adapter.variant,
            locale = ?adapter.locale.as_ref().map(Locale::tag),
            zone = %adapter.engine.zone(),
            "adapter configured"
        );
        Ok(adapter)
    }
}

impl<E: TemporalEngine> TemporalAdapter<E> {
    pub fn with_engine(engine: E, variant: Variant) -> Self {
        Self {
            locale: None,
            formats: Formats::default(),
            variant,
            engine,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn with_formats(mut self, formats: Formats) -> Self {
        self.formats = formats;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Normalize any accepted input.
    ///
    /// - `Null` gives `None`.
    /// - `Undefined` gives the engine's "now".
    /// - Text goes through the lenient parser; text that is not a date gives
    ///   `None`, not an error.
    /// - Temporal values and parse errors pass through unchanged.
    /// - A native instant is converted through the engine zone; an invalid
    ///   one gives `None`.
    /// - Any other shape is fatal.
    pub fn date(&self, input: impl Into<Input>) -> Result<Option<DateValue>> {
        self.normalize(input.into(), "date")
    }

    pub(crate) fn normalize(&self, input: Input, function: &'static str) -> Result<Option<DateValue>> {
        match input {
            Input::Null => Ok(None),
            Input::Undefined => Ok(Some(Ok(self.engine.now(self.variant)))),
            Input::Text(text) => {
                let native = parse_date_string(&text, self.engine.zone());
                if !native.is_valid() {
                    tracing::debug!(input = %text, "text is not a date, treating as null");
                }
                Ok(self.from_native(native).map(Ok))
            }
            Input::Value(value) => Ok(Some(Ok(value))),
            Input::Failed(err) => Ok(Some(Err(err))),
            Input::Native(native) => Ok(self.from_native(native).map(Ok)),
            other @ Input::Number(_) => Err(AdapterError::UnrecognizedInput {
                function,
                value: other.to_string(),
            }),
        }
    }

    fn from_native(&self, native: NativeDate) -> Option<TemporalValue> {
        let ms = native.epoch_millis()?;
        self.engine
            .from_epoch_millis(ms, self.engine.zone(), self.variant)
    }

    /// Normalize, re-raising a parse error. `None` stays `None`.
    pub(crate) fn optional(&self, input: impl Into<Input>, function: &'static str) -> Result<Option<TemporalValue>> {
        match self.normalize(input.into(), function)? {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(err)) => Err(AdapterError::Parse(err)),
        }
    }

    /// Normalize to a concrete value for operations that cannot accept null
    /// or a parse error.
    pub(crate) fn require(&self, input: impl Into<Input>, function: &'static str) -> Result<TemporalValue> {
        self.optional(input, function)?
            .ok_or(AdapterError::NullValue(function))
    }

    pub(crate) fn require_locale(&self, function: &'static str) -> Result<&Locale> {
        self.locale
            .as_ref()
            .ok_or(AdapterError::MissingLocale(function))
    }

    /// Strictly parse `text` against `pattern` into the adapter's variant.
    ///
    /// Empty text is `None`. A mismatch is returned as a value, an invalid
    /// pattern is fatal.
    pub fn parse(&self, text: &str, pattern: &str) -> Result<Option<DateValue>> {
        if text.is_empty() {
            return Ok(None);
        }
        let pattern = Pattern::compile(pattern)?;
        let value = self
            .engine
            .parse_strict(text, &pattern, self.locale.as_ref(), self.variant);
        if let Err(err) = &value {
            tracing::debug!(error = %err, pattern = pattern.source(), "strict parse failed");
        }
        Ok(Some(value))
    }

    pub fn is_valid(&self, input: impl Into<Input>) -> Result<bool> {
        match input.into() {
            Input::Failed(_) | Input::Null => Ok(false),
            Input::Undefined | Input::Value(_) => Ok(true),
            Input::Native(native) => Ok(native.is_valid()),
            Input::Text(text) => Ok(parse_date_string(&text, self.engine.zone()).is_valid()),
            other @ Input::Number(_) => Err(AdapterError::UnrecognizedInput {
                function: "is_valid",
                value: other.to_string(),
            }),
        }
    }

    /// `true` only for the absence of a value. A parse error is not null.
    pub fn is_null(&self, value: Option<&DateValue>) -> bool {
        value.is_none()
    }
}
