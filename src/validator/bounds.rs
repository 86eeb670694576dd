//! Size and range rules: `HasLength`, `Length`, `InRange`.
//!
//! Bound policy: `Length` and `InRange` require at least one bound. The
//! constructors are `between`, `at_least`, and `at_most`, so a boundless
//! configuration is unrepresentable; `between` with `min > max` is a
//! declaration defect and panics.

use std::fmt::Display;

use serde_json::Value;

use super::{Failure, Outcome, Stage, Validate};
use crate::schema::Peers;

const NO_LENGTH: &str = "Value has no length.";

/// The size a value reports for length checks. Strings measure trimmed
/// character count; arrays and objects measure element count. `None` means
/// the value does not support a size query.
fn size_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.trim().chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(entries) => Some(entries.len()),
        _ => None,
    }
}

/// Bound configuration shared by `Length` and `InRange`.
#[derive(Debug, Clone, Copy)]
enum Bounds<T> {
    Between(T, T),
    AtLeast(T),
    AtMost(T),
}

impl<T: PartialOrd + Copy + Display> Bounds<T> {
    fn contains(&self, value: T) -> bool {
        match *self {
            Bounds::Between(min, max) => min <= value && value <= max,
            Bounds::AtLeast(min) => min <= value,
            Bounds::AtMost(max) => value <= max,
        }
    }

    fn params(&self) -> Vec<String> {
        match *self {
            Bounds::Between(min, max) => vec![min.to_string(), max.to_string()],
            Bounds::AtLeast(bound) | Bounds::AtMost(bound) => vec![bound.to_string()],
        }
    }
}

/// Fails at the type stage unless the value supports a size query.
#[derive(Debug, Clone, Default)]
pub struct HasLength {
    template: Option<String>,
}

impl HasLength {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for HasLength {
    fn default_template(&self) -> &'static str {
        NO_LENGTH
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn specified_type(&self, value: Option<&Value>) -> Result<(), Failure> {
        match value.and_then(size_of) {
            Some(_) => Ok(()),
            None => Err(self.fail(Stage::Type)),
        }
    }
}

/// Bounds the size of a value. A value without size support (including the
/// sentinel) fails at the type stage; the value stage never runs for it.
///
/// # Panics
///
/// `between` panics if `min > max`.
#[derive(Debug, Clone)]
pub struct Length {
    bounds: Bounds<usize>,
    template: Option<String>,
}

impl Length {
    pub fn between(min: usize, max: usize) -> Self {
        assert!(min <= max, "inconsistent Length bounds: min {min} > max {max}");
        Self {
            bounds: Bounds::Between(min, max),
            template: None,
        }
    }

    pub fn at_least(min: usize) -> Self {
        Self {
            bounds: Bounds::AtLeast(min),
            template: None,
        }
    }

    pub fn at_most(max: usize) -> Self {
        Self {
            bounds: Bounds::AtMost(max),
            template: None,
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for Length {
    fn default_template(&self) -> &'static str {
        match self.bounds {
            Bounds::Between(..) => "Length must be between {0} and {1}.",
            Bounds::AtLeast(_) => "Length must be at least {0}.",
            Bounds::AtMost(_) => "Length must be at most {0}.",
        }
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn params(&self) -> Vec<String> {
        self.bounds.params()
    }

    fn specified_type(&self, value: Option<&Value>) -> Result<(), Failure> {
        match value.and_then(size_of) {
            Some(_) => Ok(()),
            None => Err(Failure::new(Stage::Type, NO_LENGTH)),
        }
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        // The type stage guarantees a measurable value by the time this runs.
        match value.and_then(size_of) {
            Some(size) if self.bounds.contains(size) => Ok(Outcome::Keep),
            _ => Err(self.fail(Stage::Value)),
        }
    }
}

/// Bounds a numeric value. A non-numeric or missing value fails at the
/// value stage.
///
/// # Panics
///
/// `between` panics if `min > max`.
#[derive(Debug, Clone)]
pub struct InRange {
    bounds: Bounds<f64>,
    template: Option<String>,
}

impl InRange {
    pub fn between(min: f64, max: f64) -> Self {
        assert!(min <= max, "inconsistent InRange bounds: min {min} > max {max}");
        Self {
            bounds: Bounds::Between(min, max),
            template: None,
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            bounds: Bounds::AtLeast(min),
            template: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            bounds: Bounds::AtMost(max),
            template: None,
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for InRange {
    fn default_template(&self) -> &'static str {
        match self.bounds {
            Bounds::Between(..) => "Value must be between {0} and {1}.",
            Bounds::AtLeast(_) => "Value must be at least {0}.",
            Bounds::AtMost(_) => "Value must be at most {0}.",
        }
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn params(&self) -> Vec<String> {
        self.bounds.params()
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        match value.and_then(Value::as_f64) {
            Some(number) if self.bounds.contains(number) => Ok(Outcome::Keep),
            _ => Err(self.fail(Stage::Value)),
        }
    }
}
