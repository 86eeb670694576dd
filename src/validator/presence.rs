//! Presence rules: `Required`, `NotBlank`, and the composite `NotEmpty`.
//!
//! `Required` rejects only the "not specified" sentinel - an explicitly
//! supplied falsy value (`0`, `""`, `null`) is present and passes.
//! `NotBlank` is the stage that rejects explicitly-empty values.
//! `NotEmpty` composes both under the same short-circuit rule.

use std::sync::Arc;

use serde_json::Value;

use super::{render, Failure, Outcome, Stage, Validate};
use crate::schema::Peers;

/// Fails iff the field was absent from the input.
#[derive(Debug, Clone, Default)]
pub struct Required {
    template: Option<String>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for Required {
    fn default_template(&self) -> &'static str {
        "Value is required."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn on_missing(&self, value: Option<&Value>) -> Result<(), Failure> {
        if value.is_none() {
            return Err(self.fail(Stage::Missing));
        }
        Ok(())
    }
}

/// True for the values the blank stage rejects: empty or whitespace-only
/// string, empty array, empty object, explicit null.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

/// Fails on an explicitly supplied blank value. The sentinel passes;
/// missing-ness is `Required`'s concern.
///
/// On success, rewrites a string value to its trimmed form so later
/// validators in the chain see the canonical text.
#[derive(Debug, Clone, Default)]
pub struct NotBlank {
    template: Option<String>,
}

impl NotBlank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for NotBlank {
    fn default_template(&self) -> &'static str {
        "Value couldn't be blank."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn on_blank(&self, value: Option<&Value>) -> Result<(), Failure> {
        match value {
            Some(present) if is_blank(present) => Err(self.fail(Stage::Blank)),
            _ => Ok(()),
        }
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        match value {
            Some(Value::String(text)) if text.trim() != text => {
                Ok(Outcome::Rewrite(Value::String(text.trim().to_string())))
            }
            _ => Ok(Outcome::Keep),
        }
    }
}

/// Composite of `Required` then `NotBlank`: the field must be present and
/// non-blank. Sub-checks run in order at every stage, first rejection wins.
///
/// An override template, when configured, replaces whichever sub-check
/// message would otherwise be rendered.
#[derive(Debug, Clone)]
pub struct NotEmpty {
    checks: Vec<Arc<dyn Validate>>,
    template: Option<String>,
}

impl NotEmpty {
    pub fn new() -> Self {
        Self {
            checks: vec![Arc::new(Required::new()), Arc::new(NotBlank::new())],
            template: None,
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }

    fn relabel(&self, failure: Failure) -> Failure {
        match &self.template {
            Some(template) => Failure::new(failure.stage, render(template, &[])),
            None => failure,
        }
    }
}

impl Default for NotEmpty {
    fn default() -> Self {
        Self::new()
    }
}

impl Validate for NotEmpty {
    fn default_template(&self) -> &'static str {
        "Value couldn't be empty."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn specified_type(&self, value: Option<&Value>) -> Result<(), Failure> {
        for check in &self.checks {
            check.specified_type(value).map_err(|f| self.relabel(f))?;
        }
        Ok(())
    }

    fn on_missing(&self, value: Option<&Value>) -> Result<(), Failure> {
        for check in &self.checks {
            check.on_missing(value).map_err(|f| self.relabel(f))?;
        }
        Ok(())
    }

    fn on_blank(&self, value: Option<&Value>) -> Result<(), Failure> {
        for check in &self.checks {
            check.on_blank(value).map_err(|f| self.relabel(f))?;
        }
        Ok(())
    }

    fn on_value(&self, value: Option<&Value>, peers: &Peers<'_>) -> Result<Outcome, Failure> {
        let mut rewritten: Option<Value> = None;
        for check in &self.checks {
            let current = rewritten.as_ref().or(value);
            if let Outcome::Rewrite(next) =
                check.on_value(current, peers).map_err(|f| self.relabel(f))?
            {
                rewritten = Some(next);
            }
        }
        Ok(match rewritten {
            Some(value) => Outcome::Rewrite(value),
            None => Outcome::Keep,
        })
    }
}
