//! Membership rules: `IsIn` and `NotIn`.

use serde_json::Value;

use super::{Failure, Outcome, Stage, Validate};
use crate::schema::Peers;

fn format_presets(presets: &[Value]) -> String {
    presets
        .iter()
        .map(|preset| match preset {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Passes iff the value is one of the configured presets. The sentinel is
/// not a preset, so a missing field fails.
#[derive(Debug, Clone)]
pub struct IsIn {
    presets: Vec<Value>,
    template: Option<String>,
}

impl IsIn {
    pub fn new<I, T>(presets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            presets: presets.into_iter().map(Into::into).collect(),
            template: None,
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for IsIn {
    fn default_template(&self) -> &'static str {
        "Value not in presets: ({0})."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn params(&self) -> Vec<String> {
        vec![format_presets(&self.presets)]
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        match value {
            Some(present) if self.presets.contains(present) => Ok(Outcome::Keep),
            _ => Err(self.fail(Stage::Value)),
        }
    }
}

/// Passes iff the value is not one of the configured presets. A missing
/// field is trivially outside the presets and passes.
#[derive(Debug, Clone)]
pub struct NotIn {
    presets: Vec<Value>,
    template: Option<String>,
}

impl NotIn {
    pub fn new<I, T>(presets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            presets: presets.into_iter().map(Into::into).collect(),
            template: None,
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for NotIn {
    fn default_template(&self) -> &'static str {
        "Value in presets: ({0})."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn params(&self) -> Vec<String> {
        vec![format_presets(&self.presets)]
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        match value {
            Some(present) if self.presets.contains(present) => Err(self.fail(Stage::Value)),
            _ => Ok(Outcome::Keep),
        }
    }
}
