//! Validator chain protocol and built-in rule catalog
//!
//! Every validator runs the same four-stage contract, in fixed order:
//!
//! 1. `specified_type` - the value is of a kind this rule can judge
//! 2. `on_missing` - presence check against the "not specified" sentinel
//! 3. `on_blank` - emptiness check on an explicitly supplied value
//! 4. `on_value` - the rule's actual condition; may rewrite the cleaned value
//!
//! All four must pass for the validator to pass. The first failing stage
//! produces a [`Failure`] carrying the stage identity and a message rendered
//! from the validator's template; later stages do not run.
//!
//! Configured validators are immutable and `Send + Sync`. Builder-style
//! configuration methods return brand-new instances, so two differently
//! configured rules built from the same starting point can never interfere
//! with each other's state.

mod bounds;
mod membership;
mod presence;
mod text;

use std::fmt;

use serde_json::Value;

use crate::schema::Peers;

pub use bounds::{HasLength, InRange, Length};
pub use membership::{IsIn, NotIn};
pub use presence::{NotBlank, NotEmpty, Required};
pub use text::{IsString, IsUrl, Regexp};

/// The stage of the chain protocol at which a validator rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `specified_type` - the value's kind is outside the rule's domain
    Type,
    /// `on_missing` - the field was absent from the input
    Missing,
    /// `on_blank` - the value was explicitly supplied but empty
    Blank,
    /// `on_value` - the rule's condition itself
    Value,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Type => write!(f, "type"),
            Stage::Missing => write!(f, "missing"),
            Stage::Blank => write!(f, "blank"),
            Stage::Value => write!(f, "value"),
        }
    }
}

/// A single validator's rejection: the failing stage plus the rendered
/// message. Captured by the owning field; never escapes `is_valid()`.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Stage that rejected the value
    pub stage: Stage,
    /// Message rendered from the validator's template and parameters
    pub message: String,
}

impl Failure {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} stage)", self.message, self.stage)
    }
}

/// Outcome of a successful value stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Leave the field's cleaned value as-is
    Keep,
    /// Replace the field's cleaned value before the next validator runs
    Rewrite(Value),
}

/// A validation rule.
///
/// Implementations override only the stages they care about; the defaults
/// pass. `value` is `None` when the field was absent from the input (the
/// "not specified" sentinel) - an explicit `Value::Null` is a present,
/// blank value, never the sentinel.
///
/// The trait is public so callers can feed their own rules to
/// [`Field::check`](crate::Field::check) exactly like the built-ins.
pub trait Validate: fmt::Debug + Send + Sync {
    /// Default message template, with positional slots (`{0}`, `{1}`).
    fn default_template(&self) -> &'static str;

    /// Override template configured at construction, if any.
    fn template_override(&self) -> Option<&str> {
        None
    }

    /// Parameters substituted into the template. Rendered only on failure.
    fn params(&self) -> Vec<String> {
        Vec::new()
    }

    fn specified_type(&self, _value: Option<&Value>) -> Result<(), Failure> {
        Ok(())
    }

    fn on_missing(&self, _value: Option<&Value>) -> Result<(), Failure> {
        Ok(())
    }

    fn on_blank(&self, _value: Option<&Value>) -> Result<(), Failure> {
        Ok(())
    }

    fn on_value(&self, _value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        Ok(Outcome::Keep)
    }

    /// Render this validator's failure message from its template and
    /// parameters, honoring a configured override.
    fn message(&self) -> String {
        let template = self.template_override().unwrap_or_else(|| self.default_template());
        render(template, &self.params())
    }

    /// Build a [`Failure`] for the given stage with the rendered message.
    fn fail(&self, stage: Stage) -> Failure {
        Failure::new(stage, self.message())
    }
}

/// Run one validator's full stage protocol against the field's current
/// cleaned value. Stages run in fixed order; the first rejection wins.
pub(crate) fn run(
    rule: &dyn Validate,
    value: Option<&Value>,
    peers: &Peers<'_>,
) -> Result<Outcome, Failure> {
    rule.specified_type(value)?;
    rule.on_missing(value)?;
    rule.on_blank(value)?;
    rule.on_value(value, peers)
}

/// Substitute positional slots (`{0}`, `{1}`, ...) with stringified
/// parameters. Slots without a matching parameter are left in place.
pub(crate) fn render(template: &str, params: &[String]) -> String {
    let mut out = template.to_string();
    for (index, param) in params.iter().enumerate() {
        out = out.replace(&format!("{{{index}}}"), param);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_positional_slots() {
        let params = vec!["2".to_string(), "4".to_string()];
        assert_eq!(
            render("Length must be between {0} and {1}.", &params),
            "Length must be between 2 and 4."
        );
    }

    #[test]
    fn test_render_without_params_leaves_template() {
        assert_eq!(render("Value is required.", &[]), "Value is required.");
    }

    #[test]
    fn test_render_repeated_slot() {
        let params = vec!["x".to_string()];
        assert_eq!(render("{0} and {0}", &params), "x and x");
    }

    #[test]
    fn test_failure_display_names_stage() {
        let failure = Failure::new(Stage::Type, "Value must be a string.");
        assert_eq!(failure.to_string(), "Value must be a string. (type stage)");
    }
}
