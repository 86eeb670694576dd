//! Text rules: `IsString`, `Regexp`, and the URL grammar rule `IsUrl`.
//!
//! `Regexp` and `IsUrl` treat a missing, null, or empty value as passing:
//! optionality is `Required`'s job, and an optional URL field must accept
//! absence without help. `IsString` is a strict type assertion and rejects
//! the sentinel.
//!
//! Compiled patterns are built from the stored configuration whenever a
//! builder method produces a new instance; no compiled state is ever shared
//! between differently configured rules.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::{Failure, Outcome, Stage, Validate};
use crate::schema::Peers;

/// Fails at the type stage unless the value is a string.
#[derive(Debug, Clone, Default)]
pub struct IsString {
    template: Option<String>,
}

impl IsString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for IsString {
    fn default_template(&self) -> &'static str {
        "Value must be a string."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn specified_type(&self, value: Option<&Value>) -> Result<(), Failure> {
        match value {
            Some(Value::String(_)) => Ok(()),
            _ => Err(self.fail(Stage::Type)),
        }
    }
}

/// True when the value is within a string rule's domain: a string, an
/// explicit null, or the sentinel.
fn string_or_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null) | Some(Value::String(_)))
}

/// The text to match, or `None` when the value is absent, null, or empty
/// and the rule should pass without matching.
fn matchable_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .unwrap_or_else(|e| panic!("invalid validation pattern `{pattern}`: {e}"))
}

/// Matches a string value against a compiled pattern.
///
/// # Panics
///
/// Construction panics on an invalid pattern: a bad pattern is a defect in
/// the schema declaration, not a data error.
#[derive(Debug, Clone)]
pub struct Regexp {
    pattern: String,
    case_insensitive: bool,
    regex: Regex,
    template: Option<String>,
}

impl Regexp {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let regex = compile(&pattern, false);
        Self {
            pattern,
            case_insensitive: false,
            regex,
            template: None,
        }
    }

    /// Returns a copy that matches case-insensitively. The pattern is
    /// recompiled from the stored configuration.
    pub fn case_insensitive(self) -> Self {
        let regex = compile(&self.pattern, true);
        Self {
            case_insensitive: true,
            regex,
            ..self
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Validate for Regexp {
    fn default_template(&self) -> &'static str {
        "Value does not match the expected pattern."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn specified_type(&self, value: Option<&Value>) -> Result<(), Failure> {
        if string_or_absent(value) {
            Ok(())
        } else {
            Err(Failure::new(Stage::Type, "Value must be a string."))
        }
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        match matchable_text(value) {
            Some(text) if !self.regex.is_match(text) => Err(self.fail(Stage::Value)),
            _ => Ok(Outcome::Keep),
        }
    }
}

const DEFAULT_SCHEMES: &[&str] = &["http", "https", "ftp"];

fn url_pattern(schemes: &[String], require_tld: bool) -> String {
    let scheme_alt = schemes.join("|");
    let label = r"[a-z0-9](?:[a-z0-9-]*[a-z0-9])?";
    let hostname = if require_tld {
        // One or more dotted labels followed by an alphabetic TLD.
        format!(r"(?:{label}\.)+[a-z]{{2,}}")
    } else {
        format!(r"{label}(?:\.{label})*")
    };
    format!(r"^(?:{scheme_alt})://(?:{hostname}|\d{{1,3}}(?:\.\d{{1,3}}){{3}})(?::\d+)?(?:/\S*)?$")
}

/// URL grammar rule: allow-listed scheme, `://`, hostname (with TLD suffix
/// unless disabled) or dotted-quad IPv4, optional port, optional path.
/// Case-insensitive throughout.
#[derive(Debug, Clone)]
pub struct IsUrl {
    schemes: Vec<String>,
    require_tld: bool,
    regex: Regex,
    template: Option<String>,
}

impl IsUrl {
    pub fn new() -> Self {
        let schemes: Vec<String> = DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect();
        let regex = compile(&url_pattern(&schemes, true), true);
        Self {
            schemes,
            require_tld: true,
            regex,
            template: None,
        }
    }

    /// Returns a copy with the TLD clause toggled. `require_tld(false)`
    /// allows single-label hosts such as `localhost`. The pattern is
    /// recompiled from the stored configuration.
    pub fn require_tld(self, required: bool) -> Self {
        let regex = compile(&url_pattern(&self.schemes, required), true);
        Self {
            require_tld: required,
            regex,
            ..self
        }
    }

    /// Returns a copy with a replacement scheme allow-list.
    pub fn schemes<I, T>(self, schemes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let schemes: Vec<String> = schemes.into_iter().map(Into::into).collect();
        let regex = compile(&url_pattern(&schemes, self.require_tld), true);
        Self {
            schemes,
            regex,
            ..self
        }
    }

    /// Returns a copy with an override message template.
    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }
}

impl Default for IsUrl {
    fn default() -> Self {
        Self::new()
    }
}

impl Validate for IsUrl {
    fn default_template(&self) -> &'static str {
        "Value is not a valid URL."
    }

    fn template_override(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn specified_type(&self, value: Option<&Value>) -> Result<(), Failure> {
        if string_or_absent(value) {
            Ok(())
        } else {
            Err(Failure::new(Stage::Type, "Value must be a string."))
        }
    }

    fn on_value(&self, value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        match matchable_text(value) {
            Some(text) if !self.regex.is_match(text) => Err(self.fail(Stage::Value)),
            _ => Ok(Outcome::Keep),
        }
    }
}
