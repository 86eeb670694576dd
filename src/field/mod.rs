//! Field declarations and per-run field state
//!
//! A [`Field`] is an immutable template: an optional human-readable label
//! plus an ordered validator chain. Declarations are built once per schema
//! type and shared read-only across every instance.
//!
//! A [`FieldState`] is one validation run's view of a field: the raw bound
//! value, the lazily computed cleaned value, the validity flag, and the
//! ordered error messages. Once computed within an instance, validity and
//! the cleaned value never change.

use std::sync::Arc;

use serde_json::Value;

use crate::schema::Peers;
use crate::validator::{self, Outcome, Validate};

/// Immutable field declaration: label plus ordered validator chain.
#[derive(Debug, Clone, Default)]
pub struct Field {
    label: Option<String>,
    chain: Vec<Arc<dyn Validate>>,
}

impl Field {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the human-readable label used in usage-defect messages.
    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(text.into());
        self
    }

    /// Appends a configured validator. Chain order is the call order.
    pub fn check(mut self, rule: impl Validate + 'static) -> Self {
        self.chain.push(Arc::new(rule));
        self
    }

    pub(crate) fn chain(&self) -> &[Arc<dyn Validate>] {
        &self.chain
    }
}

/// One field's state within a schema instance.
#[derive(Debug)]
pub struct FieldState {
    name: &'static str,
    decl: Field,
    raw: Option<Value>,
    cleaned: Option<Value>,
    errors: Vec<String>,
    validated: bool,
}

impl FieldState {
    /// Binds the declaration to an input value; `None` is the
    /// "not specified" sentinel. The cleaned value starts at the raw value
    /// and advances only as validators succeed.
    pub(crate) fn bind(name: &'static str, decl: Field, raw: Option<Value>) -> Self {
        let cleaned = raw.clone();
        Self {
            name,
            decl,
            raw,
            cleaned,
            errors: Vec::new(),
            validated: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.decl.label.as_deref()
    }

    /// The value bound from the input; `None` means the field was absent.
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Whether the chain produced no errors. Meaningful once the owning
    /// schema has validated; schema accessors guarantee that.
    pub fn is_valid(&self) -> bool {
        debug_assert!(self.validated, "field queried before validation");
        self.errors.is_empty()
    }

    /// Ordered rendered messages; empty for a valid field.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The current cleaned value, regardless of validity. Schema-level
    /// access enforces the invalid-field usage defect; peers read this
    /// during chain runs.
    pub(crate) fn current_cleaned(&self) -> Option<&Value> {
        self.cleaned.as_ref()
    }

    /// Appends a rendered message. Empty messages are dropped.
    pub(crate) fn add_error(&mut self, message: String) {
        if !message.is_empty() {
            self.errors.push(message);
        }
    }

    /// Runs the validator chain once, in declared order, stopping at the
    /// first failure. The cleaned value stays frozen at the value produced
    /// by the last successful validator. Memoized per instance.
    pub(crate) fn run_chain(&mut self, peers: &Peers<'_>) {
        if self.validated {
            return;
        }
        for index in 0..self.decl.chain().len() {
            let rule = Arc::clone(&self.decl.chain()[index]);
            match validator::run(rule.as_ref(), self.cleaned.as_ref(), peers) {
                Ok(Outcome::Keep) => {}
                Ok(Outcome::Rewrite(value)) => self.cleaned = Some(value),
                Err(failure) => {
                    tracing::debug!(
                        field = self.name,
                        stage = %failure.stage,
                        message = %failure.message,
                        "validator rejected value"
                    );
                    self.add_error(failure.message);
                    break;
                }
            }
        }
        self.validated = true;
    }
}
