//! Schema definition, registry, and per-record instances
//!
//! A schema type declares its fields once, statically, through
//! [`SchemaDef::fields`]; the registry caches the declared set per type on
//! first use. Each [`Schema`] instance binds one input record, runs every
//! field's validator chain lazily in declaration order, and aggregates
//! per-field outcomes.
//!
//! # Design principles
//!
//! - Declarations are immutable and shared; instances never share mutable
//!   state with each other
//! - Validation is deterministic and runs to completion: one field's
//!   failure never blocks another field from validating
//! - Validity and cleaned values are memoized per instance and never
//!   change once computed
//! - Data-driven failures land in the error lists; programmer errors
//!   (zero fields, unknown names, cleaned data off an invalid field)
//!   panic

mod registry;

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use crate::field::{Field, FieldState};
use crate::source::{self, SourceError, ValueSource};

/// A schema definition: an ordered list of named field declarations.
///
/// The list is materialized and cached on the first construction of any
/// instance of the implementing type; a type declaring zero fields panics
/// there.
pub trait SchemaDef: 'static {
    fn fields() -> Vec<(&'static str, Field)>;

    /// Binds one input record to a fresh instance of this schema.
    fn schema(source: &impl ValueSource) -> Schema<Self>
    where
        Self: Sized,
    {
        Schema::new(source)
    }
}

/// Read access to sibling fields' current cleaned values during one
/// field's chain run. Fields later in declaration order expose their raw
/// value until their own chain has run.
pub struct Peers<'a> {
    before: &'a [FieldState],
    after: &'a [FieldState],
}

impl Peers<'_> {
    /// The named sibling's current cleaned value; `None` for an unknown
    /// name or a sibling bound to the sentinel.
    pub fn cleaned(&self, name: &str) -> Option<&Value> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find(|field| field.name() == name)
            .and_then(|field| field.current_cleaned())
    }

    /// A view with no siblings, for exercising single rules.
    #[cfg(test)]
    pub(crate) fn detached() -> Peers<'static> {
        Peers {
            before: &[],
            after: &[],
        }
    }
}

/// One schema instance: declared fields bound to one input record.
///
/// Validation is lazy and memoized: the first call to any of
/// [`is_valid`](Self::is_valid), [`errors`](Self::errors),
/// [`field`](Self::field), or [`cleaned`](Self::cleaned) runs every
/// field's chain; later calls re-run nothing.
#[derive(Debug)]
pub struct Schema<S: SchemaDef> {
    fields: Vec<FieldState>,
    valid: Option<bool>,
    _def: PhantomData<S>,
}

impl<S: SchemaDef> Schema<S> {
    /// Binds the input to the declared fields. Fields the source has no
    /// entry for stay bound to the "not specified" sentinel; input keys
    /// with no declared field are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `S` declares zero fields (first construction only).
    pub fn new(source: &impl ValueSource) -> Self {
        let set = registry::field_set::<S>();
        let fields = set
            .iter()
            .map(|(name, decl)| FieldState::bind(name, decl.clone(), source.lookup(name)))
            .collect();
        Self {
            fields,
            valid: None,
            _def: PhantomData,
        }
    }

    /// Binds a serializable record (struct, map, ...) by serializing it to
    /// a JSON object first.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the record does not serialize to an
    /// object.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, SourceError> {
        let source = source::record_source(record)?;
        Ok(Self::new(&source))
    }

    /// True iff no field recorded an error. Every field validates
    /// independently; one field's failure never aborts the rest.
    pub fn is_valid(&mut self) -> bool {
        self.ensure_validated();
        self.valid.unwrap_or_default()
    }

    /// Field name to ordered message list; names with zero errors are
    /// omitted entirely.
    pub fn errors(&mut self) -> BTreeMap<&'static str, Vec<String>> {
        self.ensure_validated();
        self.fields
            .iter()
            .filter(|field| !field.errors().is_empty())
            .map(|field| (field.name(), field.errors().to_vec()))
            .collect()
    }

    /// Per-field inspection: validity, errors, label, raw value.
    ///
    /// # Panics
    ///
    /// Panics on an undeclared field name.
    pub fn field(&mut self, name: &str) -> &FieldState {
        self.ensure_validated();
        self.lookup(name)
    }

    /// The field's cleaned value; `None` means the field was not
    /// specified in the input.
    ///
    /// # Panics
    ///
    /// Panics on an undeclared field name, and on a field that ended
    /// invalid: cleaned data off an invalid field is a usage defect, and
    /// this never returns a guessed value.
    pub fn cleaned(&mut self, name: &str) -> Option<&Value> {
        self.ensure_validated();
        let field = self.lookup(name);
        if !field.is_valid() {
            panic!(
                "cleaned data requested from invalid field `{}` ({})",
                field.name(),
                field.label().unwrap_or(field.name()),
            );
        }
        field.current_cleaned()
    }

    fn lookup(&self, name: &str) -> &FieldState {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .unwrap_or_else(|| panic!("unknown field `{name}`"))
    }

    fn ensure_validated(&mut self) {
        if self.valid.is_some() {
            return;
        }
        for index in 0..self.fields.len() {
            let (before, rest) = self.fields.split_at_mut(index);
            // `rest` is non-empty: `index` is within the field count.
            if let Some((field, after)) = rest.split_first_mut() {
                let peers = Peers { before, after };
                field.run_chain(&peers);
            }
        }
        let valid = self.fields.iter().all(|field| field.errors().is_empty());
        tracing::trace!(
            schema = std::any::type_name::<S>(),
            valid,
            "schema instance validated"
        );
        self.valid = Some(valid);
    }
}
