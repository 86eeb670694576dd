//! Schema Invariant Tests
//!
//! End-to-end properties of the declarative engine:
//! - Validation is lazy, memoized, and deterministic per instance
//! - Chains short-circuit at the first failure without losing progress
//! - One field's failure never blocks other fields (partial failure)
//! - Binding from a struct behaves like binding from a mapping

use std::sync::atomic::{AtomicUsize, Ordering};

use formvet::validator::{IsIn, NotBlank, NotEmpty, Required};
use formvet::{Failure, Field, Outcome, Peers, Schema, SchemaDef, Stage, Validate};
use serde::Serialize;
use serde_json::{json, Value};

// =============================================================================
// Helper Validators
// =============================================================================

/// Always passes; bumps its counter every time its value stage runs.
/// Each test owns a distinct counter so parallel tests cannot interfere.
#[derive(Debug)]
struct Counted(&'static AtomicUsize);

impl Validate for Counted {
    fn default_template(&self) -> &'static str {
        "never rendered"
    }

    fn on_value(&self, _value: Option<&Value>, _peers: &Peers<'_>) -> Result<Outcome, Failure> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Outcome::Keep)
    }
}

/// Passes iff the value equals the named sibling's cleaned value.
#[derive(Debug)]
struct Matches(&'static str);

impl Validate for Matches {
    fn default_template(&self) -> &'static str {
        "Value must match {0}."
    }

    fn params(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }

    fn on_value(&self, value: Option<&Value>, peers: &Peers<'_>) -> Result<Outcome, Failure> {
        if value == peers.cleaned(self.0) {
            Ok(Outcome::Keep)
        } else {
            Err(self.fail(Stage::Value))
        }
    }
}

// =============================================================================
// Memoization
// =============================================================================

static MEMO_RUNS: AtomicUsize = AtomicUsize::new(0);

struct CountingSchema;

impl SchemaDef for CountingSchema {
    fn fields() -> Vec<(&'static str, Field)> {
        vec![("foo", Field::new().check(Counted(&MEMO_RUNS)))]
    }
}

/// A second `is_valid()` call returns the same result and re-runs nothing.
#[test]
fn test_is_valid_is_memoized() {
    let mut schema = CountingSchema::schema(&json!({"foo": 1}));

    assert!(schema.is_valid());
    assert_eq!(MEMO_RUNS.load(Ordering::SeqCst), 1);

    assert!(schema.is_valid());
    let _ = schema.errors();
    assert_eq!(MEMO_RUNS.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Short-Circuit
// =============================================================================

static SHORT_CIRCUIT_RUNS: AtomicUsize = AtomicUsize::new(0);

struct ShortCircuit;

impl SchemaDef for ShortCircuit {
    fn fields() -> Vec<(&'static str, Field)> {
        // Required fails on the sentinel; the counting validator after it
        // must never run.
        vec![(
            "foo",
            Field::new()
                .check(Required::new())
                .check(Counted(&SHORT_CIRCUIT_RUNS)),
        )]
    }
}

/// A validator after a failing one never executes, and only the failing
/// validator's message is recorded.
#[test]
fn test_chain_short_circuits_on_first_failure() {
    let mut schema = ShortCircuit::schema(&json!({}));

    assert!(!schema.is_valid());
    assert_eq!(SHORT_CIRCUIT_RUNS.load(Ordering::SeqCst), 0);
    assert_eq!(schema.errors()["foo"], ["Value is required."]);
}

// =============================================================================
// Partial Failure and Error Aggregation
// =============================================================================

struct Pair;

impl SchemaDef for Pair {
    fn fields() -> Vec<(&'static str, Field)> {
        vec![
            ("foo", Field::new().label("Foo").check(Required::new())),
            ("bar", Field::new().label("Bar").check(IsIn::new([1, 2]))),
        ]
    }
}

/// Both fields validate even when the first fails; failing fields appear
/// in the error map with their own messages.
#[test]
fn test_one_failure_does_not_block_other_fields() {
    let mut schema = Pair::schema(&json!({"bar": 3}));
    assert!(!schema.is_valid());

    let errors = schema.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors["foo"], ["Value is required."]);
    assert_eq!(errors["bar"], ["Value not in presets: (1, 2)."]);
}

/// Valid fields are omitted from the error map entirely.
#[test]
fn test_valid_fields_are_omitted_from_errors() {
    let mut schema = Pair::schema(&json!({"bar": 3, "foo": 1}));
    assert!(!schema.is_valid());

    let errors = schema.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("bar"));
    assert!(!errors.contains_key("foo"));
}

/// An explicitly supplied falsy value is present, not missing.
#[test]
fn test_required_accepts_explicit_zero() {
    let mut schema = Pair::schema(&json!({"foo": 0, "bar": 2}));
    assert!(schema.is_valid());
    assert_eq!(schema.cleaned("foo"), Some(&json!(0)));
}

// =============================================================================
// Input Binding
// =============================================================================

/// Binding from a serializable struct behaves like binding from a mapping.
#[test]
fn test_struct_binding_matches_mapping_binding() {
    #[derive(Serialize)]
    struct Data {
        foo: i32,
        bar: i32,
    }

    let mut from_struct = Schema::<Pair>::from_record(&Data { foo: 1, bar: 2 }).unwrap();
    let mut from_map = Pair::schema(&json!({"foo": 1, "bar": 2}));

    assert!(from_struct.is_valid());
    assert!(from_map.is_valid());
    assert_eq!(from_struct.cleaned("bar"), from_map.cleaned("bar"));
}

/// A record that does not serialize to an object is a boundary error, not
/// a panic.
#[test]
fn test_non_object_record_is_rejected() {
    assert!(Schema::<Pair>::from_record(&"just a string").is_err());
}

// =============================================================================
// Cross-Field Reads
// =============================================================================

struct Passwords;

impl SchemaDef for Passwords {
    fn fields() -> Vec<(&'static str, Field)> {
        vec![
            ("password", Field::new().check(NotEmpty::new())),
            ("confirm", Field::new().check(Matches("password"))),
        ]
    }
}

/// A validator can read a sibling field's cleaned value during its run.
#[test]
fn test_validator_reads_sibling_cleaned_value() {
    let mut matching = Passwords::schema(&json!({"password": "s3cret", "confirm": "s3cret"}));
    assert!(matching.is_valid());

    let mut differing = Passwords::schema(&json!({"password": "s3cret", "confirm": "other"}));
    assert!(!differing.is_valid());
    assert_eq!(differing.errors()["confirm"], ["Value must match password."]);
}

// =============================================================================
// Templates
// =============================================================================

struct Templated;

impl SchemaDef for Templated {
    fn fields() -> Vec<(&'static str, Field)> {
        vec![
            (
                "custom",
                Field::new().check(Required::new().template("Is required.")),
            ),
            ("stock", Field::new().check(Required::new())),
        ]
    }
}

/// An override template is used verbatim; other instances keep the default.
#[test]
fn test_override_template_is_used_verbatim() {
    let mut schema = Templated::schema(&json!({}));
    assert!(!schema.is_valid());

    let errors = schema.errors();
    assert_eq!(errors["custom"], ["Is required."]);
    assert_eq!(errors["stock"], ["Value is required."]);
}

// =============================================================================
// NotEmpty Composite
// =============================================================================

struct Strict;

impl SchemaDef for Strict {
    fn fields() -> Vec<(&'static str, Field)> {
        vec![("foo", Field::new().check(NotEmpty::new()))]
    }
}

/// The composite rejects the sentinel with the presence message and a
/// whitespace-only value with the blank message.
#[test]
fn test_not_empty_composite_stages() {
    let mut missing = Strict::schema(&json!({}));
    assert!(!missing.is_valid());
    assert_eq!(missing.errors()["foo"], ["Value is required."]);

    let mut blank = Strict::schema(&json!({"foo": " "}));
    assert!(!blank.is_valid());
    assert_eq!(blank.errors()["foo"], ["Value couldn't be blank."]);

    let mut present = Strict::schema(&json!({"foo": "x"}));
    assert!(present.is_valid());
}

// =============================================================================
// Cleaned-Value Rewrites
// =============================================================================

struct Trimmed;

impl SchemaDef for Trimmed {
    fn fields() -> Vec<(&'static str, Field)> {
        vec![(
            "name",
            Field::new().check(NotBlank::new()).check(IsIn::new(["ada"])),
        )]
    }
}

/// A successful validator's rewrite is visible to the next validator in
/// the chain and in the final cleaned value.
#[test]
fn test_rewrite_feeds_the_next_validator() {
    let mut schema = Trimmed::schema(&json!({"name": "  ada  "}));
    assert!(schema.is_valid());
    assert_eq!(schema.cleaned("name"), Some(&json!("ada")));
}
