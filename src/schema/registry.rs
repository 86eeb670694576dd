//! Per-type field set cache
//!
//! The declared field set of a schema type is materialized on the first
//! construction of any instance of that type and cached by `TypeId`. The
//! build step happens at most once per type even under concurrent first
//! use; entries are immutable afterward, so steady-state reads take only
//! the read lock and no per-validation locking exists.
//!
//! Declarations are static Rust code, so the cache never needs
//! invalidation: a schema type's `fields()` cannot change at runtime.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::field::Field;
use crate::schema::SchemaDef;

/// Ordered, immutable set of (name, declaration) pairs for one schema type.
#[derive(Debug)]
pub(crate) struct FieldSet {
    fields: Vec<(&'static str, Field)>,
}

impl FieldSet {
    pub(crate) fn iter(&self) -> impl Iterator<Item = &(&'static str, Field)> {
        self.fields.iter()
    }
}

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<FieldSet>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the cached field set for `S`, building it on first use.
///
/// # Panics
///
/// Panics if `S::fields()` declares no fields or repeats a name; both are
/// schema-declaration defects.
pub(crate) fn field_set<S: SchemaDef>() -> Arc<FieldSet> {
    let key = TypeId::of::<S>();

    // A panic while building another type's set poisons the lock; the map
    // itself stays consistent because insertion follows a successful build.
    if let Some(set) = CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(set);
    }

    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    let set = cache
        .entry(key)
        .or_insert_with(|| Arc::new(build::<S>()));
    Arc::clone(set)
}

fn build<S: SchemaDef>() -> FieldSet {
    let fields = S::fields();
    assert!(
        !fields.is_empty(),
        "schema type `{}` must declare at least one field",
        type_name::<S>()
    );
    for (index, (name, _)) in fields.iter().enumerate() {
        assert!(
            !fields[..index].iter().any(|(seen, _)| seen == name),
            "schema type `{}` declares field `{}` twice",
            type_name::<S>(),
            name
        );
    }
    tracing::debug!(
        schema = type_name::<S>(),
        fields = fields.len(),
        "field set built"
    );
    FieldSet { fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Required;

    struct Login;

    impl SchemaDef for Login {
        fn fields() -> Vec<(&'static str, Field)> {
            vec![
                ("user", Field::new().check(Required::new())),
                ("password", Field::new().check(Required::new())),
            ]
        }
    }

    struct Fieldless;

    impl SchemaDef for Fieldless {
        fn fields() -> Vec<(&'static str, Field)> {
            Vec::new()
        }
    }

    struct Duplicated;

    impl SchemaDef for Duplicated {
        fn fields() -> Vec<(&'static str, Field)> {
            vec![("user", Field::new()), ("user", Field::new())]
        }
    }

    #[test]
    fn test_field_set_is_built_once_and_shared() {
        let first = field_set::<Login>();
        let second = field_set::<Login>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.iter().count(), 2);
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let set = field_set::<Login>();
        let names: Vec<_> = set.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["user", "password"]);
    }

    #[test]
    #[should_panic(expected = "must declare at least one field")]
    fn test_zero_fields_is_a_defect() {
        let _ = field_set::<Fieldless>();
    }

    #[test]
    #[should_panic(expected = "declares field `user` twice")]
    fn test_duplicate_field_name_is_a_defect() {
        let _ = field_set::<Duplicated>();
    }
}
