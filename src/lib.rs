//! formvet - a strict, declarative data-validation engine
//!
//! A schema type declares named fields, each with an ordered chain of
//! validators. Binding one input record (a JSON object, a std map, or any
//! serializable struct) to the schema yields per-field validity, lazily
//! computed cleaned values, and aggregated human-readable error messages.
//!
//! ```
//! use formvet::{Field, SchemaDef};
//! use formvet::validator::{IsIn, NotEmpty};
//! use serde_json::json;
//!
//! struct Signup;
//!
//! impl SchemaDef for Signup {
//!     fn fields() -> Vec<(&'static str, Field)> {
//!         vec![
//!             ("name", Field::new().label("Name").check(NotEmpty::new())),
//!             ("role", Field::new().label("Role").check(IsIn::new(["user", "admin"]))),
//!         ]
//!     }
//! }
//!
//! let mut schema = Signup::schema(&json!({"name": "Ada", "role": "user"}));
//! assert!(schema.is_valid());
//!
//! let mut schema = Signup::schema(&json!({"role": "nobody"}));
//! assert!(!schema.is_valid());
//! assert_eq!(schema.errors()["name"], ["Value is required."]);
//! ```

pub mod field;
pub mod schema;
pub mod source;
pub mod validator;

pub use field::{Field, FieldState};
pub use schema::{Peers, Schema, SchemaDef};
pub use source::{record_source, SourceError, ValueSource};
pub use validator::{Failure, Outcome, Stage, Validate};
