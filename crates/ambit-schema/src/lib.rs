//! Ambit Schema - declarative shapes for capability inputs and outputs.
//!
//! One declaration serves two purposes: the Rust type a capability works
//! with, and the runtime check applied to untyped JSON crossing a plugin
//! boundary.
//!
//! - [`Schema`]: a JSON Schema document, usually derived with [`Schema::of`]
//! - [`ValidationError`]: every field-level failure, each with a [`FieldPath`]
//! - [`validate_as`]: one-shot validate-and-deserialize
//!
//! # Example
//!
//! ```
//! use ambit_schema::Schema;
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize, JsonSchema)]
//! #[serde(rename_all = "camelCase")]
//! struct Greeting {
//!     name: String,
//!     #[serde(default)]
//!     shout: bool,
//! }
//!
//! let schema = Schema::of::<Greeting>();
//! let normalized = schema.validate(&json!({"name": "Ada"})).unwrap();
//! assert_eq!(normalized["shout"], json!(false));
//!
//! let err = schema.validate(&json!({})).unwrap_err();
//! assert!(err.mentions("name"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod schema;

pub use error::{FieldPath, IssueKind, PathSegment, ValidationError, ValidationIssue, ValidationResult};
pub use schema::{Schema, validate_as};

/// Re-exported so capability crates derive schemas against the same version.
pub use schemars;
