//! Prelude module - commonly used test helpers for convenient import.
//!
//! Use `use ambit_test::prelude::*;` to import all of them.

pub use crate::fixtures::*;
pub use crate::harness::*;
pub use crate::mock_model::*;
pub use crate::mocks::*;
