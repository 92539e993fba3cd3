//! Ambit Test - Shared test utilities for Ambit plugins and hosts.
//!
//! This crate provides mock capabilities and test helpers that can be
//! used across multiple Ambit crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! ambit-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use ambit_plugins::HostRegistry;
//! use ambit_test::prelude::*;
//!
//! #[tokio::test]
//! async fn test_echo() {
//!     let mut registry = HostRegistry::new();
//!     registry.register(MockPlugin::new("echoer").echo_tool("echo").boxed()).unwrap();
//!     let out = registry.call_tool("echo", &serde_json::json!({"text": "hi"})).await.unwrap();
//!     assert!(out.completed().is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mock_model;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mock_model::*;
pub use mocks::*;
