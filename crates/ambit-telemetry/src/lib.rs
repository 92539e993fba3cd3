//! Ambit Telemetry - logging setup.
//!
//! Configures a `tracing-subscriber` registry from a [`LogConfig`]: an
//! `EnvFilter` built from a level plus per-crate directives, one of four
//! output formats, and stdout, stderr or a rolling file as the target.
//!
//! With the `config` feature, a [`LogConfig`] can be built from the
//! `[logging]` section of `ambit-config`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ambit_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), ambit_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("ambit_plugins=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!(plugins = 4, "Registered bundled plugins");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
