//! Commonly used types for convenient import.
//!
//! ```rust,no_run
//! use ambit_telemetry::prelude::*;
//!
//! # fn main() -> TelemetryResult<()> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("ambit_plugins=trace");
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

pub use crate::{
    FileRotation, LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult,
    setup_default_logging, setup_logging,
};
