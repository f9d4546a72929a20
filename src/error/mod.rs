//! Error handling for order exports.
//!
//! The taxonomy mirrors the three ways an export can end early:
//! - `InvalidFilter`: bad user input, caught while building the filter
//! - `SourceUnavailable`: the order store could not be queried
//! - `SinkWriteFailure`: the output destination rejected a write
//!
//! Configuration and boundary I/O errors share the same top-level type so
//! the binary has a single error to report.

pub mod kinds;

pub use kinds::{ConfigError, ExportError, FilterError, Result};
