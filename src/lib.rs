//! Order summary export library
//!
//! Streams a filtered subset of e-commerce orders to a CSV report without
//! holding the result set in memory. Orders are read page by page from an
//! order store, filtered by date range, billing country/region and coupon
//! code, and written one row per order.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Export pipeline, row schema and sinks
//! - `filter`: Validated filter specification
//! - `order`: Order entity
//! - `source`: Order sources (MongoDB, in-memory)
//!
//! # Example
//!
//! ```no_run
//! use order_export::config::Config;
//! use order_export::export::{CsvSink, ExportPipeline};
//! use order_export::filter::{FilterSpec, RawFilter};
//! use order_export::source::MongoOrderSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let spec = FilterSpec::parse(&RawFilter {
//!         start_date: Some("2024-01-01".into()),
//!         end_date: Some("2024-01-31".into()),
//!         ..Default::default()
//!     })?;
//!
//!     let source = MongoOrderSource::connect(&config.source).await?;
//!     let file = tokio::fs::File::create("january.csv").await?;
//!     let mut sink = CsvSink::new(file);
//!
//!     let result = ExportPipeline::from_config(&config.export)
//!         .export(&spec, &source, &mut sink)
//!         .await?;
//!     sink.finish().await?;
//!
//!     println!("Exported {} orders", result.rows_written);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod order;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{CsvSink, ExportPipeline, ExportResult, RowSink};
pub use filter::{FilterSpec, RawFilter};
pub use order::Order;
pub use source::{InMemoryOrderSource, MongoOrderSource, OrderSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
