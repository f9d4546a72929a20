//! Export module for streaming order summary reports
//!
//! # Architecture
//!
//! The export system is built on three components:
//!
//! 1. **OrderSource** (see [`crate::source`]): paginated reads from the order store
//! 2. **RowSink**: incremental output, with a CSV implementation
//! 3. **ProgressTracker**: optional feedback while a long export runs
//!
//! These are driven by the **ExportPipeline**, which owns the paging loop,
//! applies the filter and derives one [`ExportRow`] per matching order.
//!
//! # Example
//!
//! ```no_run
//! use order_export::export::{CsvSink, ExportPipeline};
//! use order_export::filter::{FilterSpec, RawFilter};
//! use order_export::source::InMemoryOrderSource;
//!
//! # async fn run() -> order_export::Result<()> {
//! let spec = FilterSpec::parse(&RawFilter {
//!     country: Some("US".into()),
//!     ..Default::default()
//! })?;
//! let source = InMemoryOrderSource::new(Vec::new());
//! let mut sink = CsvSink::new(tokio::io::stdout());
//!
//! let result = ExportPipeline::new(100).export(&spec, &source, &mut sink).await?;
//! sink.finish().await?;
//! println!("{} rows", result.rows_written);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod progress;
pub mod row;
pub mod sink;

pub use pipeline::{ExportPipeline, ExportResult, export};
pub use progress::ProgressTracker;
pub use row::{COLUMNS, ExportRow};
pub use sink::{CsvSink, RowSink};
