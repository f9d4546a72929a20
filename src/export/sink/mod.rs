//! Row sinks for export operations
//!
//! A sink accepts the header and then one row at a time. Sinks never see
//! the whole report; flushing and closing is left to whoever created the
//! sink, after the pipeline returns.

use async_trait::async_trait;

use crate::error::Result;

pub mod csv;

pub use self::csv::CsvSink;

/// Trait for incremental report output
#[async_trait]
pub trait RowSink: Send {
    /// Write the column header row
    ///
    /// # Returns
    /// * `Result<()>` - `SinkWriteFailure` if the destination rejects it
    async fn write_header(&mut self, columns: &[&str]) -> Result<()>;

    /// Write one data row
    ///
    /// # Returns
    /// * `Result<()>` - `SinkWriteFailure` if the destination rejects it
    async fn write_row(&mut self, values: &[String]) -> Result<()>;
}
