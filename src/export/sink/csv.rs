//! CSV sink for export operations
//!
//! Each record is encoded with the `csv` crate into a small reusable buffer
//! and then appended to a buffered async writer, so quoting follows RFC 4180
//! while only one row is held in memory at a time.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{ExportError, Result};

use super::RowSink;

/// Writer for CSV output over any async byte stream (file, stdout, buffer)
pub struct CsvSink<W: AsyncWrite + Unpin + Send> {
    /// Buffered destination
    writer: BufWriter<W>,
    /// Encoded bytes of the record being written
    line: Vec<u8>,
    /// Whether the header row has been written
    header_written: bool,
    /// Number of data rows written
    rows: u64,
}

impl<W: AsyncWrite + Unpin + Send> CsvSink<W> {
    /// Create a new CSV sink
    ///
    /// # Arguments
    /// * `inner` - Destination stream
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(64 * 1024, inner),
            line: Vec::with_capacity(256),
            header_written: false,
            rows: 0,
        }
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flush buffered output and hand back the destination
    ///
    /// # Returns
    /// * `Result<W>` - The inner writer or `SinkWriteFailure`
    pub async fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .await
            .map_err(|e| ExportError::SinkWriteFailure(format!("Failed to flush output: {e}")))?;
        debug!("Finished CSV output ({} rows)", self.rows);
        Ok(self.writer.into_inner())
    }

    async fn write_record<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.line.clear();
        {
            let mut encoder = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut self.line);
            encoder.write_record(fields)?;
            encoder
                .flush()
                .map_err(|e| ExportError::SinkWriteFailure(format!("Failed to encode row: {e}")))?;
        }

        self.writer
            .write_all(&self.line)
            .await
            .map_err(|e| ExportError::SinkWriteFailure(format!("Failed to write row: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RowSink for CsvSink<W> {
    async fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        if self.header_written {
            return Err(ExportError::SinkWriteFailure(
                "header already written".to_string(),
            ));
        }
        self.write_record(columns.iter()).await?;
        self.header_written = true;
        debug!("Wrote CSV header: {} columns", columns.len());
        Ok(())
    }

    async fn write_row(&mut self, values: &[String]) -> Result<()> {
        self.write_record(values.iter()).await?;
        self.rows += 1;
        Ok(())
    }
}
