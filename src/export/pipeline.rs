//! Export pipeline for order summary reports
//!
//! Walks an order source page by page, keeps the orders that pass the
//! in-process filters, derives the report figures and writes one row per
//! order to the sink. Only one page of orders is alive at a time.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::filter::FilterSpec;
use crate::order::OrderStatus;
use crate::source::{OrderSource, PageRequest};

use super::progress::ProgressTracker;
use super::row::{COLUMNS, ExportRow};
use super::sink::RowSink;

/// Orders requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Pages fetched before an export is considered runaway.
pub const DEFAULT_MAX_PAGES: u32 = 100_000;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of data rows written
    pub rows_written: u64,
    /// Whether any order matched the filter
    pub any_match: bool,
    /// Number of pages requested from the source
    pub pages_fetched: u32,
    /// Number of orders inspected, matching or not
    pub orders_scanned: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
    /// Whether the export was cancelled
    pub cancelled: bool,
}

/// Drives a single export from source to sink
pub struct ExportPipeline {
    page_size: u32,
    max_pages: u32,
    cancel_token: Option<CancellationToken>,
    tracker: ProgressTracker,
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ExportPipeline {
    /// Create a pipeline with the given page size
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            max_pages: DEFAULT_MAX_PAGES,
            cancel_token: None,
            tracker: ProgressTracker::hidden(),
        }
    }

    /// Create a pipeline from the `[export]` configuration section
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.page_size).with_max_pages(config.max_pages)
    }

    /// Set the safety limit on fetched pages
    ///
    /// A source holding exactly `max_pages` full pages still completes: one
    /// extra fetch is allowed to confirm it is exhausted.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Set cancellation token, checked before every page fetch
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Report progress through the given tracker
    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Execute the export
    ///
    /// 1. Write the header row
    /// 2. Fetch pages until a short page comes back
    /// 3. Filter each order and write its row
    ///
    /// The sink is neither flushed nor closed here. On error, whatever was
    /// already written stays in the sink and is the caller's to discard.
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or error
    pub async fn export(
        &self,
        spec: &FilterSpec,
        source: &dyn OrderSource,
        sink: &mut dyn RowSink,
    ) -> Result<ExportResult> {
        let start_time = Instant::now();
        info!("Starting order export with filter {:?}", spec);
        if spec.is_unconstrained() {
            info!("No filter constraints, exporting every exportable order");
        }

        sink.write_header(&COLUMNS).await?;

        let mut result = ExportResult {
            rows_written: 0,
            any_match: false,
            pages_fetched: 0,
            orders_scanned: 0,
            elapsed_ms: 0,
            cancelled: false,
        };
        let mut page = 1u32;

        loop {
            if self.cancel_token.as_ref().is_some_and(|t| t.is_cancelled()) {
                warn!("Export cancelled after {} pages", result.pages_fetched);
                result.cancelled = true;
                break;
            }
            let beyond_limit = page > self.max_pages;

            let request = PageRequest {
                page_size: self.page_size,
                page,
                statuses: &OrderStatus::EXPORTABLE,
                date_range: spec.date_range(),
            };
            debug!("Fetching page #{}", page);

            let orders = match source.fetch_page(&request).await {
                Ok(orders) => orders,
                Err(e) => {
                    self.tracker.finish();
                    return Err(e);
                }
            };
            result.pages_fetched += 1;
            let fetched = orders.len();

            if beyond_limit {
                if fetched == 0 {
                    debug!("Page #{} confirmed the source is exhausted", page);
                    break;
                }
                self.tracker.finish();
                return Err(ExportError::PageLimitExceeded(self.max_pages));
            }

            for order in &orders {
                result.orders_scanned += 1;

                if !order.status.is_exportable() {
                    warn!("Skipping order {} with status {}", order.id, order.status);
                    continue;
                }
                if !spec.matches(order) {
                    continue;
                }

                let row = ExportRow::from(order);
                if let Err(e) = sink.write_row(&row.to_record()).await {
                    self.tracker.finish();
                    return Err(e);
                }
                result.rows_written += 1;
                result.any_match = true;
            }

            debug!(
                "Page #{} returned {} orders ({} rows so far)",
                page, fetched, result.rows_written
            );
            self.tracker.update(result.rows_written, result.pages_fetched);

            if fetched != self.page_size as usize {
                break;
            }
            page += 1;
        }

        self.tracker.finish();
        result.elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Export finished: {} rows from {} orders in {} pages, {} ms",
            result.rows_written, result.orders_scanned, result.pages_fetched, result.elapsed_ms
        );
        Ok(result)
    }
}

/// Run an export with default settings
pub async fn export(
    spec: &FilterSpec,
    source: &dyn OrderSource,
    sink: &mut dyn RowSink,
) -> Result<ExportResult> {
    ExportPipeline::default().export(spec, source, sink).await
}
