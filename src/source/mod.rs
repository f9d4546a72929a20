//! Order sources for export operations
//!
//! An [`OrderSource`] is a paginated read capability over the order store.
//! The export pipeline asks for one page at a time and never holds more than
//! one page of orders.
//!
//! Two implementations are provided:
//! - [`MongoOrderSource`]: orders stored as documents in a MongoDB collection
//! - [`InMemoryOrderSource`]: a fixed set of orders, used for tests and
//!   small offline exports

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::DateRange;
use crate::order::{Order, OrderStatus};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryOrderSource;
pub use mongo::MongoOrderSource;

/// One page request sent to an order source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of orders in the page
    pub page_size: u32,
    /// 1-based page number
    pub page: u32,
    /// Only orders in one of these statuses are returned
    pub statuses: &'static [OrderStatus],
    /// Inclusive creation-date window pushed down to the store
    pub date_range: Option<DateRange>,
}

impl PageRequest {
    /// Number of orders preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Trait for reading orders page by page
///
/// Implementations must return orders in a deterministic order so that
/// consecutive pages neither repeat nor skip orders under a stable snapshot.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch one page of orders
    ///
    /// # Returns
    /// * `Result<Vec<Order>>` - At most `page_size` orders; fewer means the
    ///   source is exhausted
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Order>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        let mut request = PageRequest {
            page_size: 100,
            page: 1,
            statuses: &OrderStatus::EXPORTABLE,
            date_range: None,
        };
        assert_eq!(request.offset(), 0);
        request.page = 3;
        assert_eq!(request.offset(), 200);
    }

    #[test]
    fn test_order_source_trait_object() {
        fn _accepts_order_source(_source: &dyn OrderSource) {}
    }
}
