//! In-memory order source

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::order::Order;

use super::{OrderSource, PageRequest};

/// Order source backed by a vector of orders
///
/// Orders are kept sorted by creation time, then id, which gives stable
/// pagination. Status and date filters are applied the way a database
/// would apply them before paging.
pub struct InMemoryOrderSource {
    orders: Vec<Order>,
    fetches: AtomicU32,
}

impl InMemoryOrderSource {
    pub fn new(mut orders: Vec<Order>) -> Self {
        orders.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Self {
            orders,
            fetches: AtomicU32::new(0),
        }
    }

    /// Number of `fetch_page` calls served so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OrderSource for InMemoryOrderSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Order>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let page: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| request.statuses.contains(&order.status))
            .filter(|order| {
                request
                    .date_range
                    .is_none_or(|range| range.contains(order.created_date()))
            })
            .skip(offset)
            .take(request.page_size as usize)
            .cloned()
            .collect();

        debug!(
            "In-memory source served page {} with {} orders",
            request.page,
            page.len()
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DateRange;
    use crate::order::OrderStatus;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn order(id: u64, day: u32, status: OrderStatus) -> Order {
        Order {
            id,
            created: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            status,
            line_items: Vec::new(),
            refunds: Vec::new(),
            coupon_codes: Vec::new(),
            billing_country: "US".into(),
            billing_region: String::new(),
            subtotal: Decimal::ZERO,
            discount_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    fn request(page: u32, page_size: u32) -> PageRequest {
        PageRequest {
            page_size,
            page,
            statuses: &OrderStatus::EXPORTABLE,
            date_range: None,
        }
    }

    #[tokio::test]
    async fn test_pages_are_disjoint_and_ordered() {
        let source = InMemoryOrderSource::new(vec![
            order(3, 3, OrderStatus::Completed),
            order(1, 1, OrderStatus::Completed),
            order(2, 2, OrderStatus::Processing),
        ]);

        let first = source.fetch_page(&request(1, 2)).await.unwrap();
        let second = source.fetch_page(&request(2, 2)).await.unwrap();
        let ids: Vec<u64> = first.iter().chain(second.iter()).map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_status_filter_applies_before_paging() {
        let source = InMemoryOrderSource::new(vec![
            order(1, 1, OrderStatus::Cancelled),
            order(2, 2, OrderStatus::Completed),
            order(3, 3, OrderStatus::Pending),
        ]);
        let page = source.fetch_page(&request(1, 10)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let source = InMemoryOrderSource::new(vec![
            order(1, 5, OrderStatus::Completed),
            order(2, 10, OrderStatus::Completed),
            order(3, 15, OrderStatus::Completed),
        ]);
        let mut req = request(1, 10);
        req.date_range = Some(DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        });
        let ids: Vec<u64> = source
            .fetch_page(&req)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
