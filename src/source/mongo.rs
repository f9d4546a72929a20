//! MongoDB-backed order source
//!
//! Orders live in a single collection, one document per order:
//!
//! ```text
//! {
//!   _id: 1042,                         // Int32 or Int64
//!   status: "completed",               // plain or "wc-" prefixed
//!   date_created: ISODate(...),
//!   line_items: [ { name: "Mug", quantity: 2 } ],
//!   refunds: [ { amount: "12.50" } ],
//!   coupon_codes: [ "spring" ],
//!   billing: { country: "US", state: "CA" },
//!   subtotal: "90.00",
//!   discount_total: "5.00",
//!   total_tax: "8.00",
//!   total: "100.00"
//! }
//! ```
//!
//! Money fields may be strings, numbers or Decimal128; they are converted to
//! exact decimals. Missing money fields count as zero.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::{ExportError, Result};
use crate::filter::DateRange;
use crate::order::{LineItem, Order, OrderStatus, Refund};

use super::{OrderSource, PageRequest};

/// Order source reading from a MongoDB collection
pub struct MongoOrderSource {
    collection: Collection<Document>,
}

impl MongoOrderSource {
    /// Create a source over an existing collection handle
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Build a client from configuration and open the orders collection
    ///
    /// The driver connects lazily, so an unreachable server surfaces as
    /// `SourceUnavailable` on the first page fetch.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| ExportError::SourceUnavailable(format!("invalid URI: {e}")))?;
        let timeout = config.connection_timeout();
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("order-export".to_string());

        let client = Client::with_options(options)?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        info!(
            "Using order collection '{}.{}'",
            config.database, config.collection
        );
        Ok(Self::new(collection))
    }
}

#[async_trait]
impl OrderSource for MongoOrderSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Order>> {
        let filter = build_filter(request);
        debug!("Fetching page {} with filter: {:?}", request.page, filter);

        let cursor = self
            .collection
            .find(filter)
            .with_options(find_options(request))
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        docs.iter().map(decode_order).collect()
    }
}

/// Query filter for a page: status membership plus the optional date window.
pub(crate) fn build_filter(request: &PageRequest) -> Document {
    let statuses: Vec<Bson> = request
        .statuses
        .iter()
        .flat_map(OrderStatus::stored_names)
        .map(Bson::String)
        .collect();
    let mut filter = doc! { "status": { "$in": statuses } };

    if let Some(range) = request.date_range {
        filter.insert("date_created", date_window(range));
    }
    filter
}

/// `[start 00:00, end + 1 day 00:00)` in UTC.
fn date_window(range: DateRange) -> Document {
    let mut window = doc! { "$gte": start_of_day(range.start) };
    if let Some(next) = range.end.succ_opt() {
        window.insert("$lt", start_of_day(next));
    }
    window
}

fn start_of_day(date: NaiveDate) -> mongodb::bson::DateTime {
    let instant = date.and_time(NaiveTime::MIN).and_utc();
    mongodb::bson::DateTime::from_millis(instant.timestamp_millis())
}

pub(crate) fn find_options(request: &PageRequest) -> FindOptions {
    let mut options = FindOptions::default();
    options.sort = Some(doc! { "date_created": 1, "_id": 1 });
    options.skip = Some(request.offset());
    options.limit = Some(i64::from(request.page_size));
    options
}

/// Convert one stored document into an [`Order`].
pub(crate) fn decode_order(doc: &Document) -> Result<Order> {
    let id = match doc.get("_id") {
        Some(Bson::Int64(v)) if *v >= 0 => *v as u64,
        Some(Bson::Int32(v)) if *v >= 0 => *v as u64,
        other => return Err(malformed("?", "_id", other)),
    };
    let field_err = |field: &str, value: Option<&Bson>| malformed(&id.to_string(), field, value);

    let status = doc
        .get_str("status")
        .ok()
        .and_then(|s| s.parse::<OrderStatus>().ok())
        .ok_or_else(|| field_err("status", doc.get("status")))?;

    let created = doc
        .get_datetime("date_created")
        .ok()
        .and_then(|dt| DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()))
        .ok_or_else(|| field_err("date_created", doc.get("date_created")))?;

    let mut line_items = Vec::new();
    for item in documents(doc, "line_items") {
        let quantity = integer(item.get("quantity"))
            .ok_or_else(|| field_err("line_items.quantity", item.get("quantity")))?;
        line_items.push(LineItem {
            name: item.get_str("name").unwrap_or_default().to_string(),
            quantity,
        });
    }

    let mut refunds = Vec::new();
    for refund in documents(doc, "refunds") {
        let amount = money(refund.get("amount"))
            .ok_or_else(|| field_err("refunds.amount", refund.get("amount")))?;
        refunds.push(Refund { amount: amount.abs() });
    }

    let coupon_codes = match doc.get_array("coupon_codes") {
        Ok(codes) => codes
            .iter()
            .filter_map(|c| c.as_str().map(str::to_string))
            .collect(),
        Err(_) => Vec::new(),
    };

    let billing = doc.get_document("billing").ok();
    let billing_field = |key: &str| {
        billing
            .and_then(|b| b.get_str(key).ok())
            .unwrap_or_default()
            .to_string()
    };

    let amount = |key: &str| money(doc.get(key)).ok_or_else(|| field_err(key, doc.get(key)));

    Ok(Order {
        id,
        created,
        status,
        line_items,
        refunds,
        coupon_codes,
        billing_country: billing_field("country"),
        billing_region: billing_field("state"),
        subtotal: amount("subtotal")?,
        discount_total: amount("discount_total")?,
        tax_total: amount("total_tax")?,
        total: amount("total")?,
    })
}

fn documents<'a>(doc: &'a Document, key: &str) -> impl Iterator<Item = &'a Document> {
    doc.get_array(key)
        .map(|items| items.iter().filter_map(Bson::as_document).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
}

fn integer(value: Option<&Bson>) -> Option<i64> {
    match value? {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Exact decimal from a stored money value. Missing, null and empty values
/// are zero.
pub(crate) fn money(value: Option<&Bson>) -> Option<Decimal> {
    match value {
        None | Some(Bson::Null) => Some(Decimal::ZERO),
        Some(Bson::String(s)) if s.trim().is_empty() => Some(Decimal::ZERO),
        Some(Bson::String(s)) => parse_decimal(s.trim()),
        Some(Bson::Int32(v)) => Some(Decimal::from(*v)),
        Some(Bson::Int64(v)) => Some(Decimal::from(*v)),
        // shortest round-trip text, so 19.99 stays 19.99
        Some(Bson::Double(v)) if v.is_finite() => parse_decimal(&v.to_string()),
        Some(Bson::Decimal128(d)) => parse_decimal(&d.to_string()),
        Some(_) => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn malformed(order_id: &str, field: &str, value: Option<&Bson>) -> ExportError {
    ExportError::SourceUnavailable(format!(
        "order {order_id} has an unreadable '{field}' field: {value:?}"
    ))
}
