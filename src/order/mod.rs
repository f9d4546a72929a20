//! Order entity as read from the order store.
//!
//! Orders are read-only to the export. Monetary values are exact decimals so
//! derived totals carry no floating point drift.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Prefix some stores put in front of status names.
const STATUS_PREFIX: &str = "wc-";

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// Statuses eligible for export.
    pub const EXPORTABLE: [OrderStatus; 2] = [OrderStatus::Completed, OrderStatus::Processing];

    /// Name used by the order store.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }

    /// Both spellings a store may hold: plain and `wc-` prefixed.
    pub fn stored_names(&self) -> [String; 2] {
        [
            self.as_str().to_string(),
            format!("{STATUS_PREFIX}{}", self.as_str()),
        ]
    }

    pub fn is_exportable(&self) -> bool {
        Self::EXPORTABLE.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    /// Accepts plain names and the `wc-` prefixed form used by some stores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix(STATUS_PREFIX).unwrap_or(s);
        match name {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "on-hold" => Ok(OrderStatus::OnHold),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// A purchased product line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub quantity: i64,
}

/// A refund issued against an order. Amounts are positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Refund {
    pub amount: Decimal,
}

/// An order with the fields the export reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub created: DateTime<Utc>,
    pub status: OrderStatus,
    pub line_items: Vec<LineItem>,
    pub refunds: Vec<Refund>,
    pub coupon_codes: Vec<String>,
    pub billing_country: String,
    pub billing_region: String,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
}

impl Order {
    /// Calendar day the order was created on (UTC).
    pub fn created_date(&self) -> NaiveDate {
        self.created.date_naive()
    }

    /// Sum of line item quantities.
    pub fn item_quantity(&self) -> i64 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of all refund amounts.
    pub fn refund_total(&self) -> Decimal {
        self.refunds.iter().map(|refund| refund.amount).sum()
    }

    /// Grand total minus refunds minus discounts.
    ///
    /// Based on the grand total, which already includes tax and shipping,
    /// while gross revenue in the report is the subtotal. The two figures are
    /// intentionally not on the same base.
    pub fn net_revenue(&self) -> Decimal {
        self.total - self.refund_total() - self.discount_total
    }

    pub fn has_coupon(&self, code: &str) -> bool {
        self.coupon_codes.iter().any(|c| c == code)
    }
}
