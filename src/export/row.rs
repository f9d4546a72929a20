//! Fixed output schema of the order summary report

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::order::Order;

/// Report columns, in output order.
pub const COLUMNS: [&str; 9] = [
    "Order ID",
    "Date",
    "Order Quantity",
    "Gross Revenue",
    "Refund Total",
    "Discounts",
    "Net Revenue",
    "Tax Collected",
    "Coupon Code",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One report line derived from a matching order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub order_id: u64,
    pub date: NaiveDate,
    pub quantity: i64,
    /// Order subtotal, before tax and shipping.
    pub gross_revenue: Decimal,
    pub refund_total: Decimal,
    pub discounts: Decimal,
    /// Grand total minus refunds minus discounts.
    pub net_revenue: Decimal,
    pub tax_collected: Decimal,
    pub coupon_codes: String,
}

impl From<&Order> for ExportRow {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            date: order.created_date(),
            quantity: order.item_quantity(),
            gross_revenue: order.subtotal,
            refund_total: order.refund_total(),
            discounts: order.discount_total,
            net_revenue: order.net_revenue(),
            tax_collected: order.tax_total,
            coupon_codes: order.coupon_codes.join(", "),
        }
    }
}

impl ExportRow {
    /// Render the row as text fields matching [`COLUMNS`].
    pub fn to_record(&self) -> [String; 9] {
        [
            self.order_id.to_string(),
            self.date.format(DATE_FORMAT).to_string(),
            self.quantity.to_string(),
            self.gross_revenue.to_string(),
            self.refund_total.to_string(),
            self.discounts.to_string(),
            self.net_revenue.to_string(),
            self.tax_collected.to_string(),
            self.coupon_codes.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{LineItem, OrderStatus, Refund};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_from_order() {
        let order = Order {
            id: 501,
            created: Utc.with_ymd_and_hms(2024, 1, 5, 16, 45, 10).unwrap(),
            status: OrderStatus::Processing,
            line_items: vec![LineItem { name: "Mug".into(), quantity: 4 }],
            refunds: vec![Refund { amount: dec!(20) }],
            coupon_codes: vec!["spring".into(), "vip".into()],
            billing_country: "US".into(),
            billing_region: "CA".into(),
            subtotal: dec!(85.00),
            discount_total: dec!(5.00),
            tax_total: dec!(7.25),
            total: dec!(100.00),
        };

        let row = ExportRow::from(&order);
        assert_eq!(row.net_revenue, dec!(75.00));
        assert_eq!(
            row.to_record(),
            [
                "501",
                "2024-01-05",
                "4",
                "85.00",
                "20",
                "5.00",
                "75.00",
                "7.25",
                "spring, vip",
            ]
            .map(String::from)
        );
    }

    #[test]
    fn test_schema_has_nine_columns() {
        assert_eq!(COLUMNS.len(), 9);
        assert_eq!(COLUMNS[0], "Order ID");
        assert_eq!(COLUMNS[8], "Coupon Code");
    }
}
