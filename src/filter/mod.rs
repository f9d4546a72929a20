//! Export filter specification
//!
//! Raw user input (strings from the command line or a form) is validated
//! once into an immutable [`FilterSpec`]. The export pipeline only ever sees
//! the typed form.
//!
//! Every dimension is optional. An absent dimension is unconstrained; an
//! empty or whitespace-only input counts as absent.

use chrono::NaiveDate;

use crate::error::FilterError;
use crate::order::Order;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_REGION_LEN: usize = 16;
const MAX_COUPON_LEN: usize = 64;

/// Unvalidated filter values as supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub coupon_code: Option<String>,
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Validated, immutable export constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    date_range: Option<DateRange>,
    country: Option<String>,
    region: Option<String>,
    coupon_code: Option<String>,
}

impl FilterSpec {
    /// A specification with no constraints.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Validate raw input into a specification.
    ///
    /// Both dates must be given together. Country codes are upper-cased;
    /// region and coupon codes are compared exactly as given (trimmed).
    pub fn parse(raw: &RawFilter) -> Result<Self, FilterError> {
        let start = parse_date("start_date", raw.start_date.as_deref())?;
        let end = parse_date("end_date", raw.end_date.as_deref())?;

        let date_range = match (start, end) {
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(FilterError::InvertedDateRange {
                        start: start.to_string(),
                        end: end.to_string(),
                    });
                }
                Some(DateRange { start, end })
            }
            (Some(_), None) => return Err(FilterError::PartialDateRange { missing: "end_date" }),
            (None, Some(_)) => {
                return Err(FilterError::PartialDateRange { missing: "start_date" });
            }
            (None, None) => None,
        };

        Ok(Self {
            date_range,
            country: parse_country(raw.country.as_deref())?,
            region: parse_region(raw.region.as_deref())?,
            coupon_code: parse_coupon(raw.coupon_code.as_deref())?,
        })
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.date_range.is_none()
            && self.country.is_none()
            && self.region.is_none()
            && self.coupon_code.is_none()
    }

    /// Apply the constraints that are checked per order rather than pushed
    /// down to the order source: country, region and coupon membership.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(country) = self.country() {
            if order.billing_country != country {
                return false;
            }
        }
        if let Some(region) = self.region() {
            if order.billing_region != region {
                return false;
            }
        }
        if let Some(code) = self.coupon_code() {
            if !order.has_coupon(code) {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    // chrono accepts unpadded fields, so pin the shape first
    let well_formed = value.len() == 10
        && value
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(FilterError::MalformedDate {
            field,
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| FilterError::MalformedDate {
            field,
            value: value.to_string(),
        })
}

fn parse_country(value: Option<&str>) -> Result<Option<String>, FilterError> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FilterError::InvalidCountry(value.to_string()));
    }
    Ok(Some(value.to_ascii_uppercase()))
}

fn parse_region(value: Option<&str>) -> Result<Option<String>, FilterError> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    let valid = value.len() <= MAX_REGION_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(FilterError::InvalidRegion(value.to_string()));
    }
    Ok(Some(value.to_string()))
}

fn parse_coupon(value: Option<&str>) -> Result<Option<String>, FilterError> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    let valid = value.chars().count() <= MAX_COUPON_LEN
        && !value.chars().any(|c| c == ',' || c.is_control());
    if !valid {
        return Err(FilterError::InvalidCoupon(value.to_string()));
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn raw() -> RawFilter {
        RawFilter::default()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(country: &str, region: &str, coupons: &[&str]) -> Order {
        Order {
            id: 1,
            created: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            status: OrderStatus::Completed,
            line_items: Vec::new(),
            refunds: Vec::new(),
            coupon_codes: coupons.iter().map(|c| c.to_string()).collect(),
            billing_country: country.to_string(),
            billing_region: region.to_string(),
            subtotal: Decimal::ZERO,
            discount_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    #[test]
    fn test_empty_input_is_unconstrained() {
        let spec = FilterSpec::parse(&RawFilter {
            start_date: Some("".into()),
            end_date: Some("  ".into()),
            country: Some(String::new()),
            region: None,
            coupon_code: Some(" ".into()),
        })
        .unwrap();
        assert!(spec.is_unconstrained());
        assert_eq!(spec, FilterSpec::unconstrained());
    }

    #[test]
    fn test_full_spec() {
        let spec = FilterSpec::parse(&RawFilter {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-12".into()),
            country: Some("us".into()),
            region: Some("CA".into()),
            coupon_code: Some(" spring ".into()),
        })
        .unwrap();
        assert_eq!(
            spec.date_range(),
            Some(DateRange {
                start: date(2024, 1, 1),
                end: date(2024, 1, 12)
            })
        );
        assert_eq!(spec.country(), Some("US"));
        assert_eq!(spec.region(), Some("CA"));
        assert_eq!(spec.coupon_code(), Some("spring"));
    }

    #[test]
    fn test_single_day_range_is_valid() {
        let spec = FilterSpec::parse(&RawFilter {
            start_date: Some("2024-02-29".into()),
            end_date: Some("2024-02-29".into()),
            ..raw()
        })
        .unwrap();
        assert!(spec.date_range().unwrap().contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = FilterSpec::parse(&RawFilter {
            start_date: Some("2024-02-01".into()),
            end_date: Some("2024-01-01".into()),
            ..raw()
        })
        .unwrap_err();
        assert!(matches!(err, FilterError::InvertedDateRange { .. }));
    }

    #[test]
    fn test_rejects_one_sided_range() {
        let err = FilterSpec::parse(&RawFilter {
            start_date: Some("2024-02-01".into()),
            ..raw()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::PartialDateRange { missing: "end_date" });

        let err = FilterSpec::parse(&RawFilter {
            end_date: Some("2024-02-01".into()),
            ..raw()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::PartialDateRange { missing: "start_date" });
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for bad in ["2024-1-05", "05/01/2024", "2024-02-30", "yesterday"] {
            let err = FilterSpec::parse(&RawFilter {
                start_date: Some(bad.into()),
                end_date: Some("2024-12-31".into()),
                ..raw()
            })
            .unwrap_err();
            assert!(
                matches!(err, FilterError::MalformedDate { field: "start_date", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_codes() {
        let err = FilterSpec::parse(&RawFilter {
            country: Some("USA".into()),
            ..raw()
        })
        .unwrap_err();
        assert!(matches!(err, FilterError::InvalidCountry(_)));

        let err = FilterSpec::parse(&RawFilter {
            region: Some("New York".into()),
            ..raw()
        })
        .unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegion(_)));

        let err = FilterSpec::parse(&RawFilter {
            coupon_code: Some("a,b".into()),
            ..raw()
        })
        .unwrap_err();
        assert!(matches!(err, FilterError::InvalidCoupon(_)));
    }

    #[test]
    fn test_matches_each_dimension_independently() {
        let spec = FilterSpec::parse(&RawFilter {
            country: Some("US".into()),
            coupon_code: Some("spring".into()),
            ..raw()
        })
        .unwrap();

        assert!(spec.matches(&order("US", "NY", &["spring", "vip"])));
        assert!(!spec.matches(&order("US", "NY", &["vip"])));
        assert!(!spec.matches(&order("CA", "ON", &["spring"])));
    }

    #[test]
    fn test_region_is_exact_match() {
        let spec = FilterSpec::parse(&RawFilter {
            region: Some("CA".into()),
            ..raw()
        })
        .unwrap();
        assert!(spec.matches(&order("US", "CA", &[])));
        assert!(!spec.matches(&order("US", "ca", &[])));
        assert!(!spec.matches(&order("US", "", &[])));
    }

    #[test]
    fn test_unconstrained_matches_everything() {
        let spec = FilterSpec::unconstrained();
        assert!(spec.matches(&order("", "", &[])));
        assert!(spec.matches(&order("DE", "BE", &["x"])));
    }
}
