use std::{fmt, io};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for order exports.
///
/// Every variant is terminal for the current export; nothing is retried.
#[derive(Debug)]
pub enum ExportError {
    /// User-supplied filter values were rejected before any output began.
    InvalidFilter(FilterError),

    /// The order store could not be queried.
    SourceUnavailable(String),

    /// The output destination rejected a write.
    SinkWriteFailure(String),

    /// The source kept returning full pages past the configured page limit.
    PageLimitExceeded(u32),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors at the boundary (output file creation, removal).
    Io(io::Error),
}

/// Reasons a raw filter is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A date was not in `YYYY-MM-DD` form.
    MalformedDate { field: &'static str, value: String },

    /// The start date falls after the end date.
    InvertedDateRange { start: String, end: String },

    /// Only one side of the date range was supplied.
    PartialDateRange { missing: &'static str },

    /// Country is not a two-letter code.
    InvalidCountry(String),

    /// Region contains unsupported characters or is too long.
    InvalidRegion(String),

    /// Coupon code contains a delimiter or control characters, or is too long.
    InvalidCoupon(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::InvalidFilter(e) => write!(f, "Invalid filter: {e}"),
            ExportError::SourceUnavailable(msg) => write!(f, "Order source unavailable: {msg}"),
            ExportError::SinkWriteFailure(msg) => write!(f, "Failed to write export: {msg}"),
            ExportError::PageLimitExceeded(limit) => {
                write!(f, "Export stopped after reaching the limit of {limit} pages")
            }
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::MalformedDate { field, value } => {
                write!(f, "{field} '{value}' is not a YYYY-MM-DD date")
            }
            FilterError::InvertedDateRange { start, end } => {
                write!(f, "start date {start} is after end date {end}")
            }
            FilterError::PartialDateRange { missing } => {
                write!(f, "date range needs both bounds, {missing} is missing")
            }
            FilterError::InvalidCountry(value) => {
                write!(f, "country '{value}' is not a two-letter code")
            }
            FilterError::InvalidRegion(value) => write!(f, "region '{value}' is not a valid code"),
            FilterError::InvalidCoupon(value) => {
                write!(f, "coupon code '{value}' is not a valid code")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::InvalidFilter(e) => Some(e),
            ExportError::Config(e) => Some(e),
            ExportError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for FilterError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<mongodb::error::Error> for ExportError {
    fn from(err: mongodb::error::Error) -> Self {
        ExportError::SourceUnavailable(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::SinkWriteFailure(err.to_string())
    }
}

impl From<FilterError> for ExportError {
    fn from(err: FilterError) -> Self {
        ExportError::InvalidFilter(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_converts_to_invalid_filter() {
        let err: ExportError = FilterError::InvalidCountry("USA".into()).into();
        assert!(matches!(err, ExportError::InvalidFilter(_)));
        assert_eq!(
            err.to_string(),
            "Invalid filter: country 'USA' is not a two-letter code"
        );
    }

    #[test]
    fn test_page_limit_message() {
        let err = ExportError::PageLimitExceeded(5);
        assert_eq!(err.to_string(), "Export stopped after reaching the limit of 5 pages");
    }

    #[test]
    fn test_io_error_is_boundary_io() {
        let err: ExportError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
