//! Error types for the library layer.

use std::fmt;

use polars::prelude::PolarsError;

/// Errors produced by the library layer, wrapping upstream API errors and
/// adding response-shape and input validation failures.
#[derive(Debug)]
pub enum YfinanceError {
    /// An error from the underlying API client. Displays as the inner error,
    /// so a server-reported chart failure reads as the server's description.
    Api(yfinance_api::Error),
    /// The response decoded but its contents were inconsistent (mismatched
    /// array lengths, unknown timezone, out-of-range timestamps).
    Malformed(String),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// A table operation failed.
    Table(PolarsError),
}

impl fmt::Display for YfinanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "{}", e),
            Self::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Table(e) => write!(f, "Table error: {}", e),
        }
    }
}

impl std::error::Error for YfinanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<yfinance_api::Error> for YfinanceError {
    fn from(e: yfinance_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<PolarsError> for YfinanceError {
    fn from(e: PolarsError) -> Self {
        Self::Table(e)
    }
}
