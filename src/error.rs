//! Error types for invest_view
//!
//! This module defines domain-specific error types that provide clear,
//! actionable error messages to users.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading the price series.
///
/// These are terminal: the caller reports them and does not retry.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Failed to read price data from {path}: {source}")]
    Unreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Price data is empty")]
    Empty,

    #[error("Price data has no header row")]
    MissingHeader,

    #[error("Unrecognized header, expected timestamp/price or timestamp,open,high,low,close,volume columns: {0}")]
    MalformedHeader(String),
}

/// Failures while computing the change shown next to the portfolio value.
#[derive(Debug, Error, PartialEq)]
pub enum ChangeError {
    #[error("Cannot compute a change against a baseline of {0}")]
    InvalidBaseline(f64),
}

/// Validation errors for configuration values.
///
/// These errors are shown directly to users and should be clear and actionable.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Initial balance must be positive, got {0}")]
    NonPositiveBalance(f64),

    #[error("Investment amount must be positive, got {0}")]
    NonPositiveInvestment(f64),

    #[error("Investment amount {amount} exceeds the initial balance {balance}")]
    InvestmentExceedsBalance { amount: f64, balance: f64 },

    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),
}
