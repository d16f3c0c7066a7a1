//! Error types for growth-curve analysis
//!
//! Provides a unified error type for all growth-* crates.

use std::fmt;

use thiserror::Error;

use crate::time::Timestamp;

/// A raw row that collided with another after timestamp rounding
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateEntry {
    /// Reactor the rows belong to
    pub reactor: String,
    /// Timestamp before rounding
    pub raw: Timestamp,
    /// Timestamp after rounding, shared with at least one other row
    pub rounded: Timestamp,
}

impl fmt::Display for DuplicateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} (rounded to {})", self.reactor, self.raw, self.rounded)
    }
}

/// Core error type for growth-curve operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// A required column is not present in the input table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Rounding the time axis produced ambiguous (timestamp, reactor) cells
    #[error(
        "Duplicate timestamps after rounding to {round_time}s: {} conflicting rows, choose a coarser rounding",
        conflicts.len()
    )]
    DuplicateTimestamps {
        round_time: u32,
        conflicts: Vec<DuplicateEntry>,
    },

    /// Invalid or contradictory configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a spline fit with too few points
    pub fn insufficient(expected: usize, actual: usize) -> Self {
        Self::InsufficientData { expected, actual }
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }

    /// Errors that halt a whole run rather than a single reactor
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn(_) | Self::DuplicateTimestamps { .. } | Self::Configuration(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("smoothing factor must be >= 0".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: smoothing factor must be >= 0");

        let err = Error::InsufficientData { expected: 4, actual: 3 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: expected at least 4 samples, got 3"
        );

        let err = Error::MissingColumn("od_reading".to_string());
        assert_eq!(err.to_string(), "Missing column: od_reading");

        let err = Error::Configuration("columns must be unique".to_string());
        assert_eq!(err.to_string(), "Configuration error: columns must be unique");
    }

    #[test]
    fn test_duplicate_timestamps_display() {
        let conflicts = vec![
            DuplicateEntry {
                reactor: "P01".to_string(),
                raw: Timestamp::from_millis(1_000),
                rounded: Timestamp::from_millis(0),
            },
            DuplicateEntry {
                reactor: "P01".to_string(),
                raw: Timestamp::from_millis(2_000),
                rounded: Timestamp::from_millis(0),
            },
        ];
        let err = Error::DuplicateTimestamps { round_time: 5, conflicts };
        assert_eq!(
            err.to_string(),
            "Duplicate timestamps after rounding to 5s: 2 conflicting rows, choose a coarser rounding"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_helper_functions() {
        match Error::insufficient(4, 1) {
            Error::InsufficientData { expected, actual } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 1);
            }
            _ => panic!("Wrong error type"),
        }

        let err = Error::size_mismatch(10, 5, "mask table");
        assert_eq!(
            err.to_string(),
            "Invalid input: Size mismatch in mask table: expected 10, got 5"
        );
        assert!(!err.is_fatal());

        let err = Error::non_finite("spline coefficients");
        assert_eq!(
            err.to_string(),
            "Computation error: spline coefficients contains NaN or infinite values"
        );
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert!(matches!(err, Error::Other(_)));
        assert_eq!(err.to_string(), "Other error: boom");
    }
}
