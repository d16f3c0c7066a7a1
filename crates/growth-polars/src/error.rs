//! Error types for growth-polars

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Growth analysis error: {0}")]
    Growth(#[from] growth_core::Error),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Type mismatch in column '{column}': expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Schema problems the caller has to fix in the input frame
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidColumn(_)
                | Error::TypeMismatch { .. }
                | Error::Growth(growth_core::Error::MissingColumn(_))
                | Error::Growth(growth_core::Error::DuplicateTimestamps { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
