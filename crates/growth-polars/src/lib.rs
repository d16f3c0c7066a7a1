//! Polars integration for growth-curve analysis
//!
//! Frames are the caller's currency; the analysis runs on the core table
//! types. This crate converts between the two and nothing else: no file
//! reading or writing.
//!
//! # Example
//!
//! ```rust,ignore
//! use polars::prelude::*;
//! use growth_polars::{LongColumns, OdFrameExt, ToDataFrame};
//!
//! let wide = df.to_wide_table(&LongColumns::default(), 5)?;
//! let exported = wide.to_dataframe()?;
//! ```

mod config;
mod error;
mod methods;
mod traits;

pub use config::*;
pub use error::{Error, Result};
pub use traits::*;
