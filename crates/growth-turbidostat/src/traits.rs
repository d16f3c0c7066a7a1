//! Peak sources for segmenting a turbidostat run
//!
//! Segment boundaries come either from a detector run over the OD data or
//! from dilution events recorded by the instrument. Both hand the segmenter
//! the same [`PeakTable`].

use growth_core::{Result, WideTable};

use crate::types::PeakTable;

/// Properties of a peak source that don't depend on the data
pub trait PeakSourceProperties {
    /// Name reported in logs
    fn source_name(&self) -> &'static str;
}

/// Anything that can place segment boundaries on a table
pub trait PeakSource: PeakSourceProperties {
    /// Peak positions per reactor of `table`
    ///
    /// Reactors without peaks may be absent from the result.
    fn peaks_for(&self, table: &WideTable) -> Result<PeakTable>;
}
